use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Planetary constants (Mars)
// ---------------------------------------------------------------------------

pub const GRAVITY: f64 = 6.673e-11;          // gravitational constant, N·m^2/kg^2
pub const MARS_MASS: f64 = 6.42e23;          // kg
pub const MARS_RADIUS: f64 = 3_386_000.0;    // mean radius, m
pub const MU_MARS: f64 = GRAVITY * MARS_MASS; // m^3/s^2

/// Inverse-square gravity acceleration toward the planet centre.
///
/// `pos` is planet-centred. A zero position is not guarded: the result is NaN.
pub fn gravity_accel(pos: &Vector3<f64>) -> Vector3<f64> {
    -(MU_MARS / pos.norm_squared()) * pos.normalize()
}

/// Gravitational force on a body of `mass` kg at `pos`.
pub fn gravity_force(pos: &Vector3<f64>, mass: f64) -> Vector3<f64> {
    gravity_accel(pos) * mass
}

/// Gravitational acceleration magnitude on the surface, m/s^2.
pub fn surface_gravity() -> f64 {
    MU_MARS / (MARS_RADIUS * MARS_RADIUS)
}
