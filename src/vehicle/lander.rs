use std::f64::consts::PI;

use serde::Deserialize;

use crate::physics::gravity::surface_gravity;

// ---------------------------------------------------------------------------
// Lander definition
// ---------------------------------------------------------------------------

/// Physical constants of the lander. Read-only during a run.
///
/// Deserializes through [`LanderSpecBuilder`], so an omitted `max_thrust`
/// is derived from the masses actually given.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "LanderSpecBuilder")]
pub struct LanderSpec {
    pub size: f64,                    // m, radius of the lander body
    pub unloaded_mass: f64,           // kg, without fuel
    pub fuel_capacity: f64,           // l
    pub fuel_density: f64,            // kg/l
    pub fuel_rate_at_max_thrust: f64, // l/s
    pub max_thrust: f64,              // N
    pub drag_coef_lander: f64,
    pub drag_coef_chute: f64,
    pub max_parachute_drag: f64,      // N, chute tears above this
    pub max_parachute_speed: f64,     // m/s, chute tears above this inside the atmosphere
    pub max_impact_ground_speed: f64, // m/s
    pub max_impact_descent_rate: f64, // m/s
}

impl Default for LanderSpec {
    fn default() -> Self {
        LanderSpecBuilder::new().build()
    }
}

impl LanderSpec {
    /// Current mass: dry mass plus the fuel left in the tank.
    pub fn mass(&self, fuel_fraction: f64) -> f64 {
        self.unloaded_mass + self.fuel_capacity * self.fuel_density * fuel_fraction
    }

    /// Mass with a full tank.
    pub fn full_mass(&self) -> f64 {
        self.mass(1.0)
    }

    /// Reference area of the lander body, m^2.
    pub fn lander_area(&self) -> f64 {
        PI * self.size * self.size
    }

    /// Reference area of the deployed parachute, m^2.
    pub fn chute_area(&self) -> f64 {
        20.0 * self.size * self.size
    }

    /// Fuel fraction consumed over `dt` at the given throttle.
    pub fn fuel_burn(&self, throttle: f64, dt: f64) -> f64 {
        dt * self.fuel_rate_at_max_thrust * throttle / self.fuel_capacity
    }

    /// Thrust-to-weight ratio at the surface with a full tank.
    pub fn twr(&self) -> f64 {
        self.max_thrust / (self.full_mass() * surface_gravity())
    }
}

// ---------------------------------------------------------------------------
// Lander builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanderSpecBuilder {
    size: f64,
    unloaded_mass: f64,
    fuel_capacity: f64,
    fuel_density: f64,
    fuel_rate_at_max_thrust: f64,
    max_thrust: Option<f64>,
    drag_coef_lander: f64,
    drag_coef_chute: f64,
    max_parachute_drag: f64,
    max_parachute_speed: f64,
    max_impact_ground_speed: f64,
    max_impact_descent_rate: f64,
}

impl LanderSpecBuilder {
    pub fn new() -> Self {
        Self {
            size: 1.0,
            unloaded_mass: 100.0,
            fuel_capacity: 100.0,
            fuel_density: 1.0,
            fuel_rate_at_max_thrust: 0.5,
            max_thrust: None,
            drag_coef_lander: 1.0,
            drag_coef_chute: 2.0,
            max_parachute_drag: 20_000.0,
            max_parachute_speed: 500.0,
            max_impact_ground_speed: 1.0,
            max_impact_descent_rate: 1.0,
        }
    }

    pub fn size(mut self, v: f64) -> Self { self.size = v; self }
    pub fn unloaded_mass(mut self, v: f64) -> Self { self.unloaded_mass = v; self }
    pub fn fuel_capacity(mut self, v: f64) -> Self { self.fuel_capacity = v; self }
    pub fn fuel_density(mut self, v: f64) -> Self { self.fuel_density = v; self }
    pub fn fuel_rate_at_max_thrust(mut self, v: f64) -> Self { self.fuel_rate_at_max_thrust = v; self }
    pub fn max_thrust(mut self, v: f64) -> Self { self.max_thrust = Some(v); self }
    pub fn drag_coef_lander(mut self, v: f64) -> Self { self.drag_coef_lander = v; self }
    pub fn drag_coef_chute(mut self, v: f64) -> Self { self.drag_coef_chute = v; self }
    pub fn max_parachute_drag(mut self, v: f64) -> Self { self.max_parachute_drag = v; self }
    pub fn max_parachute_speed(mut self, v: f64) -> Self { self.max_parachute_speed = v; self }
    pub fn max_impact_ground_speed(mut self, v: f64) -> Self { self.max_impact_ground_speed = v; self }
    pub fn max_impact_descent_rate(mut self, v: f64) -> Self { self.max_impact_descent_rate = v; self }

    /// Unless set explicitly, max thrust is 1.5x the fully fuelled surface weight.
    pub fn build(self) -> LanderSpec {
        let full_mass = self.unloaded_mass + self.fuel_capacity * self.fuel_density;
        LanderSpec {
            size: self.size,
            unloaded_mass: self.unloaded_mass,
            fuel_capacity: self.fuel_capacity,
            fuel_density: self.fuel_density,
            fuel_rate_at_max_thrust: self.fuel_rate_at_max_thrust,
            max_thrust: self
                .max_thrust
                .unwrap_or(1.5 * full_mass * surface_gravity()),
            drag_coef_lander: self.drag_coef_lander,
            drag_coef_chute: self.drag_coef_chute,
            max_parachute_drag: self.max_parachute_drag,
            max_parachute_speed: self.max_parachute_speed,
            max_impact_ground_speed: self.max_impact_ground_speed,
            max_impact_descent_rate: self.max_impact_descent_rate,
        }
    }
}

impl From<LanderSpecBuilder> for LanderSpec {
    fn from(b: LanderSpecBuilder) -> Self {
        b.build()
    }
}

impl Default for LanderSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mass_tracks_fuel() {
        let l = LanderSpec::default();
        assert_relative_eq!(l.mass(0.0), 100.0);
        assert_relative_eq!(l.mass(0.5), 150.0);
        assert_relative_eq!(l.full_mass(), 200.0);
    }

    #[test]
    fn default_twr_is_one_and_a_half() {
        let l = LanderSpec::default();
        assert_relative_eq!(l.twr(), 1.5, max_relative = 1e-12);
    }

    #[test]
    fn chute_area_exceeds_lander_area() {
        let l = LanderSpec::default();
        assert_relative_eq!(l.lander_area(), PI);
        assert_relative_eq!(l.chute_area(), 20.0);
    }

    #[test]
    fn full_throttle_empties_tank_in_200_s() {
        let l = LanderSpec::default();
        assert_relative_eq!(l.fuel_burn(1.0, 200.0), 1.0, max_relative = 1e-12);
        assert_eq!(l.fuel_burn(0.0, 10.0), 0.0);
    }

    #[test]
    fn explicit_thrust_overrides_default() {
        let l = LanderSpecBuilder::new().max_thrust(500.0).unloaded_mass(80.0).build();
        assert_eq!(l.max_thrust, 500.0);
        assert_relative_eq!(l.full_mass(), 180.0);
    }

    #[test]
    fn toml_mass_override_rescales_thrust() {
        let l: LanderSpec = toml::from_str("unloaded_mass = 250.0").unwrap();
        assert_relative_eq!(l.full_mass(), 350.0);
        assert_relative_eq!(l.twr(), 1.5, max_relative = 1e-12);
        let built = LanderSpecBuilder::new().unloaded_mass(250.0).build();
        assert_relative_eq!(l.max_thrust, built.max_thrust, max_relative = 1e-12);
    }

    #[test]
    fn toml_explicit_thrust_is_kept() {
        let l: LanderSpec = toml::from_str("unloaded_mass = 250.0\nmax_thrust = 900.0").unwrap();
        assert_eq!(l.max_thrust, 900.0);
    }
}
