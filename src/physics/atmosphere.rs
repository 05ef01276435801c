// ---------------------------------------------------------------------------
// Mars exponential atmosphere
// ---------------------------------------------------------------------------

/// Altitude above which the atmosphere is treated as vacuum, m.
pub const EXOSPHERE: f64 = 200_000.0;

const SCALE_HEIGHT: f64 = 11_000.0;        // m
const SURFACE_DENSITY: f64 = 0.017;        // kg/m^3

/// Atmospheric density as a pure function of altitude.
///
/// Implementations must return a value `>= 0` and zero above their
/// exosphere boundary.
pub trait Atmosphere {
    /// Density at `altitude` metres above the mean surface, kg/m^3.
    fn density(&self, altitude: f64) -> f64;

    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Isothermal exponential model of the Martian atmosphere.
#[derive(Debug, Clone, Copy)]
pub struct MarsAtmosphere {
    pub surface_density: f64,
    pub scale_height: f64,
    pub exosphere: f64,
}

impl Default for MarsAtmosphere {
    fn default() -> Self {
        Self {
            surface_density: SURFACE_DENSITY,
            scale_height: SCALE_HEIGHT,
            exosphere: EXOSPHERE,
        }
    }
}

impl Atmosphere for MarsAtmosphere {
    fn density(&self, altitude: f64) -> f64 {
        if altitude > self.exosphere {
            0.0
        } else {
            self.surface_density * (-altitude / self.scale_height).exp()
        }
    }

    fn name(&self) -> &str {
        "Mars exponential"
    }
}

/// No atmosphere at all. Useful for pure-gravity runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vacuum;

impl Atmosphere for Vacuum {
    fn density(&self, _altitude: f64) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "vacuum"
    }
}
