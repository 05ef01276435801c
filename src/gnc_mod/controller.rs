use crate::dynamics::state::KinematicState;
use crate::io::telemetry::TelemetrySample;

/// Throttle command plus the observation it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub throttle: f64,
    pub sample: TelemetrySample,
}

/// Trait for throttle controllers.
///
/// Implement this to plug a custom descent law into the simulation loop.
/// Controllers only see the kinematic state; the simulation writes the
/// returned throttle back into the vehicle state.
pub trait Controller {
    /// Compute a throttle command from the state reached after the last step.
    fn control(&mut self, state: &KinematicState, dt: f64) -> ControlOutput;

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
