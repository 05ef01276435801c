use nalgebra::{UnitQuaternion, Vector3};

use crate::dynamics::state::KinematicState;

/// Build a body->planet rotation from xyz Euler angles in degrees.
pub fn attitude_from_euler_deg(angles: [f64; 3]) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(
        angles[0].to_radians(),
        angles[1].to_radians(),
        angles[2].to_radians(),
    )
}

/// Orientation-control hook, invoked once per tick after the autopilot.
pub trait AttitudeHook {
    fn stabilize(&mut self, state: &KinematicState, attitude: &mut UnitQuaternion<f64>);
}

/// Keeps the lander base pointing at the planet centre, so the engine
/// (body +Z) thrusts radially outward.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadialStabilizer;

impl AttitudeHook for RadialStabilizer {
    fn stabilize(&mut self, state: &KinematicState, attitude: &mut UnitQuaternion<f64>) {
        let up = state.up();
        *attitude = UnitQuaternion::rotation_between(&Vector3::z(), &up).unwrap_or_else(|| {
            // up == -Z: any half turn about a horizontal axis
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
        });
    }
}
