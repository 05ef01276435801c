pub mod attitude;
pub mod autopilot;
pub mod controller;
pub mod pid;

pub use attitude::{attitude_from_euler_deg, AttitudeHook, RadialStabilizer};
pub use autopilot::{shape_throttle, AutopilotGains, DescentAutopilot};
pub use controller::{ControlOutput, Controller};
pub use pid::{Pid, PidDescent};
