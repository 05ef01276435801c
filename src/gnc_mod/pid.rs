use crate::dynamics::state::KinematicState;
use crate::io::telemetry::TelemetrySample;
use super::autopilot::AutopilotGains;
use super::controller::{ControlOutput, Controller};

// ---------------------------------------------------------------------------
// PID Controller (single axis, clamped output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub out_min: f64,
    pub out_max: f64,
    integral: f64,
    prev_error: Option<f64>,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            out_min: f64::NEG_INFINITY,
            out_max: f64::INFINITY,
            integral: 0.0,
            prev_error: None,
        }
    }

    pub fn with_limits(mut self, out_min: f64, out_max: f64) -> Self {
        self.out_min = out_min;
        self.out_max = out_max;
        self
    }

    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        let candidate = self.integral + error * dt;
        let raw = self.kp * error + self.ki * candidate + self.kd * derivative;
        let out = raw.clamp(self.out_min, self.out_max);
        // Conditional integration: freeze the integrator while saturated
        if out == raw {
            self.integral = candidate;
        }
        out
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}

// ---------------------------------------------------------------------------
// PID descent controller: tracks the same closing-rate profile
// ---------------------------------------------------------------------------

/// Closing-rate tracker around a hover throttle bias.
///
/// Follows the same `-(target_offset + kh·h)` profile as
/// [`DescentAutopilot`](super::DescentAutopilot), with integral action to
/// trim out the changing weight as fuel burns.
#[derive(Debug, Clone)]
pub struct PidDescent {
    pub profile: AutopilotGains,
    pub hover_throttle: f64,
    pid: Pid,
}

impl PidDescent {
    pub fn new(profile: AutopilotGains, hover_throttle: f64) -> Self {
        Self {
            profile,
            hover_throttle,
            pid: Pid::new(0.6, 0.05, 0.0).with_limits(-hover_throttle, 1.0 - hover_throttle),
        }
    }
}

impl Default for PidDescent {
    fn default() -> Self {
        Self::new(AutopilotGains::default(), 0.5)
    }
}

impl Controller for PidDescent {
    fn control(&mut self, state: &KinematicState, dt: f64) -> ControlOutput {
        let sample = TelemetrySample {
            altitude: state.altitude(),
            closing_rate: state.closing_rate(),
        };
        let error = self.profile.error(sample.altitude, sample.closing_rate);
        let throttle = (self.hover_throttle + self.pid.update(error, dt)).clamp(0.0, 1.0);
        ControlOutput { throttle, sample }
    }

    fn reset(&mut self) {
        self.pid.reset();
    }

    fn name(&self) -> &str {
        "PidDescent"
    }
}
