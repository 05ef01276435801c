use serde::Deserialize;

use crate::dynamics::state::KinematicState;
use crate::io::telemetry::TelemetrySample;
use super::controller::{ControlOutput, Controller};

// ---------------------------------------------------------------------------
// Proportional descent autopilot
// ---------------------------------------------------------------------------

/// Gains and limits of the descent law.
///
/// The law tracks the closing-rate profile `-(target_offset + kh·h)`, so the
/// lander slows down linearly with altitude and touches down at about
/// `target_offset` m/s.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AutopilotGains {
    pub kh: f64,               // 1/s, altitude gain of the target profile
    pub kp: f64,               // proportional gain
    pub delta: f64,            // deadband half-width, hover throttle offset
    pub target_offset: f64,    // m/s, target descent rate at touchdown
    pub override_rate: f64,    // m/s, closing rates below this force full throttle
}

impl Default for AutopilotGains {
    fn default() -> Self {
        Self {
            kh: 0.03,
            kp: 0.75,
            delta: 0.5,
            target_offset: 0.5,
            override_rate: -770.0,
        }
    }
}

/// Map the proportional output onto a throttle in [0, 1].
///
/// Three exclusive branches: saturate low at `p_out <= -delta`, saturate high
/// at `p_out >= 1 - delta`, linear `delta + p_out` in between. Continuous at
/// both boundaries.
pub fn shape_throttle(p_out: f64, delta: f64) -> f64 {
    if p_out <= -delta {
        0.0
    } else if p_out >= 1.0 - delta {
        1.0
    } else {
        delta + p_out
    }
}

impl AutopilotGains {
    /// Tracking error for a given altitude and closing rate.
    pub fn error(&self, altitude: f64, closing_rate: f64) -> f64 {
        -(self.target_offset + self.kh * altitude + closing_rate)
    }

    /// Throttle command, including the fast-approach override.
    pub fn throttle(&self, altitude: f64, closing_rate: f64) -> f64 {
        let p_out = self.kp * self.error(altitude, closing_rate);
        let throttle = shape_throttle(p_out, self.delta);
        if closing_rate < self.override_rate {
            1.0
        } else {
            throttle
        }
    }
}

/// Stateless proportional autopilot on altitude and closing rate.
#[derive(Debug, Clone, Default)]
pub struct DescentAutopilot {
    pub gains: AutopilotGains,
}

impl DescentAutopilot {
    pub fn new(gains: AutopilotGains) -> Self {
        Self { gains }
    }
}

impl Controller for DescentAutopilot {
    fn control(&mut self, state: &KinematicState, _dt: f64) -> ControlOutput {
        let sample = TelemetrySample {
            altitude: state.altitude(),
            closing_rate: state.closing_rate(),
        };
        ControlOutput {
            throttle: self.gains.throttle(sample.altitude, sample.closing_rate),
            sample,
        }
    }

    fn name(&self) -> &str {
        "DescentAutopilot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::gravity::MARS_RADIUS;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn shaping_branches() {
        assert_eq!(shape_throttle(-2.0, 0.5), 0.0);
        assert_eq!(shape_throttle(-0.5, 0.5), 0.0);
        assert_eq!(shape_throttle(0.0, 0.5), 0.5);
        assert_abs_diff_eq!(shape_throttle(0.25, 0.5), 0.75);
        assert_eq!(shape_throttle(0.5, 0.5), 1.0);
        assert_eq!(shape_throttle(7.0, 0.5), 1.0);
    }

    #[test]
    fn shaping_continuous_at_boundaries() {
        let eps = 1e-9;
        for edge in [-0.5, 0.5] {
            let below = shape_throttle(edge - eps, 0.5);
            let at = shape_throttle(edge, 0.5);
            let above = shape_throttle(edge + eps, 0.5);
            assert_abs_diff_eq!(below, at, epsilon = 1e-8);
            assert_abs_diff_eq!(above, at, epsilon = 1e-8);
        }
    }

    #[test]
    fn shaping_stays_in_unit_interval() {
        let mut p = -3.0;
        while p < 3.0 {
            let t = shape_throttle(p, 0.5);
            assert!((0.0..=1.0).contains(&t), "p_out {} gave {}", p, t);
            p += 0.01;
        }
    }

    #[test]
    fn on_profile_gives_hover_throttle() {
        let g = AutopilotGains::default();
        let h = 1000.0;
        let v = -(0.5 + 0.03 * h);
        assert_abs_diff_eq!(g.error(h, v), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g.throttle(h, v), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn too_slow_cuts_engine_too_fast_burns() {
        let g = AutopilotGains::default();
        // Climbing at high altitude: large negative error
        assert_eq!(g.throttle(10_000.0, 5.0), 0.0);
        // Falling faster than the profile near the ground
        assert_eq!(g.throttle(10.0, -20.0), 1.0);
    }

    #[test]
    fn override_wins_over_shaping() {
        let g = AutopilotGains::default();
        for h in [0.0, 1_000.0, 50_000.0, 200_000.0, 1.0e6] {
            // The proportional law alone would pick zero throttle here for large h
            assert_eq!(g.throttle(h, -770.001), 1.0, "altitude {}", h);
            assert_eq!(g.throttle(h, -5_000.0), 1.0, "altitude {}", h);
        }
        let p_out = g.kp * g.error(200_000.0, -771.0);
        assert_eq!(shape_throttle(p_out, g.delta), 0.0);
    }

    #[test]
    fn override_threshold_is_strict() {
        let g = AutopilotGains::default();
        // At exactly -770 the shaping law still decides
        assert_eq!(g.throttle(200_000.0, -770.0), 0.0);
    }

    #[test]
    fn controller_reports_sample() {
        let mut ap = DescentAutopilot::default();
        let state = KinematicState::new(
            Vector3::new(0.0, -(MARS_RADIUS + 500.0), 0.0),
            Vector3::new(0.0, 10.0, 0.0),
        );
        let out = ap.control(&state, 0.1);
        assert_abs_diff_eq!(out.sample.altitude, 500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.sample.closing_rate, -10.0, epsilon = 1e-9);
        // error = -(0.5 + 15 - 10) = -5.5, p_out = -4.125
        assert_eq!(out.throttle, 0.0);
        assert_eq!(ap.name(), "DescentAutopilot");
    }
}
