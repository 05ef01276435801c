use nalgebra::Vector3;

use crate::dynamics::state::KinematicState;

// ---------------------------------------------------------------------------
// Position-Verlet integrator (fixed step, two-step scheme)
// ---------------------------------------------------------------------------

/// How the retained previous position is seeded before the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bootstrap {
    /// `x_prev = x - v·dt`: one Euler step backwards.
    #[default]
    Euler,
    /// `x_prev = x - v·dt + ½·a·dt²`: second-order Taylor seed, so the first
    /// step reproduces free-fall kinematics exactly.
    Taylor,
}

/// Explicit central-difference integrator:
///
/// ```text
/// x[n+1] = 2·x[n] - x[n-1] + a·dt²
/// v[n+1] = (x[n+1] - x[n]) / dt
/// ```
///
/// No error estimate and no stability guard; a step that is large relative
/// to the force gradient diverges.
#[derive(Debug, Clone, Default)]
pub struct VerletIntegrator {
    prev_pos: Option<Vector3<f64>>,
    bootstrap: Bootstrap,
}

impl VerletIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bootstrap(bootstrap: Bootstrap) -> Self {
        Self { prev_pos: None, bootstrap }
    }

    pub fn bootstrap(&self) -> Bootstrap {
        self.bootstrap
    }

    /// True once the previous position has been seeded.
    pub fn is_bootstrapped(&self) -> bool {
        self.prev_pos.is_some()
    }

    /// Forget the retained position. Required whenever position or velocity
    /// are overwritten from outside, e.g. when a scenario is reloaded.
    pub fn reset(&mut self) {
        self.prev_pos = None;
    }

    /// Advance `state` by one step of `dt` under acceleration `accel`.
    pub fn step(&mut self, state: &mut KinematicState, accel: &Vector3<f64>, dt: f64) {
        let prev = match self.prev_pos {
            Some(p) => p,
            None => match self.bootstrap {
                Bootstrap::Euler => state.pos - state.vel * dt,
                Bootstrap::Taylor => state.pos - state.vel * dt + accel * (0.5 * dt * dt),
            },
        };

        let next_pos = 2.0 * state.pos - prev + accel * (dt * dt);
        let next_vel = (next_pos - state.pos) / dt;

        self.prev_pos = Some(state.pos);
        state.vel = next_vel;
        state.pos = next_pos;
        state.time += dt;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn state() -> KinematicState {
        KinematicState::new(Vector3::new(4.0e6, -2.0e5, 1.0e3), Vector3::new(12.0, -300.0, 45.0))
    }

    #[test]
    fn bootstrap_happens_once() {
        let mut integ = VerletIntegrator::new();
        let mut s = state();
        assert!(!integ.is_bootstrapped());
        let before = s.pos;
        integ.step(&mut s, &Vector3::zeros(), 0.1);
        assert!(integ.is_bootstrapped());
        assert_eq!(integ.prev_pos, Some(before));
    }

    #[test]
    fn previous_position_is_one_tick_old() {
        let mut integ = VerletIntegrator::new();
        let mut s = state();
        let a = Vector3::new(-3.0, 0.5, 0.0);
        for _ in 0..5 {
            let before = s.pos;
            integ.step(&mut s, &a, 0.1);
            assert_eq!(integ.prev_pos, Some(before));
        }
        assert_abs_diff_eq!(s.time, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_acceleration_is_uniform_motion() {
        let mut integ = VerletIntegrator::new();
        let mut s = state();
        let dt = 0.1;
        let mut last = s.pos;
        integ.step(&mut s, &Vector3::zeros(), dt);
        let mut diff = s.pos - last;
        assert_abs_diff_eq!((diff - s.vel * dt).norm(), 0.0, epsilon = 1e-6);
        for _ in 0..50 {
            last = s.pos;
            integ.step(&mut s, &Vector3::zeros(), dt);
            let new_diff = s.pos - last;
            assert_abs_diff_eq!((new_diff - diff).norm(), 0.0, epsilon = 1e-6);
            diff = new_diff;
        }
        assert_abs_diff_eq!((s.vel - state().vel).norm(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn euler_seed_first_step() {
        // x1 = x0 + v·dt + a·dt²
        let mut integ = VerletIntegrator::new();
        let mut s = state();
        let a = Vector3::new(0.0, 0.0, -4.0);
        let x0 = s.pos;
        let v0 = s.vel;
        integ.step(&mut s, &a, 0.5);
        let expected = x0 + v0 * 0.5 + a * 0.25;
        assert_abs_diff_eq!((s.pos - expected).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn taylor_seed_first_step() {
        // x1 = x0 + v·dt + ½·a·dt²
        let mut integ = VerletIntegrator::with_bootstrap(Bootstrap::Taylor);
        let mut s = state();
        let a = Vector3::new(0.0, 0.0, -4.0);
        let x0 = s.pos;
        let v0 = s.vel;
        integ.step(&mut s, &a, 0.5);
        let expected = x0 + v0 * 0.5 + a * 0.125;
        assert_abs_diff_eq!((s.pos - expected).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn constant_acceleration_matches_parabola() {
        // After the seed, the scheme is exact for constant acceleration.
        let mut integ = VerletIntegrator::with_bootstrap(Bootstrap::Taylor);
        let mut s = KinematicState::new(Vector3::zeros(), Vector3::new(10.0, 0.0, 0.0));
        let a = Vector3::new(0.0, -2.0, 0.0);
        let dt = 0.01;
        for _ in 0..1000 {
            integ.step(&mut s, &a, dt);
        }
        let t = s.time;
        let expected = Vector3::new(10.0 * t, -t * t, 0.0);
        assert_abs_diff_eq!((s.pos - expected).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn reset_reseeds() {
        let mut integ = VerletIntegrator::new();
        let mut s = state();
        integ.step(&mut s, &Vector3::zeros(), 0.1);
        integ.reset();
        assert!(!integ.is_bootstrapped());
        // Teleport and change direction: the next step must use the new velocity
        s.pos = Vector3::new(1.0e6, 0.0, 0.0);
        s.vel = Vector3::new(0.0, 5.0, 0.0);
        integ.step(&mut s, &Vector3::zeros(), 0.1);
        assert_abs_diff_eq!((s.pos - Vector3::new(1.0e6, 0.5, 0.0)).norm(), 0.0, epsilon = 1e-6);
    }
}
