use nalgebra::Vector3;

use crate::config::ScenarioConfig;
use crate::dynamics::forces::{forces, Forces};
use crate::dynamics::state::{KinematicState, ParachuteState, SimConfig, Snapshot, VehicleState};
use crate::error::{SimError, SimResult};
use crate::gnc::{attitude_from_euler_deg, AttitudeHook, Controller, DescentAutopilot, RadialStabilizer};
use crate::io::telemetry::{TelemetrySample, TelemetrySink};
use crate::physics::aerodynamics::drag_force;
use crate::physics::atmosphere::{Atmosphere, MarsAtmosphere, EXOSPHERE};
use crate::physics::gravity::MARS_RADIUS;
use crate::vehicle::LanderSpec;
use super::event::{AltitudeDetector, EventDetector, EventKind, Outcome, SimEvent};
use super::integrator::{Bootstrap, VerletIntegrator};

/// What one dynamics step did.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    /// Throttle the engine ran at during the step.
    pub throttle_applied: f64,
    /// Autopilot observation, present only while the autopilot is enabled.
    pub sample: Option<TelemetrySample>,
}

/// Everything recorded during a run.
#[derive(Debug, Clone)]
pub struct FlightLog {
    pub name: String,
    pub dt: f64,
    pub trajectory: Vec<Snapshot>,
    pub events: Vec<SimEvent>,
    pub outcome: Option<Outcome>,
}

// ---------------------------------------------------------------------------
// Simulation: owns the state and every collaborator of the tick
// ---------------------------------------------------------------------------

pub struct Simulation {
    pub name: String,
    pub kin: KinematicState,
    pub vehicle: VehicleState,
    pub lander: LanderSpec,
    pub config: SimConfig,
    integrator: VerletIntegrator,
    atmosphere: Box<dyn Atmosphere>,
    autopilot: Box<dyn Controller>,
    stabilizer: Box<dyn AttitudeHook>,
    detectors: Vec<Box<dyn EventDetector>>,
    events: Vec<SimEvent>,
    outcome: Option<Outcome>,
}

impl Simulation {
    pub fn new(kin: KinematicState, vehicle: VehicleState, lander: LanderSpec, config: SimConfig) -> Self {
        Self {
            name: String::new(),
            kin,
            vehicle,
            lander,
            config,
            integrator: VerletIntegrator::new(),
            atmosphere: Box::new(MarsAtmosphere::default()),
            autopilot: Box::new(DescentAutopilot::default()),
            stabilizer: Box::new(RadialStabilizer),
            detectors: vec![Box::new(AltitudeDetector::new(EXOSPHERE, false))],
            events: Vec::new(),
            outcome: None,
        }
    }

    /// Build a validated simulation from a scenario.
    pub fn from_scenario(scenario: &ScenarioConfig, max_time: f64) -> SimResult<Self> {
        scenario.validate()?;
        let kin = KinematicState::new(scenario.position(), scenario.velocity());
        let vehicle = VehicleState {
            fuel: scenario.fuel,
            parachute: scenario.parachute,
            throttle: 0.0,
            autopilot_enabled: scenario.autopilot,
            stabilized_attitude: scenario.stabilized_attitude,
            attitude: attitude_from_euler_deg(scenario.orientation),
        };
        let config = SimConfig { dt: scenario.delta_t, max_time };
        log::debug!(
            "Scenario '{}': altitude {:.0} m, speed {:.1} m/s, dt {} s",
            scenario.name,
            kin.altitude(),
            kin.vel.norm(),
            config.dt
        );
        let mut sim = Self::new(kin, vehicle, scenario.lander.clone(), config)
            .with_controller(Box::new(DescentAutopilot::new(scenario.autopilot_gains)));
        sim.name = scenario.name.clone();
        Ok(sim)
    }

    pub fn with_atmosphere(mut self, atmosphere: Box<dyn Atmosphere>) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    pub fn with_controller(mut self, controller: Box<dyn Controller>) -> Self {
        self.autopilot = controller;
        self
    }

    pub fn with_stabilizer(mut self, stabilizer: Box<dyn AttitudeHook>) -> Self {
        self.stabilizer = stabilizer;
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn EventDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: Bootstrap) -> Self {
        self.integrator = VerletIntegrator::with_bootstrap(bootstrap);
        self
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn controller_name(&self) -> &str {
        self.autopilot.name()
    }

    /// Forces acting at the current state.
    pub fn forces(&self) -> Forces {
        forces(&self.kin, &self.vehicle, &self.lander, self.atmosphere.as_ref())
    }

    /// Overwrite position and velocity; the integrator is re-seeded on the next step.
    pub fn reset_state(&mut self, pos: Vector3<f64>, vel: Vector3<f64>) {
        self.kin.pos = pos;
        self.kin.vel = vel;
        self.integrator.reset();
        self.outcome = None;
    }

    /// Check preconditions the unchecked tick relies on.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.config.dt > 0.0 && self.config.dt.is_finite()) {
            return Err(SimError::Validation(format!("dt must be positive, got {}", self.config.dt)));
        }
        if !self.kin.is_finite() {
            return Err(SimError::Validation("position and velocity must be finite".into()));
        }
        if self.kin.pos.norm() == 0.0 {
            return Err(SimError::Validation("position must not be the planet centre".into()));
        }
        let mass = self.lander.mass(self.vehicle.fuel);
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(SimError::Validation(format!("lander mass must be positive, got {}", mass)));
        }
        if !(0.0..=1.0).contains(&self.vehicle.fuel) {
            return Err(SimError::Validation(format!("fuel fraction out of range: {}", self.vehicle.fuel)));
        }
        if !(0.0..=1.0).contains(&self.vehicle.throttle) {
            return Err(SimError::Validation(format!("throttle out of range: {}", self.vehicle.throttle)));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Core tick: forces -> Verlet step -> autopilot -> stabilization
    // -----------------------------------------------------------------------

    /// Advance the dynamics by one fixed step. Unchecked: degenerate state
    /// propagates as NaN.
    pub fn step(&mut self) -> StepReport {
        let throttle_applied = self.vehicle.throttle;
        let accel = self.forces().acceleration();
        self.integrator.step(&mut self.kin, &accel, self.config.dt);

        let sample = if self.vehicle.autopilot_enabled {
            let out = self.autopilot.control(&self.kin, self.config.dt);
            self.vehicle.throttle = out.throttle;
            Some(out.sample)
        } else {
            None
        };

        if self.vehicle.stabilized_attitude {
            self.stabilizer.stabilize(&self.kin, &mut self.vehicle.attitude);
        }

        StepReport { throttle_applied, sample }
    }

    /// One full tick: dynamics step, telemetry, then the discrete vehicle
    /// events (fuel burn, parachute tearing, touchdown).
    pub fn tick(&mut self, sink: &mut dyn TelemetrySink) -> SimResult<StepReport> {
        let prev = self.kin.clone();
        let report = self.step();

        // A sink failure is reported only once the tick's bookkeeping is done
        let appended = match report.sample {
            Some(sample) => sink.append(sample),
            None => Ok(()),
        };

        self.burn_fuel(report.throttle_applied);
        self.check_parachute();

        for det in self.detectors.iter_mut() {
            if let Some(kind) = det.check(&prev, &self.kin) {
                log::info!("t={:.1}s {:?}", self.kin.time, kind);
                self.events.push(SimEvent { time: self.kin.time, altitude: self.kin.altitude(), kind });
            }
        }

        self.check_touchdown();
        appended?;
        Ok(report)
    }

    /// Like [`tick`](Self::tick), but reports a non-finite state as an error.
    pub fn try_tick(&mut self, sink: &mut dyn TelemetrySink) -> SimResult<StepReport> {
        let report = self.tick(sink)?;
        if !self.kin.is_finite() {
            return Err(SimError::NonFinite { time: self.kin.time, what: "kinematic state" });
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Discrete vehicle events
    // -----------------------------------------------------------------------

    fn record(&mut self, kind: EventKind) {
        self.events.push(SimEvent { time: self.kin.time, altitude: self.kin.altitude(), kind });
    }

    fn burn_fuel(&mut self, throttle: f64) {
        if throttle <= 0.0 || self.vehicle.fuel <= 0.0 {
            return;
        }
        self.vehicle.fuel -= self.lander.fuel_burn(throttle, self.config.dt);
        if self.vehicle.fuel <= 0.0 {
            self.vehicle.fuel = 0.0;
            log::info!("t={:.1}s fuel exhausted at altitude {:.0} m", self.kin.time, self.kin.altitude());
            self.record(EventKind::FuelExhausted);
        }
    }

    /// Whether the chute would survive being opened at the current state.
    pub fn safe_to_deploy_parachute(&self) -> bool {
        !self.chute_would_tear()
    }

    fn chute_would_tear(&self) -> bool {
        let altitude = self.kin.altitude();
        let density = self.atmosphere.density(altitude);
        let drag = drag_force(&self.kin.vel, density, self.lander.drag_coef_chute, self.lander.chute_area());
        drag.norm() > self.lander.max_parachute_drag
            || (self.kin.vel.norm() > self.lander.max_parachute_speed && altitude < EXOSPHERE)
    }

    /// Open the parachute. Only possible once, from the stowed state.
    pub fn deploy_parachute(&mut self) -> bool {
        if self.vehicle.parachute != ParachuteState::NotDeployed || self.outcome.is_some() {
            return false;
        }
        let safe = self.safe_to_deploy_parachute();
        if safe {
            log::info!("t={:.1}s parachute deployed", self.kin.time);
        } else {
            log::warn!(
                "t={:.1}s parachute deployed outside its envelope ({:.0} m/s)",
                self.kin.time,
                self.kin.vel.norm()
            );
        }
        self.vehicle.parachute = ParachuteState::Deployed;
        self.record(EventKind::ParachuteDeployed { safe });
        true
    }

    fn check_parachute(&mut self) {
        if self.vehicle.parachute == ParachuteState::Deployed && self.chute_would_tear() {
            log::info!("t={:.1}s parachute torn off", self.kin.time);
            self.vehicle.parachute = ParachuteState::Lost;
            self.record(EventKind::ParachuteLost);
        }
    }

    /// Hand the throttle to (or take it back from) the autopilot.
    pub fn set_autopilot(&mut self, enabled: bool) {
        if enabled == self.vehicle.autopilot_enabled {
            return;
        }
        self.vehicle.autopilot_enabled = enabled;
        if enabled {
            self.autopilot.reset();
            self.record(EventKind::AutopilotEngaged);
        } else {
            self.record(EventKind::AutopilotDisengaged);
        }
    }

    fn check_touchdown(&mut self) {
        if self.outcome.is_some() || !(self.kin.altitude() < self.lander.size / 2.0) {
            return;
        }
        let descent_rate = -self.kin.closing_rate();
        let ground_speed = self.kin.ground_speed();
        let crashed = ground_speed > self.lander.max_impact_ground_speed
            || descent_rate > self.lander.max_impact_descent_rate;
        let outcome = if crashed { Outcome::Crashed } else { Outcome::Landed };
        if crashed {
            log::warn!(
                "t={:.1}s crashed: descent {:.2} m/s, ground speed {:.2} m/s",
                self.kin.time, descent_rate, ground_speed
            );
        } else {
            log::info!("t={:.1}s landed: descent {:.2} m/s", self.kin.time, descent_rate);
        }
        self.record(EventKind::Touchdown { outcome, descent_rate, ground_speed });

        // Rest on the surface
        self.kin.pos = self.kin.up() * (MARS_RADIUS + self.lander.size / 2.0);
        self.kin.vel = Vector3::zeros();
        self.vehicle.throttle = 0.0;
        self.integrator.reset();
        self.outcome = Some(outcome);
    }

    // -----------------------------------------------------------------------
    // Driver loop
    // -----------------------------------------------------------------------

    /// Run until touchdown or `max_time`.
    pub fn run(&mut self, sink: &mut dyn TelemetrySink) -> SimResult<FlightLog> {
        self.run_inner(sink, false)
    }

    /// Run, stopping with an error as soon as the state turns non-finite.
    pub fn run_checked(&mut self, sink: &mut dyn TelemetrySink) -> SimResult<FlightLog> {
        self.validate()?;
        self.run_inner(sink, true)
    }

    fn snapshot(&self) -> Snapshot {
        let density = self.atmosphere.density(self.kin.altitude());
        Snapshot::capture(&self.kin, &self.vehicle, density)
    }

    fn run_inner(&mut self, sink: &mut dyn TelemetrySink, checked: bool) -> SimResult<FlightLog> {
        let capacity = (self.config.max_time / self.config.dt) as usize + 1;
        let mut trajectory = Vec::with_capacity(capacity.min(200_000));
        trajectory.push(self.snapshot());

        log::debug!(
            "Running '{}' for up to {} s (autopilot {}, controller {})",
            self.name,
            self.config.max_time,
            if self.vehicle.autopilot_enabled { "on" } else { "off" },
            self.autopilot.name()
        );

        // Half-step margin absorbs rounding in the accumulated time
        let end = self.config.max_time - 0.5 * self.config.dt;
        while self.kin.time < end && self.outcome.is_none() {
            if checked {
                self.try_tick(sink)?;
            } else {
                self.tick(sink)?;
            }
            trajectory.push(self.snapshot());
        }

        Ok(FlightLog {
            name: self.name.clone(),
            dt: self.config.dt,
            trajectory,
            events: self.events.clone(),
            outcome: self.outcome,
        })
    }
}

// ---------------------------------------------------------------------------
// Convenience wrappers
// ---------------------------------------------------------------------------

/// Run a scenario with a custom controller, streaming telemetry to `sink`.
pub fn simulate_with(
    scenario: &ScenarioConfig,
    max_time: f64,
    controller: Box<dyn Controller>,
    sink: &mut dyn TelemetrySink,
) -> SimResult<FlightLog> {
    Simulation::from_scenario(scenario, max_time)?
        .with_controller(controller)
        .run(sink)
}

/// Run a scenario with the default descent autopilot, discarding telemetry.
pub fn simulate(scenario: &ScenarioConfig, max_time: f64) -> SimResult<FlightLog> {
    let mut sink = crate::io::telemetry::NullTelemetrySink;
    Simulation::from_scenario(scenario, max_time)?.run(&mut sink)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::telemetry::{MemoryTelemetrySink, NullTelemetrySink};
    use crate::physics::atmosphere::Vacuum;
    use crate::vehicle::scenario;
    use approx::assert_abs_diff_eq;

    /// Lander on the -y axis moving radially at `closing_rate`.
    fn descent(alt: f64, closing_rate: f64) -> Simulation {
        let kin = KinematicState::new(
            Vector3::new(0.0, -(MARS_RADIUS + alt), 0.0),
            Vector3::new(0.0, -closing_rate, 0.0),
        );
        let vehicle = VehicleState { stabilized_attitude: true, ..Default::default() };
        Simulation::new(kin, vehicle, LanderSpec::default(), SimConfig::default())
    }

    #[test]
    fn autopilot_off_emits_no_telemetry() {
        let mut sim = descent(1000.0, 0.0);
        let mut sink = MemoryTelemetrySink::default();
        for _ in 0..10 {
            let r = sim.tick(&mut sink).unwrap();
            assert!(r.sample.is_none());
        }
        assert!(sink.samples.is_empty());
        assert_eq!(sim.vehicle.throttle, 0.0);
    }

    #[test]
    fn autopilot_sample_per_tick_in_order() {
        let mut sim = descent(5000.0, 0.0);
        sim.set_autopilot(true);
        let mut sink = MemoryTelemetrySink::default();
        for _ in 0..20 {
            sim.tick(&mut sink).unwrap();
        }
        assert_eq!(sink.samples.len(), 20);
        // Falling from rest: altitude strictly decreasing
        for w in sink.samples.windows(2) {
            assert!(w[1].altitude < w[0].altitude);
        }
        let last = sink.samples.last().unwrap();
        assert_abs_diff_eq!(last.altitude, sim.kin.altitude(), epsilon = 1e-9);
        assert_eq!(sim.events()[0].kind, EventKind::AutopilotEngaged);
    }

    #[test]
    fn autopilot_lands_from_10km() {
        let mut s = scenario(1).unwrap();
        s.autopilot = true;
        let mut sim = Simulation::from_scenario(&s, 2000.0).unwrap();
        let log = sim.run(&mut NullTelemetrySink).unwrap();
        assert_eq!(log.outcome, Some(Outcome::Landed), "events: {:?}", log.events);
        let last = log.trajectory.last().unwrap();
        assert!(last.fuel > 0.0, "should not run dry");
    }

    #[test]
    fn free_fall_from_10km_crashes() {
        let s = scenario(1).unwrap();
        let log = simulate(&s, 2000.0).unwrap();
        assert_eq!(log.outcome, Some(Outcome::Crashed));
        match log.events.last().map(|e| &e.kind) {
            Some(EventKind::Touchdown { descent_rate, .. }) => assert!(*descent_rate > 1.0),
            other => panic!("expected touchdown, got {:?}", other),
        }
    }

    #[test]
    fn fuel_burns_with_throttle() {
        let mut sim = descent(5000.0, 0.0);
        sim.vehicle.throttle = 1.0;
        sim.tick(&mut NullTelemetrySink).unwrap();
        assert_abs_diff_eq!(sim.vehicle.fuel, 1.0 - 0.1 * 0.5 / 100.0, epsilon = 1e-12);
    }

    #[test]
    fn fuel_exhaustion_reported_once() {
        let mut sim = descent(100_000.0, 0.0);
        sim.vehicle.fuel = 0.0004;
        sim.vehicle.throttle = 1.0;
        for _ in 0..5 {
            sim.tick(&mut NullTelemetrySink).unwrap();
        }
        assert_eq!(sim.vehicle.fuel, 0.0);
        let n = sim.events().iter().filter(|e| e.kind == EventKind::FuelExhausted).count();
        assert_eq!(n, 1);
        // Empty tank: engine produces nothing
        assert_eq!(sim.forces().thrust, Vector3::zeros());
    }

    #[test]
    fn parachute_deploys_once() {
        let mut sim = descent(5000.0, -50.0);
        assert!(sim.safe_to_deploy_parachute());
        assert!(sim.deploy_parachute());
        assert!(!sim.deploy_parachute());
        assert_eq!(sim.vehicle.parachute, ParachuteState::Deployed);
        assert_eq!(sim.events()[0].kind, EventKind::ParachuteDeployed { safe: true });
    }

    #[test]
    fn parachute_tears_when_too_fast() {
        let mut sim = descent(20_000.0, -900.0);
        assert!(!sim.safe_to_deploy_parachute());
        sim.deploy_parachute();
        sim.tick(&mut NullTelemetrySink).unwrap();
        assert_eq!(sim.vehicle.parachute, ParachuteState::Lost);
        assert!(sim.events().iter().any(|e| e.kind == EventKind::ParachuteLost));
    }

    #[test]
    fn parachute_is_fine_above_exosphere() {
        let sim = descent(250_000.0, -900.0);
        assert!(sim.safe_to_deploy_parachute());
    }

    #[test]
    fn gentle_touchdown_lands() {
        let mut sim = descent(0.52, -0.2).with_atmosphere(Box::new(Vacuum));
        let log = sim.run(&mut NullTelemetrySink).unwrap();
        assert_eq!(log.outcome, Some(Outcome::Landed));
        assert_eq!(sim.kin.vel, Vector3::zeros());
        assert_abs_diff_eq!(sim.kin.altitude(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn sideways_touchdown_crashes() {
        let kin = KinematicState::new(
            Vector3::new(0.0, -(MARS_RADIUS + 0.55), 0.0),
            Vector3::new(5.0, 0.2, 0.0),
        );
        let mut sim = Simulation::new(kin, VehicleState::default(), LanderSpec::default(), SimConfig::default());
        sim.tick(&mut NullTelemetrySink).unwrap();
        assert_eq!(sim.outcome(), Some(Outcome::Crashed));
    }

    #[test]
    fn stabilizer_points_engine_up() {
        let mut sim = descent(3000.0, 0.0);
        sim.vehicle.attitude = attitude_from_euler_deg([0.0, 0.0, 90.0]);
        sim.tick(&mut NullTelemetrySink).unwrap();
        let axis = sim.vehicle.thrust_axis();
        assert_abs_diff_eq!((axis - sim.kin.up()).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn validation_catches_degenerate_state() {
        let mut sim = descent(1000.0, 0.0);
        sim.validate().unwrap();
        sim.config.dt = -0.1;
        assert!(matches!(sim.validate(), Err(SimError::Validation(_))));

        let mut sim = descent(1000.0, 0.0);
        sim.reset_state(Vector3::zeros(), Vector3::zeros());
        assert!(matches!(sim.validate(), Err(SimError::Validation(_))));
        assert!(matches!(sim.run_checked(&mut NullTelemetrySink), Err(SimError::Validation(_))));
    }

    #[test]
    fn unchecked_tick_propagates_nan_checked_tick_reports_it() {
        let mut sim = descent(1000.0, 0.0);
        sim.reset_state(Vector3::zeros(), Vector3::zeros());
        sim.tick(&mut NullTelemetrySink).unwrap();
        assert!(!sim.kin.is_finite());

        let mut sim = descent(1000.0, 0.0);
        sim.reset_state(Vector3::zeros(), Vector3::zeros());
        assert!(matches!(sim.try_tick(&mut NullTelemetrySink), Err(SimError::NonFinite { .. })));
    }

    #[test]
    fn run_stops_at_max_time() {
        let s = scenario(0).unwrap();
        let log = simulate(&s, 10.0).unwrap();
        assert_eq!(log.outcome, None);
        assert_eq!(log.trajectory.len(), 101);
        assert_abs_diff_eq!(log.trajectory.last().unwrap().time, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn exosphere_entry_event() {
        let mut s = scenario(5).unwrap();
        s.position[1] -= 500.0;
        let log = simulate(&s, 200.0).unwrap();
        assert!(log
            .events
            .iter()
            .any(|e| matches!(&e.kind, EventKind::Custom(m) if m.contains("200000m"))));
    }

    struct BrokenSink;

    impl TelemetrySink for BrokenSink {
        fn append(&mut self, _sample: TelemetrySample) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn sink_failure_still_completes_the_tick() {
        let mut sim = descent(1000.0, 0.0);
        sim.vehicle.autopilot_enabled = true;
        sim.vehicle.throttle = 1.0;

        let err = sim.tick(&mut BrokenSink).unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
        assert_abs_diff_eq!(sim.kin.time, 0.1, epsilon = 1e-12);
        // Thrust applied during the step is paid for
        assert_abs_diff_eq!(sim.vehicle.fuel, 1.0 - 0.1 * 0.5 / 100.0, epsilon = 1e-12);
    }

    #[test]
    fn sink_failure_does_not_skip_touchdown() {
        let mut sim = descent(0.52, -0.2);
        sim.vehicle.autopilot_enabled = true;
        assert!(sim.tick(&mut BrokenSink).is_err());
        assert_eq!(sim.outcome(), Some(Outcome::Landed));
    }
}
