use lander_sim::dynamics::state::KinematicState;
use lander_sim::gnc::{ControlOutput, Controller};
use lander_sim::io::{NullTelemetrySink, TelemetrySample};
use lander_sim::sim;
use lander_sim::vehicle::scenario;

/// Free-falls until a fixed altitude, then burns flat out until the descent
/// rate drops below a target and coasts again.
struct SuicideBurn {
    ignition_altitude: f64,
    target_rate: f64,
    burning: bool,
}

impl Controller for SuicideBurn {
    fn control(&mut self, state: &KinematicState, _dt: f64) -> ControlOutput {
        let altitude = state.altitude();
        let closing_rate = state.closing_rate();
        if altitude < self.ignition_altitude {
            self.burning = -closing_rate > self.target_rate;
        }
        ControlOutput {
            throttle: if self.burning { 1.0 } else { 0.0 },
            sample: TelemetrySample { altitude, closing_rate },
        }
    }

    fn reset(&mut self) {
        self.burning = false;
    }

    fn name(&self) -> &str {
        "SuicideBurn"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = scenario(1)?;
    config.autopilot = true;

    let controller = SuicideBurn {
        ignition_altitude: 2500.0,
        target_rate: 3.0,
        burning: false,
    };

    println!("Simulating with {} controller...", controller.name());
    let log = sim::simulate_with(&config, 3600.0, Box::new(controller), &mut NullTelemetrySink)?;

    let last = log.trajectory.last().ok_or("empty trajectory")?;
    println!("Flight time: {:.1} s", last.time);
    println!("Fuel left:   {:.1}%", last.fuel * 100.0);
    for e in &log.events {
        println!("t={:.1}s  {:?}", e.time, e.kind);
    }
    println!("Outcome:     {:?}", log.outcome);
    Ok(())
}
