use lander_sim::io::MemoryTelemetrySink;
use lander_sim::io::telemetry::ideal_closing_rate;
use lander_sim::sim::Simulation;
use lander_sim::vehicle::scenario;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Descent from rest at 10 km, autopilot on from the first tick
    let mut config = scenario(1)?;
    config.autopilot = true;

    let mut sink = MemoryTelemetrySink::default();
    let mut sim = Simulation::from_scenario(&config, 3600.0)?;
    let log = sim.run(&mut sink)?;

    println!("Scenario: {}", log.name);
    println!("{:>10}  {:>12}  {:>12}", "alt (m)", "rate (m/s)", "ideal (m/s)");
    let interval = (sink.samples.len() / 20).max(1);
    for s in sink.samples.iter().step_by(interval) {
        println!(
            "{:>10.1}  {:>12.2}  {:>12.2}",
            s.altitude,
            s.closing_rate,
            ideal_closing_rate(s.altitude, &config.autopilot_gains)
        );
    }

    for e in &log.events {
        println!("t={:.1}s  {:?}", e.time, e.kind);
    }
    println!(
        "Fuel remaining: {:.1}%  outcome: {:?}",
        sim.vehicle.fuel * 100.0,
        log.outcome
    );
    Ok(())
}
