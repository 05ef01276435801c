use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use lander_sim::config::{load_scenario, ScenarioConfig};
use lander_sim::gnc::{Controller, DescentAutopilot, PidDescent};
use lander_sim::io::csv::write_trajectory_file;
use lander_sim::io::json::{write_summary_file, FlightSummary};
use lander_sim::io::{FileTelemetrySink, NullTelemetrySink, TelemetrySink};
use lander_sim::sim::event::ApsisDetector;
use lander_sim::sim::{Outcome, Simulation};
use lander_sim::vehicle::{scenario, scenario_descriptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerKind {
    Proportional,
    Pid,
}

/// Mars lander descent and orbit simulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Preset scenario index.
    #[arg(short, long, default_value_t = 1, conflicts_with = "config")]
    scenario: usize,

    /// Scenario file (TOML) instead of a preset.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engage the descent autopilot from the first tick.
    #[arg(short, long)]
    autopilot: bool,

    /// Descent controller used when the autopilot is engaged.
    #[arg(long, value_enum, default_value_t = ControllerKind::Proportional)]
    controller: ControllerKind,

    /// Simulated time limit, s.
    #[arg(long, default_value_t = 3600.0)]
    max_time: f64,

    /// Override the scenario time step, s.
    #[arg(long)]
    dt: Option<f64>,

    /// Write "altitude closing_rate" autopilot telemetry here.
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Write the per-tick trajectory as CSV.
    #[arg(long)]
    trajectory: Option<PathBuf>,

    /// Write the flight summary as JSON.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// List the preset scenarios and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for (i, desc) in scenario_descriptions().iter().enumerate() {
            if !desc.is_empty() {
                println!("  {:>2}  {}", i, desc);
            }
        }
        return Ok(());
    }

    let mut config = load(&args)?;
    if let Some(dt) = args.dt {
        config.delta_t = dt;
    }
    config.autopilot |= args.autopilot;

    let controller: Box<dyn Controller> = match args.controller {
        ControllerKind::Proportional => Box::new(DescentAutopilot::new(config.autopilot_gains)),
        ControllerKind::Pid => Box::new(PidDescent::new(config.autopilot_gains, 0.5)),
    };

    let mut sim = Simulation::from_scenario(&config, args.max_time)
        .with_context(|| format!("invalid scenario '{}'", config.name))?
        .with_controller(controller);
    if config.velocity().norm() > 0.0 {
        sim = sim.with_detector(Box::new(ApsisDetector));
    }

    let mut sink: Box<dyn TelemetrySink> = match &args.telemetry {
        Some(path) => Box::new(FileTelemetrySink::new(path)),
        None => Box::new(NullTelemetrySink),
    };
    let log = sim.run_checked(sink.as_mut())?;
    drop(sink);

    let summary = FlightSummary::from_log(&log);
    print_report(&config, &sim, &summary);

    if let Some(path) = &args.trajectory {
        write_trajectory_file(path, &log.trajectory)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Trajectory written to {}", path.display());
    }
    if let Some(path) = &args.summary {
        write_summary_file(path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Summary written to {}", path.display());
    }
    Ok(())
}

fn load(args: &Args) -> anyhow::Result<ScenarioConfig> {
    match &args.config {
        Some(path) => {
            load_scenario(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(scenario(args.scenario)?),
    }
}

fn print_report(config: &ScenarioConfig, sim: &Simulation, s: &FlightSummary) {
    let rule = "─".repeat(66);
    println!();
    println!("====================================================================");
    println!("  MARS LANDER SIMULATION: {}", config.name);
    println!("====================================================================");
    println!();
    println!("  Lander");
    println!("  {}", rule);
    println!(
        "  Unloaded mass: {:>8.1} kg    Fuel:        {:>8.1} l",
        config.lander.unloaded_mass,
        config.fuel * config.lander.fuel_capacity
    );
    println!(
        "  Max thrust:    {:>8.0} N     TWR:         {:>8.2}",
        config.lander.max_thrust,
        config.lander.twr()
    );
    println!(
        "  Autopilot:     {:>8}       Controller:  {}",
        if config.autopilot { "on" } else { "off" },
        sim.controller_name()
    );
    println!();

    if let Some(orbit) = &s.initial_orbit {
        println!("  Initial Orbit");
        println!("  {}", rule);
        println!(
            "  Eccentricity:  {:>8.4}       Periapsis:   {:>8.1} km",
            orbit.eccentricity,
            orbit.periapsis_altitude / 1000.0
        );
        match (orbit.apoapsis_altitude, orbit.period) {
            (Some(apo), Some(period)) => println!(
                "  Apoapsis:      {:>8.1} km    Period:      {:>8.0} s",
                apo / 1000.0,
                period
            ),
            _ => println!("  Unbound trajectory"),
        }
        println!();
    }

    println!("  Flight Events");
    println!("  {}", rule);
    if s.events.is_empty() {
        println!("  (none)");
    }
    for e in &s.events {
        println!("  t={:>7.1}s   alt={:>9.0}m   {:?}", e.time, e.altitude, e.kind);
    }
    println!();

    println!("  Performance Summary");
    println!("  {}", rule);
    println!("  Initial altitude: {:>9.0} m", s.initial_altitude);
    println!("  Max altitude:     {:>9.0} m", s.max_altitude);
    println!("  Max speed:        {:>9.1} m/s", s.max_speed);
    println!("  Max descent rate: {:>9.1} m/s", s.max_descent_rate);
    println!("  Max dyn pressure: {:>9.1} Pa", s.max_dynamic_pressure);
    println!("  Fuel used:        {:>9.1} %", s.fuel_used * 100.0);
    println!("  Flight time:      {:>9.1} s", s.flight_time);
    match (s.outcome, s.touchdown_speed) {
        (Some(Outcome::Landed), Some(v)) => println!("  LANDED at {:.2} m/s", v),
        (Some(Outcome::Crashed), Some(v)) => println!("  CRASHED at {:.2} m/s", v),
        _ => println!("  Still flying at t={:.1} s", s.flight_time),
    }
    println!();
    println!("  Simulation: dt={} s", s.dt);
    println!("====================================================================");
    println!();
}
