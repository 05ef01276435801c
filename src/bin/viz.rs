use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use lander_sim::dynamics::state::Snapshot;
use lander_sim::gnc::AutopilotGains;
use lander_sim::io::telemetry::{
    ideal_closing_rate, read_telemetry_file, starts_on_ideal_profile, TelemetrySample,
};
use lander_sim::io::MemoryTelemetrySink;
use lander_sim::sim::Simulation;
use lander_sim::vehicle::scenario;

/// Plot autopilot descent telemetry against the ideal profile.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Telemetry file ("altitude closing_rate" lines). Without one, a preset
    /// scenario is flown with the autopilot engaged.
    telemetry: Option<PathBuf>,

    /// Preset scenario flown when no telemetry file is given.
    #[arg(short, long, default_value_t = 1)]
    scenario: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let gains = AutopilotGains::default();

    let app = match &args.telemetry {
        Some(path) => LanderViz {
            title: path.display().to_string(),
            samples: read_telemetry_file(path)?,
            trajectory: Vec::new(),
            gains,
        },
        None => {
            let mut config = scenario(args.scenario)?;
            config.autopilot = true;
            let mut sink = MemoryTelemetrySink::default();
            let log = Simulation::from_scenario(&config, 3600.0)?.run(&mut sink)?;
            LanderViz {
                title: config.name,
                samples: sink.samples,
                trajectory: log.trajectory,
                gains: config.autopilot_gains,
            }
        }
    };
    log::info!("Plotting {} telemetry samples", app.samples.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Mars Lander Descent", options, Box::new(|_| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("{e}"))
}

struct LanderViz {
    title: String,
    samples: Vec<TelemetrySample>,
    trajectory: Vec<Snapshot>,
    gains: AutopilotGains,
}

impl eframe::App for LanderViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.samples.len() / 2000).max(1);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Scenario: {}", self.title));
            let start = self.samples.first().map_or(0.0, |s| s.altitude);
            let last = self.samples.last().map_or(0.0, |s| s.closing_rate);
            ui.label(format!(
                "Samples: {}  |  Start altitude: {:.1} km  |  Final closing rate: {:.2} m/s",
                self.samples.len(),
                start / 1000.0,
                last,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let plot_h = if self.trajectory.is_empty() {
                available.y - 8.0
            } else {
                available.y / 2.0 - 8.0
            };

            // Closing rate vs altitude, with the profile the autopilot tracks
            ui.label("Closing rate (m/s) vs altitude (m)");
            let actual: PlotPoints = self.samples.iter()
                .step_by(step)
                .map(|s| [s.altitude, s.closing_rate])
                .collect();
            let ideal: Option<PlotPoints> = starts_on_ideal_profile(&self.samples).then(|| {
                self.samples.iter()
                    .step_by(step)
                    .map(|s| [s.altitude, ideal_closing_rate(s.altitude, &self.gains)])
                    .collect()
            });
            Plot::new("descent_profile")
                .height(plot_h)
                .x_axis_label("Altitude (m)")
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Actual", actual));
                    if let Some(ideal) = ideal {
                        plot_ui.line(Line::new("Ideal", ideal));
                    }
                });

            if !self.trajectory.is_empty() {
                ui.label("Altitude (km)");
                let tstep = (self.trajectory.len() / 2000).max(1);
                let points: PlotPoints = self.trajectory.iter()
                    .step_by(tstep)
                    .map(|s| [s.time, s.altitude() / 1000.0])
                    .collect();
                Plot::new("altitude")
                    .height(plot_h)
                    .x_axis_label("Time (s)")
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new("Altitude", points));
                    });
            }
        });
    }
}
