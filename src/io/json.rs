use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::orbital::KeplerianElements;
use crate::physics::aerodynamics::dynamic_pressure;
use crate::sim::event::{Outcome, SimEvent};
use crate::sim::runner::FlightLog;

/// Summary statistics computed from a recorded flight.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub scenario: String,
    pub dt: f64,
    pub flight_time: f64,
    pub initial_altitude: f64,
    pub max_altitude: f64,
    pub min_altitude: f64,
    pub max_speed: f64,
    pub max_descent_rate: f64,
    pub max_dynamic_pressure: f64,   // Pa, in the atmosphere the run used
    pub fuel_used: f64,               // fraction of capacity
    pub outcome: Option<Outcome>,
    pub touchdown_speed: Option<f64>,
    pub initial_orbit: Option<OrbitSummary>,
    pub events: Vec<SimEvent>,
}

/// Orbit shape at the start of the run.
#[derive(Debug, Clone, Serialize)]
pub struct OrbitSummary {
    pub eccentricity: f64,
    pub periapsis_altitude: f64,
    pub apoapsis_altitude: Option<f64>,
    pub period: Option<f64>,
}

impl FlightSummary {
    /// Compute summary from a flight log. The trajectory must not be empty.
    pub fn from_log(log: &FlightLog) -> Self {
        let traj = &log.trajectory;
        let first = &traj[0];
        let last = &traj[traj.len() - 1];

        let max_altitude = traj.iter().map(|s| s.altitude()).fold(f64::MIN, f64::max);
        let min_altitude = traj.iter().map(|s| s.altitude()).fold(f64::MAX, f64::min);
        let max_speed = traj.iter().map(|s| s.vel.norm()).fold(0.0_f64, f64::max);
        let max_descent_rate = traj
            .iter()
            .map(|s| -s.closing_rate())
            .fold(0.0_f64, f64::max);

        let max_dynamic_pressure = traj
            .iter()
            .map(|s| dynamic_pressure(&s.vel, s.density))
            .fold(0.0_f64, f64::max);

        let touchdown_speed = log.events.iter().rev().find_map(|e| match e.kind {
            crate::sim::event::EventKind::Touchdown { descent_rate, ground_speed, .. } => {
                Some(descent_rate.hypot(ground_speed))
            }
            _ => None,
        });

        let el = KeplerianElements::from_state_vector(&first.pos, &first.vel);
        let initial_orbit = (first.vel.norm() > 0.0).then(|| OrbitSummary {
            eccentricity: el.ecc,
            periapsis_altitude: el.periapsis_altitude(),
            apoapsis_altitude: el.apoapsis_altitude(),
            period: el.period(),
        });

        FlightSummary {
            scenario: log.name.clone(),
            dt: log.dt,
            flight_time: last.time,
            initial_altitude: first.altitude(),
            max_altitude,
            min_altitude,
            max_speed,
            max_descent_rate,
            max_dynamic_pressure,
            fuel_used: first.fuel - last.fuel,
            outcome: log.outcome,
            touchdown_speed,
            initial_orbit,
            events: log.events.clone(),
        }
    }
}

/// Write flight summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{ParachuteState, Snapshot};
    use crate::physics::atmosphere::{Atmosphere, MarsAtmosphere};
    use crate::physics::gravity::MARS_RADIUS;
    use crate::sim::event::EventKind;
    use nalgebra::Vector3;

    fn snap(t: f64, alt: f64, vy: f64, fuel: f64) -> Snapshot {
        Snapshot {
            time: t,
            pos: Vector3::new(0.0, -(MARS_RADIUS + alt), 0.0),
            vel: Vector3::new(0.0, vy, 0.0),
            throttle: 0.0,
            fuel,
            parachute: ParachuteState::NotDeployed,
            density: MarsAtmosphere::default().density(alt),
        }
    }

    fn simple_log() -> FlightLog {
        FlightLog {
            name: "Test".into(),
            dt: 0.1,
            trajectory: vec![
                snap(0.0, 1000.0, 0.0, 1.0),
                snap(10.0, 800.0, 40.0, 0.9),
                snap(20.0, 0.4, 0.6, 0.7),
            ],
            events: vec![SimEvent {
                time: 20.0,
                altitude: 0.4,
                kind: EventKind::Touchdown {
                    outcome: Outcome::Landed,
                    descent_rate: 0.6,
                    ground_speed: 0.0,
                },
            }],
            outcome: Some(Outcome::Landed),
        }
    }

    #[test]
    fn summary_statistics() {
        let s = FlightSummary::from_log(&simple_log());
        assert!((s.max_altitude - 1000.0).abs() < 1e-6);
        assert!((s.min_altitude - 0.4).abs() < 1e-6);
        assert!((s.max_descent_rate - 40.0).abs() < 1e-9);
        assert!((s.fuel_used - 0.3).abs() < 1e-12);
        // 40 m/s at 800 m is the peak
        let q = 0.5 * 0.017 * (-800.0_f64 / 11_000.0).exp() * 1600.0;
        assert!((s.max_dynamic_pressure - q).abs() < 1e-9);
        assert!((s.touchdown_speed.unwrap() - 0.6).abs() < 1e-12);
        assert!(s.initial_orbit.is_none(), "starts at rest");
    }

    #[test]
    fn vacuum_run_has_no_dynamic_pressure() {
        let mut log = simple_log();
        for s in log.trajectory.iter_mut() {
            s.density = 0.0;
        }
        assert_eq!(FlightSummary::from_log(&log).max_dynamic_pressure, 0.0);
    }

    #[test]
    fn json_output_is_valid() {
        let summary = FlightSummary::from_log(&simple_log());
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["scenario"], "Test");
        assert_eq!(value["outcome"], "landed");
        assert_eq!(value["events"][0]["kind"]["touchdown"]["outcome"], "landed");
    }
}
