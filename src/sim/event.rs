use serde::Serialize;

use crate::dynamics::state::KinematicState;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// How a touchdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Landed,
    Crashed,
}

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ParachuteDeployed { safe: bool },
    ParachuteLost,
    FuelExhausted,
    AutopilotEngaged,
    AutopilotDisengaged,
    Touchdown { outcome: Outcome, descent_rate: f64, ground_speed: f64 },
    Custom(String),
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    pub time: f64,
    pub altitude: f64,
    pub kind: EventKind,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &KinematicState, current: &KinematicState) -> Option<EventKind>;
}

/// Detects when altitude crosses a threshold (ascending or descending).
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool) -> Self {
        Self { altitude, ascending, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &KinematicState, current: &KinematicState) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let (h0, h1) = (prev.altitude(), current.altitude());
        let crossed = if self.ascending {
            h0 < self.altitude && h1 >= self.altitude
        } else {
            h0 > self.altitude && h1 <= self.altitude
        };
        if crossed {
            self.fired = true;
            Some(EventKind::Custom(format!(
                "Altitude {:.0}m ({})",
                self.altitude,
                if self.ascending { "ascending" } else { "descending" }
            )))
        } else {
            None
        }
    }
}

/// Detects periapsis and apoapsis passages (sign change of the closing rate).
#[derive(Default)]
pub struct ApsisDetector;

impl EventDetector for ApsisDetector {
    fn check(&mut self, prev: &KinematicState, current: &KinematicState) -> Option<EventKind> {
        let (r0, r1) = (prev.closing_rate(), current.closing_rate());
        if r0 < 0.0 && r1 >= 0.0 {
            Some(EventKind::Custom(format!("Periapsis {:.0}m", current.altitude())))
        } else if r0 > 0.0 && r1 <= 0.0 {
            Some(EventKind::Custom(format!("Apoapsis {:.0}m", current.altitude())))
        } else {
            None
        }
    }
}
