pub mod config;
pub mod error;
pub mod physics;
pub mod dynamics;
pub mod vehicle;
mod gnc_mod;
pub mod sim;
pub mod io;
pub mod orbital;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use error::{SimError, SimResult};

// Flat re-exports of the types most callers need
pub mod types {
    pub use crate::config::ScenarioConfig;
    pub use crate::dynamics::state::{KinematicState, ParachuteState, SimConfig, Snapshot, VehicleState};
    pub use crate::sim::event::{EventKind, Outcome, SimEvent};
    pub use crate::sim::runner::FlightLog;
    pub use crate::vehicle::lander::LanderSpec;
}
