pub mod forces;
pub mod state;

pub use forces::{force_breakdown, forces, thrust_force, Forces};
pub use state::{KinematicState, ParachuteState, SimConfig, Snapshot, VehicleState};
