pub mod event;
pub mod integrator;
pub mod runner;

pub use event::{EventKind, Outcome, SimEvent};
pub use integrator::{Bootstrap, VerletIntegrator};
pub use runner::{simulate, simulate_with, FlightLog, Simulation, StepReport};
