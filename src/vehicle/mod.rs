pub mod lander;
pub mod scenario;

pub use lander::{LanderSpec, LanderSpecBuilder};
pub use scenario::{scenario, scenario_descriptions, SCENARIO_COUNT};
