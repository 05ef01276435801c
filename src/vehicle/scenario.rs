use crate::config::ScenarioConfig;
use crate::dynamics::state::ParachuteState;
use crate::error::{SimError, SimResult};
use crate::gnc::AutopilotGains;
use crate::physics::atmosphere::EXOSPHERE;
use crate::physics::gravity::MARS_RADIUS;
use crate::vehicle::LanderSpec;

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

pub const SCENARIO_COUNT: usize = 10;

const DESCRIPTIONS: [&str; SCENARIO_COUNT] = [
    "circular orbit",
    "descent from 10km",
    "elliptical orbit, thrust changes orbital plane",
    "polar launch at escape velocity (but drag prevents escape)",
    "elliptical orbit that clips the atmosphere and decays",
    "descent from 200km",
    "",
    "",
    "",
    "",
];

/// Descriptions of all preset slots, empty for unused slots.
pub fn scenario_descriptions() -> &'static [&'static str; SCENARIO_COUNT] {
    &DESCRIPTIONS
}

fn preset(
    idx: usize,
    position: [f64; 3],
    velocity: [f64; 3],
    orientation: [f64; 3],
    stabilized_attitude: bool,
) -> ScenarioConfig {
    ScenarioConfig {
        name: DESCRIPTIONS[idx].to_string(),
        position,
        velocity,
        orientation,
        delta_t: 0.1,
        fuel: 1.0,
        parachute: ParachuteState::NotDeployed,
        stabilized_attitude,
        autopilot: false,
        lander: LanderSpec::default(),
        autopilot_gains: AutopilotGains::default(),
    }
}

/// Initial conditions for preset `idx`.
pub fn scenario(idx: usize) -> SimResult<ScenarioConfig> {
    let r = MARS_RADIUS;
    let s = match idx {
        0 => preset(0, [1.2 * r, 0.0, 0.0], [0.0, -3247.087385863725, 0.0], [0.0, 90.0, 0.0], false),
        1 => preset(1, [0.0, -(r + 10_000.0), 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 90.0], true),
        2 => preset(2, [0.0, 0.0, 1.2 * r], [3500.0, 0.0, 0.0], [0.0, 0.0, 90.0], false),
        3 => {
            let size = LanderSpec::default().size;
            preset(3, [0.0, 0.0, r + size / 2.0], [0.0, 0.0, 5027.0], [0.0, 0.0, 0.0], false)
        }
        4 => preset(4, [0.0, 0.0, r + 100_000.0], [4000.0, 0.0, 0.0], [0.0, 90.0, 0.0], false),
        5 => preset(5, [0.0, -(r + EXOSPHERE), 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 90.0], true),
        _ => return Err(SimError::UnknownScenario(idx)),
    };
    Ok(s)
}
