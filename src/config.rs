//! Scenario configuration: initial conditions and vehicle overrides.

use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::dynamics::state::ParachuteState;
use crate::error::{SimError, SimResult};
use crate::gnc::AutopilotGains;
use crate::vehicle::LanderSpec;

/// Initial conditions of a run, as read from a scenario file or a preset.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: String,
    /// Planet-centred position, m.
    pub position: [f64; 3],
    /// m/s.
    pub velocity: [f64; 3],
    /// xyz Euler angles, degrees.
    #[serde(default)]
    pub orientation: [f64; 3],
    #[serde(default = "default_delta_t")]
    pub delta_t: f64,
    #[serde(default = "default_fuel")]
    pub fuel: f64,
    #[serde(default)]
    pub parachute: ParachuteState,
    #[serde(default)]
    pub stabilized_attitude: bool,
    #[serde(default)]
    pub autopilot: bool,
    #[serde(default)]
    pub lander: LanderSpec,
    #[serde(default)]
    pub autopilot_gains: AutopilotGains,
}

fn default_delta_t() -> f64 {
    0.1
}

fn default_fuel() -> f64 {
    1.0
}

impl ScenarioConfig {
    pub fn position(&self) -> Vector3<f64> {
        Vector3::from(self.position)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::from(self.velocity)
    }

    /// Parse a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Check that the scenario can be simulated meaningfully.
    pub fn validate(&self) -> SimResult<()> {
        let finite = self
            .position
            .iter()
            .chain(self.velocity.iter())
            .chain(self.orientation.iter())
            .all(|c| c.is_finite());
        if !finite {
            return Err(SimError::Validation(format!(
                "scenario '{}' has non-finite initial conditions",
                self.name
            )));
        }
        if !(self.delta_t > 0.0 && self.delta_t.is_finite()) {
            return Err(SimError::Validation(format!(
                "delta_t must be positive, got {}",
                self.delta_t
            )));
        }
        if !(0.0..=1.0).contains(&self.fuel) {
            return Err(SimError::Validation(format!(
                "fuel fraction must lie in [0, 1], got {}",
                self.fuel
            )));
        }
        if !(self.lander.mass(self.fuel) > 0.0) {
            return Err(SimError::Validation(format!(
                "lander mass must be positive, got {}",
                self.lander.mass(self.fuel)
            )));
        }
        if self.position().norm() == 0.0 {
            return Err(SimError::Validation(
                "position must not be the planet centre".into(),
            ));
        }
        Ok(())
    }
}

/// Load and validate a scenario from a TOML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> SimResult<ScenarioConfig> {
    let path = path.as_ref();
    log::debug!("Loading scenario from {}", path.display());
    let text = fs::read_to_string(path)?;
    let mut scenario = ScenarioConfig::from_toml_str(&text)?;
    if scenario.name.is_empty() {
        scenario.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    scenario.validate()?;
    Ok(scenario)
}
