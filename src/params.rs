use crate::error::{Error, Result};

use serde::Deserialize;
use std::path::Path;

/// User-facing simulation settings. Each value carries a supported range;
/// out-of-range values are rejected at load time.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_agents: usize,
    pub speed_mean: f64,
    pub speed_std_dev: f64,
    pub seed: u64,
}

pub const MIN_AGENTS: usize = 5;
pub const MAX_AGENTS: usize = 50;
pub const MIN_SPEED_MEAN: f64 = 1.0;
pub const MAX_SPEED_MEAN: f64 = 2.0;
pub const MIN_SPEED_STD_DEV: f64 = 0.01;
pub const MAX_SPEED_STD_DEV: f64 = 0.1;

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            num_agents: 20,
            speed_mean: 1.34,
            speed_std_dev: 0.05,
            seed: 1,
        }
    }
}

impl SimulationParams {
    pub fn validated(self) -> Result<Self> {
        if self.num_agents < MIN_AGENTS || self.num_agents > MAX_AGENTS {
            return Err(Error::Params {
                name: "num_agents",
                value: self.num_agents as f64,
                min: MIN_AGENTS as f64,
                max: MAX_AGENTS as f64,
            });
        }
        if !(MIN_SPEED_MEAN..=MAX_SPEED_MEAN).contains(&self.speed_mean) {
            return Err(Error::Params {
                name: "speed_mean",
                value: self.speed_mean,
                min: MIN_SPEED_MEAN,
                max: MAX_SPEED_MEAN,
            });
        }
        if !(MIN_SPEED_STD_DEV..=MAX_SPEED_STD_DEV).contains(&self.speed_std_dev) {
            return Err(Error::Params {
                name: "speed_std_dev",
                value: self.speed_std_dev,
                min: MIN_SPEED_STD_DEV,
                max: MAX_SPEED_STD_DEV,
            });
        }
        Ok(self)
    }

    /// Load settings from a TOML file. Missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: SimulationParams = toml::from_str(&text)?;
        params.validated()
    }
}
