use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, SimulationError};
use crate::types::AlgorithmKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Distance vector stops after `iteration_factor × router count` rounds.
    pub iteration_factor: i64,
    pub dv_tick_ms: u64,
    pub ls_tick_ms: u64,
    pub default_algorithm: AlgorithmKind,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iteration_factor: 10,
            dv_tick_ms: 500,
            ls_tick_ms: 300,
            default_algorithm: AlgorithmKind::DistanceVector,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.iteration_factor()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.dv_tick_ms == 0 || self.ls_tick_ms == 0 {
            return Err(ConfigError::Invalid("tick interval must be positive".into()));
        }
        Ok(())
    }

    pub fn iteration_factor(&self) -> Result<usize, SimulationError> {
        usize::try_from(self.iteration_factor)
            .map_err(|_| SimulationError::InvalidIterationBound(self.iteration_factor))
    }

    pub fn tick_interval(&self, algorithm: AlgorithmKind) -> Duration {
        match algorithm {
            AlgorithmKind::DistanceVector => Duration::from_millis(self.dv_tick_ms),
            AlgorithmKind::LinkState => Duration::from_millis(self.ls_tick_ms),
        }
    }
}
