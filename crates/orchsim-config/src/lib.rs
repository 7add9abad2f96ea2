//! Configuration management for orchsim
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the caller)
//! 2. Environment variables (`ORCHSIM_<SECTION>__<KEY>`)
//! 3. orchsim.local.toml (gitignored, local overrides)
//! 4. orchsim.toml (git-tracked, project config)
//! 5. ~/.config/orchsim/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main orchsim configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchsimConfig {
    pub simulator: SimulatorSection,
    pub console: ConsoleSection,
}

/// Simulator construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSection {
    /// Fixed seed; derived from wall-clock time when absent.
    pub seed: Option<u32>,
    pub base_delay_min_ms: u64,
    pub base_delay_max_ms: u64,
    pub warning_pct: f64,
    pub error_pct: f64,
    pub long_running_delay_ms: u64,
    pub cancel_pending_on_clear: bool,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            seed: None,
            base_delay_min_ms: 800,
            base_delay_max_ms: 2_500,
            warning_pct: 0.10,
            error_pct: 0.05,
            long_running_delay_ms: 10_000,
            cancel_pending_on_clear: false,
        }
    }
}

/// Settings for the polling console driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    pub poll_interval_ms: u64,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
        }
    }
}

impl OrchsimConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Checks ranges the simulator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulator;

        if sim.base_delay_min_ms > sim.base_delay_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "simulator.base_delay_min_ms ({}) exceeds simulator.base_delay_max_ms ({})",
                sim.base_delay_min_ms, sim.base_delay_max_ms
            )));
        }

        for (name, pct) in [
            ("simulator.warning_pct", sim.warning_pct),
            ("simulator.error_pct", sim.error_pct),
        ] {
            if !(0.0..1.0).contains(&pct) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be in [0, 1), got {pct}"
                )));
            }
        }

        if self.console.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "console.poll_interval_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
