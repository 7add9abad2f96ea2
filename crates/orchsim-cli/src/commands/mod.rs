//! CLI command implementations.

pub mod config;
pub mod live;
pub mod machine;
pub mod replay;
pub mod run;
pub mod sweep;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use orchsim::SimulatorOptions;
use orchsim_config::{OrchsimConfig, SimulatorSection};

/// Loads the merged configuration for a project directory.
pub fn load_config(project: &Path) -> Result<OrchsimConfig> {
    OrchsimConfig::load_from_dir(project).context("Failed to load configuration")
}

/// Builds simulator options from configuration; `seed` wins over the
/// configured seed when given.
pub fn simulator_options(section: &SimulatorSection, seed: Option<u32>) -> SimulatorOptions {
    SimulatorOptions {
        seed: seed.or(section.seed),
        base_delay_min_ms: section.base_delay_min_ms,
        base_delay_max_ms: section.base_delay_max_ms,
        warning_pct: section.warning_pct,
        error_pct: section.error_pct,
        long_running_delay_ms: section.long_running_delay_ms,
        cancel_pending_on_clear: section.cancel_pending_on_clear,
        record_decisions: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_seed_overrides_config() {
        let section = SimulatorSection {
            seed: Some(1),
            ..SimulatorSection::default()
        };

        assert_eq!(simulator_options(&section, Some(9)).seed, Some(9));
        assert_eq!(simulator_options(&section, None).seed, Some(1));
    }

    #[test]
    fn defaults_match_library_defaults() {
        let options = simulator_options(&SimulatorSection::default(), None);
        assert_eq!(options, SimulatorOptions::default());
    }
}
