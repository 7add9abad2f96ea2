//! Configuration loader with multi-source merging

use crate::{OrchsimConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    include_user_config: bool,
}

impl ConfigLoader {
    /// Loader rooted at the current directory
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "ORCHSIM".to_string(),
            include_user_config: true,
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "ORCHSIM")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/orchsim/config.toml, so results depend only on the
    /// project directory and environment.
    pub fn without_user_config(mut self) -> Self {
        self.include_user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence, then
    /// validate the merged result.
    pub fn load(self) -> Result<OrchsimConfig> {
        let mut builder = config::Config::builder();

        // 1. Built-in defaults
        let defaults = OrchsimConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config
        if self.include_user_config {
            if let Ok(user_config_file) = Paths::new().user_config_file() {
                if user_config_file.exists() {
                    builder = builder.add_source(toml_file(user_config_file));
                }
            }
        }

        // 3. Project config
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(toml_file(project_config_file));
        }

        // 4. Local overrides
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(toml_file(local_config_file));
        }

        // 5. Environment, e.g. ORCHSIM_SIMULATOR__ERROR_PCT=0.2
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let orchsim_config: OrchsimConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        orchsim_config
            .validate()
            .with_context(|| format!("in configuration for {}", self.project_dir.display()))?;

        Ok(orchsim_config)
    }

    /// Load configuration or return defaults if loading fails
    pub fn load_or_default(self) -> OrchsimConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_file(path: PathBuf) -> config::File<config::FileSourceFile, config::FileFormat> {
    config::File::from(path)
        .required(false)
        .format(config::FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader(dir: &Path) -> ConfigLoader {
        // A prefix nothing sets, so the host environment cannot leak in.
        ConfigLoader::new()
            .with_project_dir(dir)
            .with_env_prefix("ORCHSIM_LOADER_UNIT_TEST")
            .without_user_config()
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path()).load().expect("Failed to load config");

        assert_eq!(config, OrchsimConfig::default());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("orchsim.toml"),
            r#"
[simulator]
seed = 42
base_delay_min_ms = 100
base_delay_max_ms = 200
cancel_pending_on_clear = true

[console]
poll_interval_ms = 50
"#,
        )
        .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.simulator.seed, Some(42));
        assert_eq!(config.simulator.base_delay_min_ms, 100);
        assert_eq!(config.simulator.base_delay_max_ms, 200);
        assert!(config.simulator.cancel_pending_on_clear);
        assert_eq!(config.simulator.warning_pct, 0.10);
        assert_eq!(config.console.poll_interval_ms, 50);
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("orchsim.toml"),
            "[simulator]\nseed = 1\nerror_pct = 0.05\n",
        )
        .expect("Failed to write project config");
        fs::write(
            project_dir.join("orchsim.local.toml"),
            "[simulator]\nseed = 7\n",
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.simulator.seed, Some(7));
        assert_eq!(config.simulator.error_pct, 0.05);
    }

    #[test]
    fn test_invalid_config_fails_validation() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("orchsim.toml"),
            "[simulator]\nbase_delay_min_ms = 900\nbase_delay_max_ms = 10\n",
        )
        .expect("Failed to write config");

        let err = loader(project_dir).load().unwrap_err();
        assert!(format!("{err:#}").contains("base_delay_min_ms"));
        assert_eq!(loader(project_dir).load_or_default(), OrchsimConfig::default());
    }
}
