//! Configuration commands.

use std::path::Path;

use anyhow::{Result, bail};
use orchsim_config::Paths;

use crate::style::{self, colors::SemanticStyle};

/// Show the merged configuration.
pub fn show(project: &Path, format: &str) -> Result<()> {
    let config = super::load_config(project)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        "toml" => {
            println!("{}", config.to_toml_string()?);
        }
        "text" => {
            let sim = &config.simulator;
            println!("{}", "orchsim Configuration".header());
            style::print_spacer();

            println!("Simulator:");
            println!(
                "{}",
                style::info_table(&[
                    (
                        "seed",
                        sim.seed
                            .map_or_else(|| "time-derived".to_string(), |s| s.to_string()),
                    ),
                    (
                        "delay",
                        format!("{}..={}ms", sim.base_delay_min_ms, sim.base_delay_max_ms),
                    ),
                    ("warning_pct", sim.warning_pct.to_string()),
                    ("error_pct", sim.error_pct.to_string()),
                    ("long_running_delay", format!("{}ms", sim.long_running_delay_ms)),
                    (
                        "cancel_pending_on_clear",
                        sim.cancel_pending_on_clear.to_string(),
                    ),
                ])
            );
            style::print_spacer();

            println!("Console:");
            style::print_labeled(
                "poll_interval",
                &format!("{}ms", config.console.poll_interval_ms),
            );
            style::print_spacer();

            let project_file = Paths::project_config_file(project);
            if !project_file.exists() {
                style::print_hint(&format!(
                    "no {} found; showing defaults and environment overrides",
                    project_file.display()
                ));
            }
        }
        other => bail!("unknown format '{other}' (expected text, json, or toml)"),
    }

    Ok(())
}
