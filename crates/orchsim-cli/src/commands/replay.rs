//! Replay command: prove a seed reproduces the same session.

use std::path::Path;

use anyhow::{Result, bail};
use orchsim::{SimError, Simulator, SimulatorOptions};

use crate::style::{self, colors::SemanticStyle};

fn session(options: &SimulatorOptions, prompts: &[String]) -> Result<Simulator, SimError> {
    let mut sim = Simulator::new(options.clone());
    for prompt in prompts {
        sim.send_user(prompt.as_str())?;
    }
    sim.run_until_idle();
    Ok(sim)
}

pub fn run(project: &Path, seed: u32, prompts: &[String]) -> Result<()> {
    let config = super::load_config(project)?;
    let options = super::simulator_options(&config.simulator, Some(seed));

    println!(
        "Replaying {} prompt(s) with seed {}...",
        prompts.len().to_string().header(),
        seed.to_string().code()
    );

    let first = session(&options, prompts)?;
    let second = session(&options, prompts)?;

    let first_json = serde_json::to_string(&first.messages())?;
    let second_json = serde_json::to_string(&second.messages())?;

    if let Some(index) = first.decisions().first_divergence(second.decisions()) {
        style::print_error(&format!("decision logs diverge at entry {index}"));
        bail!("replay of seed {seed} diverged at decision {index}");
    }
    if first_json != second_json {
        style::print_error("snapshots differ");
        bail!("replay of seed {seed} produced different snapshots");
    }

    style::print_success(&format!(
        "{} messages and {} decisions identical across runs",
        first.messages().len(),
        first.decisions().len()
    ));
    style::print_labeled("Session", first.session_id());
    style::print_labeled("Snapshot bytes", &first_json.len().to_string());
    Ok(())
}
