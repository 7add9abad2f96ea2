//! Run command: resolve a batch of prompts on a virtual clock.

use std::path::Path;

use anyhow::Result;
use orchsim::{LoggedDecision, Message, SessionStatus, Simulator};
use serde::Serialize;

use crate::style::{self, colors::SemanticStyle};

/// JSON shape of a finished session.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Transcript<'a> {
    session_id: &'a str,
    seed: u32,
    chaos_mode: bool,
    status: SessionStatus,
    elapsed_ms: u64,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decisions: Option<&'a [LoggedDecision]>,
}

pub fn run(
    project: &Path,
    seed: Option<u32>,
    chaos: bool,
    json: bool,
    trace: bool,
    prompts: &[String],
) -> Result<()> {
    let config = super::load_config(project)?;
    let mut sim = Simulator::new(super::simulator_options(&config.simulator, seed));

    if chaos {
        sim.toggle_chaos_mode();
    }
    for prompt in prompts {
        sim.send_user(prompt.as_str())?;
    }
    let fired = sim.run_until_idle();
    tracing::debug!(fired, now_ms = sim.now_ms(), "session idle");

    if json {
        let transcript = Transcript {
            session_id: sim.session_id(),
            seed: sim.seed(),
            chaos_mode: sim.chaos_mode(),
            status: sim.status(),
            elapsed_ms: sim.now_ms(),
            messages: sim.messages(),
            decisions: trace.then(|| sim.decisions().entries()),
        };
        println!("{}", serde_json::to_string_pretty(&transcript)?);
        return Ok(());
    }

    println!(
        "{} {} (seed {})",
        "Session".header(),
        sim.session_id().code(),
        sim.seed().to_string().code()
    );
    println!("{}", style::transcript_table(&sim.messages()));

    if trace {
        style::print_spacer();
        println!("{}", "Decision log".header());
        println!("{}", style::decision_table(sim.decisions().entries()));
    }

    style::print_spacer();
    style::print_labeled("Status", &style::colors::session_status_label(sim.status()));
    style::print_labeled("Simulated time", &format!("{}ms", sim.now_ms()));
    style::print_hint(&format!(
        "reproduce with: orchsim run --seed {}{} ...",
        sim.seed(),
        if chaos { " --chaos" } else { "" }
    ));

    Ok(())
}
