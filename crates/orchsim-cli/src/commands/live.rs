//! Live command: wall-clock session observed by polling snapshots.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use orchsim::{Message, Simulator, SystemClock};

use crate::style::{self, colors::SemanticStyle};

/// Reports entries whose status changed between two snapshots. Positions
/// are stable, so comparing index by index is enough.
fn report_changes(previous: &[Message], current: &[Message], elapsed_ms: u64) {
    for (before, after) in previous.iter().zip(current) {
        if before.status == after.status {
            continue;
        }
        let headline = after.content.lines().next().unwrap_or_default();
        println!(
            "{} {} {} {}",
            format!("[{elapsed_ms:>6}ms]").muted(),
            after.id.to_string().code(),
            style::colors::status_label(after.status),
            headline
        );
    }
}

pub fn run(project: &Path, seed: Option<u32>, prompts: &[String], long_running: bool) -> Result<()> {
    let config = super::load_config(project)?;
    let poll = Duration::from_millis(config.console.poll_interval_ms);

    let mut sim = Simulator::with_clock(
        super::simulator_options(&config.simulator, seed),
        SystemClock::new(),
    );

    println!(
        "{} {} (polling every {}ms)",
        "Live session".header(),
        sim.session_id().code(),
        config.console.poll_interval_ms
    );

    for prompt in prompts {
        let id = sim.send_user(prompt.as_str())?;
        println!("  {} {}", "sent".info(), id.to_string().code());
    }
    if long_running {
        let id = sim.simulate_long_running();
        println!("  {} {}", "started".info(), id.to_string().code());
    }

    let mut snapshot = sim.messages();
    while sim.pending() > 0 {
        thread::sleep(poll);
        sim.pump();

        let current = sim.messages();
        report_changes(&snapshot, &current, sim.now_ms());
        snapshot = current;
    }

    style::print_spacer();
    println!("{}", style::transcript_table(&snapshot));
    style::print_labeled("Status", &style::colors::session_status_label(sim.status()));
    Ok(())
}
