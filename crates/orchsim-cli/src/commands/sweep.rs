//! Sweep command: measure outcome rates over many resolutions.

use std::path::Path;

use anyhow::Result;
use orchsim::{Role, Simulator, Status};
use orchsim::simulator::CHAOS_MULTIPLIER;

use crate::style::{self, colors::SemanticStyle};

/// Prompts resolved between clears, keeping the log small.
const BATCH_SIZE: usize = 500;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    success: usize,
    warning: usize,
    error: usize,
}

impl Tally {
    fn total(self) -> usize {
        self.success + self.warning + self.error
    }

    fn rate(self, count: usize) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            count as f64 / self.total() as f64
        }
    }
}

fn tally(sim: &mut Simulator, count: usize) -> Result<Tally> {
    let mut tally = Tally::default();
    let mut remaining = count;

    while remaining > 0 {
        let batch = remaining.min(BATCH_SIZE);
        for i in 0..batch {
            sim.send_user(format!("sweep {}", count - remaining + i))?;
        }
        sim.run_until_idle();

        for message in sim.messages() {
            if message.role != Role::Assistant {
                continue;
            }
            match message.status {
                Status::Success => tally.success += 1,
                Status::Warning => tally.warning += 1,
                Status::Error => tally.error += 1,
                Status::Idle | Status::Executing => {}
            }
        }

        sim.clear();
        remaining -= batch;
    }

    Ok(tally)
}

pub fn run(project: &Path, seed: Option<u32>, count: usize, chaos: bool) -> Result<()> {
    let config = super::load_config(project)?;
    let options = super::simulator_options(&config.simulator, seed).without_decision_log();
    let mut sim = Simulator::new(options);
    if chaos {
        sim.toggle_chaos_mode();
    }

    println!(
        "Resolving {} prompts (seed: {}{})...",
        count.to_string().header(),
        sim.seed().to_string().code(),
        if chaos { ", chaos" } else { "" }
    );

    let tally = tally(&mut sim, count)?;

    let multiplier = if chaos { CHAOS_MULTIPLIER } else { 1.0 };
    let expected_error = config.simulator.error_pct * multiplier;
    let expected_warning = config.simulator.warning_pct * multiplier;
    let expected_success = (1.0 - expected_error - expected_warning).max(0.0);

    let rows = [
        ("success", tally.success, expected_success),
        ("warning", tally.warning, expected_warning),
        ("error", tally.error, expected_error),
    ]
    .into_iter()
    .map(|(name, observed, expected)| {
        vec![
            name.to_string(),
            observed.to_string(),
            format!("{:.4}", tally.rate(observed)),
            format!("{expected:.4}"),
        ]
    })
    .collect::<Vec<_>>();

    println!(
        "{}",
        style::rows_table(&["Outcome", "Count", "Observed", "Expected"], &rows)
    );
    style::print_labeled("Resolved", &tally.total().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchsim::SimulatorOptions;

    #[test]
    fn tally_counts_every_prompt_across_batches() {
        let mut sim = Simulator::new(
            SimulatorOptions::default()
                .with_seed(3)
                .without_decision_log(),
        );
        let tally = tally(&mut sim, 1_234).unwrap();

        assert_eq!(tally.total(), 1_234);
        assert_eq!(sim.messages().len(), 1);
        assert!(sim.decisions().is_empty());
    }

    #[test]
    fn empty_tally_has_zero_rate() {
        assert!(Tally::default().rate(0).abs() < f64::EPSILON);
    }
}
