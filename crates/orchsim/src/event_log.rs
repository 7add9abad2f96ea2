//! Decision log for replay and debugging.
//!
//! Records every generator-driven choice a simulator makes, in order, so two
//! runs from the same seed can be compared decision by decision rather than
//! only by their final snapshots.

use serde::{Deserialize, Serialize};

use crate::{MessageId, Outcome};

/// A logged decision together with its position in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedDecision {
    /// Sequential number, starting at zero.
    pub seq: u64,

    /// Simulator time when the decision was made.
    pub at_ms: u64,

    pub decision: Decision,
}

/// Decisions worth recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// A resolution was drawn and scheduled.
    ResolutionScheduled {
        message_id: MessageId,
        delay_ms: u64,
        sample: f64,
        due_at_ms: u64,
    },

    /// A resolution fired and updated its message.
    Resolved {
        message_id: MessageId,
        outcome: Outcome,
        chaos: bool,
    },

    /// A resolution fired after its message was cleared.
    ResolutionDropped { message_id: MessageId },

    /// A long-running task was scheduled.
    LongRunningScheduled {
        message_id: MessageId,
        due_at_ms: u64,
    },

    /// Chaos mode flipped.
    ChaosToggled { enabled: bool },

    /// The log was cleared.
    Cleared { cancelled_timers: usize },
}

/// Append-only list of decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionLog {
    entries: Vec<LoggedDecision>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, at_ms: u64, decision: Decision) {
        let seq = self.entries.len() as u64;
        self.entries.push(LoggedDecision {
            seq,
            at_ms,
            decision,
        });
    }

    pub fn entries(&self) -> &[LoggedDecision] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first position where two logs disagree, if any.
    pub fn first_divergence(&self, other: &DecisionLog) -> Option<usize> {
        let common = self.entries.len().min(other.entries.len());
        (0..common)
            .find(|&i| self.entries[i] != other.entries[i])
            .or_else(|| (self.entries.len() != other.entries.len()).then_some(common))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(seq: u64) -> MessageId {
        MessageId::new("a", 0, seq)
    }

    #[test]
    fn sequence_numbers_follow_insertion() {
        let mut log = DecisionLog::new();
        log.record(0, Decision::ChaosToggled { enabled: true });
        log.record(10, Decision::Cleared { cancelled_timers: 0 });

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].seq, 0);
        assert_eq!(log.entries()[1].seq, 1);
        assert_eq!(log.entries()[1].at_ms, 10);
    }

    #[test]
    fn identical_logs_do_not_diverge() {
        let mut a = DecisionLog::new();
        let mut b = DecisionLog::new();
        for log in [&mut a, &mut b] {
            log.record(
                0,
                Decision::ResolutionScheduled {
                    message_id: id(1),
                    delay_ms: 900,
                    sample: 0.5,
                    due_at_ms: 900,
                },
            );
        }
        assert_eq!(a.first_divergence(&b), None);
    }

    #[test]
    fn divergence_reports_first_mismatch_or_length() {
        let mut a = DecisionLog::new();
        let mut b = DecisionLog::new();
        a.record(0, Decision::ChaosToggled { enabled: true });
        b.record(0, Decision::ChaosToggled { enabled: false });
        assert_eq!(a.first_divergence(&b), Some(0));

        let mut c = DecisionLog::new();
        c.record(0, Decision::ChaosToggled { enabled: true });
        c.record(5, Decision::ResolutionDropped { message_id: id(2) });
        assert_eq!(a.first_divergence(&c), Some(1));
        assert_eq!(c.first_divergence(&a), Some(1));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let mut log = DecisionLog::new();
        log.record(
            42,
            Decision::Resolved {
                message_id: id(3),
                outcome: Outcome::Warning,
                chaos: false,
            },
        );

        let json = serde_json::to_value(log.entries()).unwrap();
        assert_eq!(json[0]["decision"]["kind"], "resolved");
        assert_eq!(json[0]["decision"]["outcome"], "warning");
        assert_eq!(json[0]["decision"]["message_id"], "a-0-3");
    }
}
