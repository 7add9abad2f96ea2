//! Module health state machine.
//!
//! A pure, total reducer over three coarse health states. Like the rest of
//! the functional core it never performs IO and never fails:
//! `reduce(state, event) -> state`.
//!
//! | state \ event | `Degrade`  | `Recover` | `CriticalFault` |
//! |---------------|------------|-----------|-----------------|
//! | `Ok`          | `Degraded` | `Ok`      | `Error`         |
//! | `Degraded`    | `Degraded` | `Ok`      | `Error`         |
//! | `Error`       | `Error`    | `Ok`      | `Error`         |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse health of a monitored module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModuleStatus {
    #[default]
    Ok,
    Degraded,
    Error,
}

impl ModuleStatus {
    /// True when only an explicit recover can leave this state.
    pub fn recovery_restricted(self) -> bool {
        self == ModuleStatus::Error
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleStatus::Ok => "OK",
            ModuleStatus::Degraded => "DEGRADED",
            ModuleStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State held by a module health widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleState {
    pub status: ModuleStatus,
}

impl ModuleState {
    pub fn new(status: ModuleStatus) -> Self {
        Self { status }
    }
}

/// Events accepted by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineEvent {
    Degrade,
    Recover,
    CriticalFault,
}

impl MachineEvent {
    pub const ALL: [MachineEvent; 3] = [
        MachineEvent::Degrade,
        MachineEvent::Recover,
        MachineEvent::CriticalFault,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MachineEvent::Degrade => "DEGRADE",
            MachineEvent::Recover => "RECOVER",
            MachineEvent::CriticalFault => "CRITICAL_FAULT",
        }
    }
}

impl fmt::Display for MachineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event name that does not match any [`MachineEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown machine event: {0}")]
pub struct MachineEventParseError(pub String);

impl FromStr for MachineEvent {
    type Err = MachineEventParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "DEGRADE" => Ok(MachineEvent::Degrade),
            "RECOVER" => Ok(MachineEvent::Recover),
            "CRITICAL_FAULT" => Ok(MachineEvent::CriticalFault),
            _ => Err(MachineEventParseError(s.to_string())),
        }
    }
}

/// Applies an event to a module state.
pub fn reduce(state: ModuleState, event: MachineEvent) -> ModuleState {
    match event {
        // Degrade never downgrades an existing critical fault.
        MachineEvent::Degrade if state.status == ModuleStatus::Error => state,
        MachineEvent::Degrade => ModuleState::new(ModuleStatus::Degraded),
        MachineEvent::Recover => ModuleState::new(ModuleStatus::Ok),
        MachineEvent::CriticalFault => ModuleState::new(ModuleStatus::Error),
    }
}

// ============================================================================
// Module Board
// ============================================================================

/// Modules tracked by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleId {
    ExecutionKernel,
    ComplianceEngine,
    ForensicsService,
}

impl ModuleId {
    pub const ALL: [ModuleId; 3] = [
        ModuleId::ExecutionKernel,
        ModuleId::ComplianceEngine,
        ModuleId::ForensicsService,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleId::ExecutionKernel => "EXECUTION_KERNEL",
            ModuleId::ComplianceEngine => "COMPLIANCE_ENGINE",
            ModuleId::ForensicsService => "FORENSICS_SERVICE",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One health state per module, each driven by [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBoard {
    states: BTreeMap<ModuleId, ModuleState>,
}

impl ModuleBoard {
    /// Creates a board with every module `Ok`.
    pub fn new() -> Self {
        Self {
            states: ModuleId::ALL
                .into_iter()
                .map(|id| (id, ModuleState::default()))
                .collect(),
        }
    }

    /// Applies an event to one module and returns its new state.
    pub fn dispatch(&mut self, id: ModuleId, event: MachineEvent) -> ModuleState {
        let entry = self.states.entry(id).or_default();
        let previous = *entry;
        *entry = reduce(previous, event);

        if previous != *entry {
            tracing::debug!(module = %id, from = %previous.status, to = %entry.status, %event, "module transition");
        }
        *entry
    }

    pub fn state(&self, id: ModuleId) -> ModuleState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// The most severe status across all modules.
    pub fn worst(&self) -> ModuleStatus {
        self.states
            .values()
            .map(|state| state.status)
            .max()
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, ModuleState)> + '_ {
        self.states.iter().map(|(id, state)| (*id, *state))
    }
}

impl Default for ModuleBoard {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ModuleStatus::Ok, MachineEvent::Degrade => ModuleStatus::Degraded; "ok degrade")]
    #[test_case(ModuleStatus::Degraded, MachineEvent::Degrade => ModuleStatus::Degraded; "degraded degrade")]
    #[test_case(ModuleStatus::Error, MachineEvent::Degrade => ModuleStatus::Error; "error degrade")]
    #[test_case(ModuleStatus::Ok, MachineEvent::Recover => ModuleStatus::Ok; "ok recover")]
    #[test_case(ModuleStatus::Degraded, MachineEvent::Recover => ModuleStatus::Ok; "degraded recover")]
    #[test_case(ModuleStatus::Error, MachineEvent::Recover => ModuleStatus::Ok; "error recover")]
    #[test_case(ModuleStatus::Ok, MachineEvent::CriticalFault => ModuleStatus::Error; "ok fault")]
    #[test_case(ModuleStatus::Degraded, MachineEvent::CriticalFault => ModuleStatus::Error; "degraded fault")]
    #[test_case(ModuleStatus::Error, MachineEvent::CriticalFault => ModuleStatus::Error; "error fault")]
    fn transition_table(from: ModuleStatus, event: MachineEvent) -> ModuleStatus {
        reduce(ModuleState::new(from), event).status
    }

    #[test]
    fn initial_state_is_ok() {
        assert_eq!(ModuleState::default().status, ModuleStatus::Ok);
    }

    #[test_case("DEGRADE" => Some(MachineEvent::Degrade); "upper")]
    #[test_case("recover" => Some(MachineEvent::Recover); "lower")]
    #[test_case("critical-fault" => Some(MachineEvent::CriticalFault); "kebab")]
    #[test_case("CRITICAL_FAULT" => Some(MachineEvent::CriticalFault); "screaming")]
    #[test_case("REBOOT" => None; "unknown")]
    fn parse_event(name: &str) -> Option<MachineEvent> {
        name.parse().ok()
    }

    #[test]
    fn display_round_trips_through_parse() {
        for event in MachineEvent::ALL {
            assert_eq!(event.to_string().parse::<MachineEvent>(), Ok(event));
        }
    }

    #[test]
    fn only_error_restricts_recovery() {
        assert!(!ModuleStatus::Ok.recovery_restricted());
        assert!(!ModuleStatus::Degraded.recovery_restricted());
        assert!(ModuleStatus::Error.recovery_restricted());
    }

    #[test]
    fn board_tracks_modules_independently() {
        let mut board = ModuleBoard::new();
        assert_eq!(board.worst(), ModuleStatus::Ok);

        board.dispatch(ModuleId::ComplianceEngine, MachineEvent::Degrade);
        assert_eq!(board.worst(), ModuleStatus::Degraded);
        assert_eq!(board.state(ModuleId::ExecutionKernel).status, ModuleStatus::Ok);

        board.dispatch(ModuleId::ForensicsService, MachineEvent::CriticalFault);
        assert_eq!(board.worst(), ModuleStatus::Error);

        // Degrade does not mask the fault.
        board.dispatch(ModuleId::ForensicsService, MachineEvent::Degrade);
        assert_eq!(board.state(ModuleId::ForensicsService).status, ModuleStatus::Error);

        board.dispatch(ModuleId::ForensicsService, MachineEvent::Recover);
        assert_eq!(board.worst(), ModuleStatus::Degraded);
        assert_eq!(board.iter().count(), 3);
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&ModuleState::new(ModuleStatus::Degraded)).unwrap();
        assert_eq!(json, r#"{"status":"DEGRADED"}"#);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_status() -> impl Strategy<Value = ModuleStatus> {
            prop_oneof![Just(ModuleStatus::Ok), Just(ModuleStatus::Degraded), Just(ModuleStatus::Error)]
        }

        fn any_event() -> impl Strategy<Value = MachineEvent> {
            prop_oneof![
                Just(MachineEvent::Degrade),
                Just(MachineEvent::Recover),
                Just(MachineEvent::CriticalFault),
            ]
        }

        proptest! {
            #[test]
            fn last_recover_or_fault_decides(start in any_status(), events in prop::collection::vec(any_event(), 0..32)) {
                let end = events
                    .iter()
                    .fold(ModuleState::new(start), |state, event| reduce(state, *event));

                // Recover and fault are absolute, so the final state never
                // contradicts the last of them.
                match events.iter().rev().find(|e| **e != MachineEvent::Degrade) {
                    Some(MachineEvent::Recover) => {
                        let degraded_after = events.iter().rev().take_while(|e| **e != MachineEvent::Recover).count() > 0;
                        prop_assert_eq!(end.status, if degraded_after { ModuleStatus::Degraded } else { ModuleStatus::Ok });
                    }
                    Some(MachineEvent::CriticalFault) => prop_assert_eq!(end.status, ModuleStatus::Error),
                    _ => {}
                }
            }
        }
    }
}
