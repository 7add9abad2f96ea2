//! Conversation log entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a log entry, stable for the entry's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Builds an id of the form `<prefix>-<started_at>-<seq>`.
    pub(crate) fn new(prefix: &str, started_at_ms: u64, seq: u64) -> Self {
        Self(format!("{prefix}-{started_at_ms}-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Executing,
    Success,
    Warning,
    Error,
}

impl Status {
    /// Returns true for `Success`, `Warning`, and `Error`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Warning | Status::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Executing => "executing",
            Status::Success => "success",
            Status::Warning => "warning",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub status: Status,
    pub started_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
}

impl Message {
    /// A message created already in a terminal state.
    pub(crate) fn terminal(
        id: MessageId,
        role: Role,
        status: Status,
        content: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        debug_assert!(status.is_terminal());
        Self {
            id,
            role,
            content: content.into(),
            status,
            started_at: now_ms,
            finished_at: Some(now_ms),
        }
    }

    /// An assistant message awaiting resolution.
    pub(crate) fn executing(id: MessageId, content: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            status: Status::Executing,
            started_at: now_ms,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Elapsed time between creation and resolution, if resolved.
    pub fn duration_ms(&self) -> Option<u64> {
        self.finished_at
            .map(|finished| finished.saturating_sub(self.started_at))
    }
}
