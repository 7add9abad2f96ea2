//! Command palette entries for driving a session.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Commands reachable from the palette, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteCommand {
    Clear,
    InjectSystem,
    Chaos,
}

/// Text pushed as a system message by [`PaletteCommand::InjectSystem`].
pub const INJECTED_SYSTEM_TEXT: &str = "Injected system message via palette";

impl PaletteCommand {
    pub const ALL: [PaletteCommand; 3] = [
        PaletteCommand::Clear,
        PaletteCommand::InjectSystem,
        PaletteCommand::Chaos,
    ];

    /// Stable identifier used by hosts to dispatch the command.
    pub fn id(self) -> &'static str {
        match self {
            PaletteCommand::Clear => "clear",
            PaletteCommand::InjectSystem => "inject",
            PaletteCommand::Chaos => "chaos",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaletteCommand::Clear => "Clear session",
            PaletteCommand::InjectSystem => "Inject system message",
            PaletteCommand::Chaos => "Toggle chaos mode",
        }
    }

    /// Commands whose label contains `query`, ignoring case.
    pub fn search(query: &str) -> Vec<PaletteCommand> {
        let needle = query.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|cmd| cmd.label().to_lowercase().contains(&needle))
            .collect()
    }
}

impl fmt::Display for PaletteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown palette command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for PaletteCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
