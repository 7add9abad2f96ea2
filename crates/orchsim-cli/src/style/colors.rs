//! Semantic color palette for terminal output.

use orchsim::{ModuleStatus, SessionStatus, Status};
use owo_colors::{OwoColorize, Style};

pub fn success_style() -> Style {
    Style::new().green().bold()
}

pub fn error_style() -> Style {
    Style::new().red().bold()
}

pub fn warning_style() -> Style {
    Style::new().yellow()
}

/// In-flight work (cyan).
pub fn info_style() -> Style {
    Style::new().cyan()
}

pub fn muted_style() -> Style {
    Style::new().dimmed()
}

pub fn header_style() -> Style {
    Style::new().bold()
}

/// Seeds, ids, and commands (blue).
pub fn code_style() -> Style {
    Style::new().blue()
}

/// Trait extension to apply semantic styles.
pub trait SemanticStyle: Sized {
    fn success(&self) -> String;
    fn error(&self) -> String;
    fn warning(&self) -> String;
    fn info(&self) -> String;
    fn muted(&self) -> String;
    fn header(&self) -> String;
    fn code(&self) -> String;
}

impl<T: std::fmt::Display> SemanticStyle for T {
    fn success(&self) -> String {
        paint(self, success_style())
    }

    fn error(&self) -> String {
        paint(self, error_style())
    }

    fn warning(&self) -> String {
        paint(self, warning_style())
    }

    fn info(&self) -> String {
        paint(self, info_style())
    }

    fn muted(&self) -> String {
        paint(self, muted_style())
    }

    fn header(&self) -> String {
        paint(self, header_style())
    }

    fn code(&self) -> String {
        paint(self, code_style())
    }
}

fn paint<T: std::fmt::Display>(value: &T, style: Style) -> String {
    if super::no_color() {
        value.to_string()
    } else {
        value.style(style).to_string()
    }
}

/// Styles a message status by severity.
pub fn status_label(status: Status) -> String {
    match status {
        Status::Success => status.success(),
        Status::Warning => status.warning(),
        Status::Error => status.error(),
        Status::Executing => status.info(),
        Status::Idle => status.muted(),
    }
}

pub fn session_status_label(status: SessionStatus) -> String {
    match status {
        SessionStatus::Online => status.success(),
        SessionStatus::Executing => status.info(),
        SessionStatus::Degraded => status.error(),
    }
}

pub fn module_status_label(status: ModuleStatus) -> String {
    match status {
        ModuleStatus::Ok => status.success(),
        ModuleStatus::Degraded => status.warning(),
        ModuleStatus::Error => status.error(),
    }
}
