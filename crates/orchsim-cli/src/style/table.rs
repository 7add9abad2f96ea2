//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use orchsim::{Decision, LoggedDecision, Message, Status};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cells(columns: &[&str]) -> Vec<Cell> {
    columns
        .iter()
        .map(|col| {
            if super::no_color() {
                Cell::new(col)
            } else {
                Cell::new(col).add_attribute(Attribute::Bold).fg(Color::Cyan)
            }
        })
        .collect()
}

fn status_cell(status: Status) -> Cell {
    let cell = Cell::new(status);
    if super::no_color() {
        return cell;
    }
    match status {
        Status::Success => cell.fg(Color::Green),
        Status::Warning => cell.fg(Color::Yellow),
        Status::Error => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Status::Executing => cell.fg(Color::Cyan),
        Status::Idle => cell.fg(Color::DarkGrey),
    }
}

/// Creates a table with one row per message, in log order.
pub fn transcript_table(messages: &[Message]) -> Table {
    let mut table = base_table();
    table.set_header(header_cells(&["#", "Role", "Status", "Started", "Finished", "Content"]));

    for (index, message) in messages.iter().enumerate() {
        let finished = message
            .finished_at
            .map_or_else(|| "-".to_string(), |at| format!("{at}ms"));
        table.add_row(vec![
            Cell::new(index),
            Cell::new(message.role),
            status_cell(message.status),
            Cell::new(format!("{}ms", message.started_at)),
            Cell::new(finished),
            Cell::new(&message.content),
        ]);
    }

    table
}

/// Creates a table of logged decisions.
pub fn decision_table(entries: &[LoggedDecision]) -> Table {
    let mut table = base_table();
    table.set_header(header_cells(&["Seq", "At", "Decision", "Details"]));

    for entry in entries {
        let (kind, details) = describe(&entry.decision);
        table.add_row(vec![
            Cell::new(entry.seq),
            Cell::new(format!("{}ms", entry.at_ms)),
            Cell::new(kind),
            Cell::new(details),
        ]);
    }

    table
}

fn describe(decision: &Decision) -> (&'static str, String) {
    match decision {
        Decision::ResolutionScheduled {
            message_id,
            delay_ms,
            sample,
            due_at_ms,
        } => (
            "scheduled",
            format!("{message_id} delay={delay_ms}ms sample={sample:.6} due={due_at_ms}ms"),
        ),
        Decision::Resolved {
            message_id,
            outcome,
            chaos,
        } => ("resolved", format!("{message_id} {outcome} chaos={chaos}")),
        Decision::ResolutionDropped { message_id } => ("dropped", message_id.to_string()),
        Decision::LongRunningScheduled {
            message_id,
            due_at_ms,
        } => ("long-running", format!("{message_id} due={due_at_ms}ms")),
        Decision::ChaosToggled { enabled } => ("chaos", format!("enabled={enabled}")),
        Decision::Cleared { cancelled_timers } => {
            ("cleared", format!("cancelled_timers={cancelled_timers}"))
        }
    }
}

/// Creates a table with arbitrary string rows under the given header.
pub fn rows_table(columns: &[&str], rows: &[Vec<String>]) -> Table {
    let mut table = base_table();
    table.set_header(header_cells(columns));
    for row in rows {
        table.add_row(row);
    }
    table
}

/// Creates a key-value info table (two columns: key and value).
pub fn info_table(entries: &[(&str, String)]) -> Table {
    let mut table = base_table();

    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }

    table
}
