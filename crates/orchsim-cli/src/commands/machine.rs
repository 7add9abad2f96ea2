//! Machine command: fold named events through the health reducer.

use orchsim::{MachineEvent, ModuleState, reduce};

use crate::style::{self, colors::module_status_label};

/// Applies each event in turn from the initial state. Unknown names are
/// reported and leave the state as it was.
pub fn fold(events: &[String]) -> (ModuleState, Vec<Vec<String>>) {
    let mut state = ModuleState::default();
    let mut rows = Vec::with_capacity(events.len());

    for (step, name) in events.iter().enumerate() {
        let before = state;
        let event_label = match name.parse::<MachineEvent>() {
            Ok(event) => {
                state = reduce(state, event);
                event.to_string()
            }
            Err(err) => {
                tracing::warn!(event = %name, "ignoring unknown machine event");
                style::print_warn(&err.to_string());
                format!("{name} (ignored)")
            }
        };
        rows.push(vec![
            (step + 1).to_string(),
            event_label,
            module_status_label(before.status),
            module_status_label(state.status),
        ]);
    }

    (state, rows)
}

pub fn run(events: &[String]) {
    let (state, rows) = fold(events);
    println!(
        "{}",
        style::rows_table(&["Step", "Event", "From", "To"], &rows)
    );
    style::print_labeled("Final", &module_status_label(state.status));
    if state.status.recovery_restricted() {
        style::print_hint("only RECOVER leaves ERROR");
    }
}
