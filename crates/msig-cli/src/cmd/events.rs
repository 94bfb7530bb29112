use crate::output::{print_json, print_table};
use anyhow::Context;
use msig_core::{event::Event, event::EventKind, io, paths};
use std::path::Path;

pub fn run(root: &Path, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let mut events: Vec<Event> =
        io::read_json_lines(&paths::events_path(root)).context("failed to read events")?;
    if let Some(n) = limit {
        let skip = events.len().saturating_sub(n);
        events.drain(..skip);
    }

    if json {
        print_json(&events)?;
        return Ok(());
    }

    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }

    let rows = events
        .iter()
        .map(|e| {
            vec![
                e.at.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.kind.name().to_string(),
                describe(&e.kind),
            ]
        })
        .collect();
    print_table(&["AT", "EVENT", "DETAIL"], rows);
    Ok(())
}

fn describe(kind: &EventKind) -> String {
    match kind {
        EventKind::ActionSubmitted {
            proposer,
            index,
            target,
            amount,
            payload,
        } => format!("[{index}] by {proposer} -> {target} amount={amount} payload={payload}"),
        EventKind::ActionConfirmed { caller, index }
        | EventKind::ConfirmationRevoked { caller, index }
        | EventKind::ActionExecuted { caller, index } => format!("[{index}] by {caller}"),
        EventKind::ExecutionFailed {
            caller,
            index,
            reason,
        } => format!("[{index}] by {caller}: {reason}"),
        EventKind::OwnerAdded { owner } | EventKind::OwnerRemoved { owner } => owner.to_string(),
        EventKind::ThresholdChanged { threshold } => threshold.to_string(),
    }
}
