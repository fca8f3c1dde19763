//! Recorded backend input: snapshot files and event logs.
//!
//! A snapshot is a JSON array of `TransferSnapshot`. An event log is JSON
//! lines, one `TransferEvent` per line; blank lines and lines starting with
//! `#` are skipped.

use std::path::Path;

use crate::error::TrayError;
use crate::transfer::{TransferEvent, TransferSnapshot};

fn read(path: &Path) -> Result<String, TrayError> {
    if !path.exists() {
        return Err(TrayError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Load a snapshot of active transfers.
pub fn load_snapshot(path: &Path) -> Result<Vec<TransferSnapshot>, TrayError> {
    let contents = read(path)?;
    let transfers: Vec<TransferSnapshot> =
        serde_json::from_str(&contents).map_err(|e| TrayError::InvalidSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    tracing::debug!(path = %path.display(), transfers = transfers.len(), "snapshot loaded");
    Ok(transfers)
}

/// Load an event log.
pub fn load_events(path: &Path) -> Result<Vec<TransferEvent>, TrayError> {
    let contents = read(path)?;
    let events = parse_events(&contents).map_err(|(line, reason)| TrayError::InvalidEvent {
        path: path.to_path_buf(),
        line,
        reason,
    })?;
    tracing::debug!(path = %path.display(), events = events.len(), "event log loaded");
    Ok(events)
}

/// Parse JSON lines; errors carry the 1-based line number.
fn parse_events(contents: &str) -> Result<Vec<TransferEvent>, (usize, String)> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line).map_err(|e| (number + 1, e.to_string()))
        })
        .collect()
}
