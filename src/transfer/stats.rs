//! Aggregate transfer statistics for the tray tooltip.
//!
//! `TransferTotals` follows the same callbacks as the list views and keeps
//! per-direction byte counts, speeds, and completion counters, producing a
//! one-line summary such as:
//!
//! ```text
//! Downloading 2 files: 1.2 MB of 3.4 MB @ 512.0 KB/s | Uploading 1 file: 0 B of 10 B @ 0 B/s
//! ```

use std::collections::HashMap;

use bytesize::ByteSize;

use super::event::{Direction, TransferListener, TransferSnapshot};
use super::record::Tag;

/// Totals for one transfer direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionTotals {
    pub active: u64,
    pub total_bytes: u64,
    pub transferred_bytes: u64,
    pub speed: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Running totals across every observed transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferTotals {
    active: HashMap<Tag, TransferSnapshot>,
    completed: HashMap<Direction, u64>,
    failed: HashMap<Direction, u64>,
}

impl TransferTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a snapshot of in-flight transfers.
    pub fn load_from(&mut self, transfers: &[TransferSnapshot]) {
        for transfer in transfers {
            self.on_transfer_start(transfer);
        }
    }

    /// Totals for one direction.
    pub fn direction(&self, direction: Direction) -> DirectionTotals {
        let mut totals = self
            .active
            .values()
            .filter(|t| t.direction == direction)
            .fold(DirectionTotals::default(), |mut acc, t| {
                acc.active += 1;
                acc.total_bytes = acc.total_bytes.saturating_add(t.total_bytes);
                acc.transferred_bytes = acc.transferred_bytes.saturating_add(t.transferred_bytes);
                acc.speed = acc.speed.saturating_add(t.speed);
                acc
            });
        totals.completed = self.completed.get(&direction).copied().unwrap_or(0);
        totals.failed = self.failed.get(&direction).copied().unwrap_or(0);
        totals
    }

    /// Number of transfers currently in flight.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Human readable tooltip line.
    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = [
            (Direction::Download, "Downloading"),
            (Direction::Upload, "Uploading"),
        ]
        .iter()
        .filter_map(|&(direction, verb)| {
            let totals = self.direction(direction);
            if totals.active == 0 {
                return None;
            }
            Some(format!(
                "{} {} {}: {} of {} @ {}/s",
                verb,
                totals.active,
                if totals.active == 1 { "file" } else { "files" },
                ByteSize(totals.transferred_bytes),
                ByteSize(totals.total_bytes),
                ByteSize(totals.speed),
            ))
        })
        .collect();

        if parts.is_empty() {
            "No transfers in progress".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

impl TransferListener for TransferTotals {
    fn on_transfer_start(&mut self, transfer: &TransferSnapshot) {
        self.active.entry(transfer.tag).or_insert_with(|| transfer.clone());
    }

    fn on_transfer_update(&mut self, transfer: &TransferSnapshot) {
        if let Some(known) = self.active.get_mut(&transfer.tag) {
            let transferred = known.transferred_bytes.max(transfer.transferred_bytes);
            *known = transfer.clone();
            known.transferred_bytes = transferred;
        }
    }

    fn on_transfer_temporary_error(&mut self, _transfer: &TransferSnapshot, _error: &str) {}

    fn on_transfer_finish(&mut self, transfer: &TransferSnapshot, error: Option<&str>) {
        self.active.remove(&transfer.tag);
        let counter = if error.is_some() {
            &mut self.failed
        } else {
            &mut self.completed
        };
        *counter.entry(transfer.direction).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::record::Priority;

    fn snap(tag: i32, direction: Direction, total: u64, done: u64, speed: u64) -> TransferSnapshot {
        TransferSnapshot {
            tag: Tag(tag),
            direction,
            file_name: format!("f{}", tag),
            total_bytes: total,
            transferred_bytes: done,
            speed,
            priority: Priority(tag as u64),
            is_sync: false,
        }
    }

    #[test]
    fn new_totals_start_at_zero() {
        let totals = TransferTotals::new();
        assert_eq!(totals.direction(Direction::Download), DirectionTotals::default());
        assert_eq!(totals.active_count(), 0);
        assert_eq!(totals.summary_line(), "No transfers in progress");
    }

    #[test]
    fn huge_sizes_saturate() {
        let mut totals = TransferTotals::new();
        totals.on_transfer_start(&snap(1, Direction::Download, u64::MAX, u64::MAX, u64::MAX));
        totals.on_transfer_start(&snap(2, Direction::Download, u64::MAX, 1, 1));

        let down = totals.direction(Direction::Download);
        assert_eq!(down.total_bytes, u64::MAX);
        assert_eq!(down.transferred_bytes, u64::MAX);
        assert_eq!(down.speed, u64::MAX);
        assert!(totals.summary_line().starts_with("Downloading 2 files"));
    }

    #[test]
    fn sums_per_direction() {
        let mut totals = TransferTotals::new();
        totals.on_transfer_start(&snap(1, Direction::Download, 100, 10, 5));
        totals.on_transfer_start(&snap(2, Direction::Download, 200, 20, 7));
        totals.on_transfer_start(&snap(3, Direction::Upload, 50, 0, 0));

        let down = totals.direction(Direction::Download);
        assert_eq!(down.active, 2);
        assert_eq!(down.total_bytes, 300);
        assert_eq!(down.transferred_bytes, 30);
        assert_eq!(down.speed, 12);
        assert_eq!(totals.direction(Direction::Upload).active, 1);
    }

    #[test]
    fn update_never_moves_progress_backwards() {
        let mut totals = TransferTotals::new();
        totals.on_transfer_start(&snap(1, Direction::Upload, 100, 50, 5));
        totals.on_transfer_update(&snap(1, Direction::Upload, 100, 30, 9));
        let up = totals.direction(Direction::Upload);
        assert_eq!(up.transferred_bytes, 50);
        assert_eq!(up.speed, 9);
    }

    #[test]
    fn finish_counts_completed_and_failed() {
        let mut totals = TransferTotals::new();
        let a = snap(1, Direction::Download, 100, 0, 0);
        let b = snap(2, Direction::Download, 100, 0, 0);
        totals.on_transfer_start(&a);
        totals.on_transfer_start(&b);
        totals.on_transfer_finish(&a, None);
        totals.on_transfer_finish(&b, Some("access denied"));

        let down = totals.direction(Direction::Download);
        assert_eq!(down.active, 0);
        assert_eq!(down.completed, 1);
        assert_eq!(down.failed, 1);
    }

    #[test]
    fn summary_line_lists_active_directions() {
        let mut totals = TransferTotals::new();
        totals.load_from(&[snap(1, Direction::Upload, 10, 0, 0)]);
        let line = totals.summary_line();
        assert!(line.starts_with("Uploading 1 file:"));
        assert!(!line.contains("Downloading"));
    }
}
