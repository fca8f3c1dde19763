//! Per-transfer display state.
//!
//! A `TransferRecord` is a plain data holder. It never notifies anyone on its
//! own: the owning `TransferIndex` decides which list changes a mutation
//! produces.

use std::fmt;

use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{Direction, TransferSnapshot};

/// Backend-assigned transfer identifier.
///
/// Unique among active transfers; the backend may hand the same tag out again
/// once the transfer it named is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub i32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display ordering key. Lower values are listed first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(pub u64);

/// Kind of transfer as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Download,
    Upload,
    SyncDownload,
    SyncUpload,
}

impl Category {
    /// Combine a transfer direction with the backend's sync flag.
    pub fn new(direction: Direction, is_sync: bool) -> Self {
        match (direction, is_sync) {
            (Direction::Download, false) => Category::Download,
            (Direction::Upload, false) => Category::Upload,
            (Direction::Download, true) => Category::SyncDownload,
            (Direction::Upload, true) => Category::SyncUpload,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Category::Download | Category::SyncDownload => Direction::Download,
            Category::Upload | Category::SyncUpload => Direction::Upload,
        }
    }

    pub fn is_sync(self) -> bool {
        matches!(self, Category::SyncDownload | Category::SyncUpload)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Download => write!(f, "download"),
            Category::Upload => write!(f, "upload"),
            Category::SyncDownload => write!(f, "sync download"),
            Category::SyncUpload => write!(f, "sync upload"),
        }
    }
}

/// Whether a record is still in flight or already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferState {
    Active,
    Finished,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferState::Active => write!(f, "active"),
            TransferState::Finished => write!(f, "finished"),
        }
    }
}

/// Display state of a single transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRecord {
    tag: Tag,
    file_name: String,
    category: Category,
    total_bytes: u64,
    transferred_bytes: u64,
    speed: u64,
    priority: Priority,
    state: TransferState,
    finished_at: Option<DateTime<Utc>>,
}

impl TransferRecord {
    /// Create an empty active record for a download.
    pub fn new(tag: Tag, priority: Priority) -> Self {
        Self {
            tag,
            file_name: String::new(),
            category: Category::Download,
            total_bytes: 0,
            transferred_bytes: 0,
            speed: 0,
            priority,
            state: TransferState::Active,
            finished_at: None,
        }
    }

    /// Build a record carrying everything the backend reported about a transfer.
    pub fn from_snapshot(transfer: &TransferSnapshot) -> Self {
        let mut record = Self::new(transfer.tag, transfer.priority);
        record.set_file_name(transfer.file_name.clone());
        record.set_category(Category::new(transfer.direction, transfer.is_sync));
        record.set_total_bytes(transfer.total_bytes);
        record.set_speed(transfer.speed);
        record.set_transferred_bytes(transfer.transferred_bytes);
        record
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    pub fn speed(&self) -> u64 {
        self.speed
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == TransferState::Finished
    }

    /// When the record first entered the finished state.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn set_file_name(&mut self, file_name: String) {
        self.file_name = file_name;
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn set_total_bytes(&mut self, total_bytes: u64) {
        self.total_bytes = total_bytes;
        if total_bytes > 0 && self.transferred_bytes > total_bytes {
            self.transferred_bytes = total_bytes;
        }
    }

    /// Record progress.
    ///
    /// While active the counter only moves forward; a smaller value is a late
    /// callback and is dropped. Once the total is known the counter is capped
    /// at it.
    pub fn set_transferred_bytes(&mut self, bytes: u64) {
        if self.state == TransferState::Active && bytes < self.transferred_bytes {
            tracing::trace!(
                tag = %self.tag,
                current = self.transferred_bytes,
                reported = bytes,
                "ignoring stale progress"
            );
            return;
        }
        self.transferred_bytes = if self.total_bytes > 0 {
            bytes.min(self.total_bytes)
        } else {
            bytes
        };
    }

    pub fn set_speed(&mut self, speed: u64) {
        self.speed = speed;
    }

    /// Priority changes must go through `TransferIndex` so the ordered
    /// sequence stays sorted.
    pub(crate) fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Mark the transfer completed. The first call stamps `finished_at`.
    pub fn finish(&mut self) {
        self.state = TransferState::Finished;
        self.speed = 0;
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Counterpart of `finish` applied on every progress update of an
    /// in-flight transfer.
    pub fn mark_active(&mut self) {
        self.state = TransferState::Active;
    }

    /// Replace every display field with the ones from `other`, keeping this
    /// record's tag and priority. Progress of a record that stays active
    /// does not move backwards.
    pub(crate) fn overwrite_from(&mut self, other: TransferRecord) {
        let transferred = if self.state == TransferState::Active
            && other.state == TransferState::Active
        {
            self.transferred_bytes.max(other.transferred_bytes)
        } else {
            other.transferred_bytes
        };
        self.file_name = other.file_name;
        self.category = other.category;
        self.total_bytes = other.total_bytes;
        self.transferred_bytes = if other.total_bytes > 0 {
            transferred.min(other.total_bytes)
        } else {
            transferred
        };
        self.speed = other.speed;
        self.state = other.state;
        self.finished_at = other.finished_at.or(self.finished_at);
    }

    /// Completed fraction in `[0, 1]`. Unknown totals report 0 while active.
    pub fn progress(&self) -> f64 {
        if self.is_finished() {
            return 1.0;
        }
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.transferred_bytes as f64 / self.total_bytes as f64
    }

    /// Estimated seconds left at the current speed.
    pub fn remaining_secs(&self) -> Option<u64> {
        if self.is_finished() || self.speed == 0 || self.total_bytes == 0 {
            return None;
        }
        let left = self.total_bytes.saturating_sub(self.transferred_bytes);
        Some(left.div_ceil(self.speed))
    }

    /// One-line human readable description.
    ///
    /// ```text
    /// #7 report.pdf [upload] 1.2 MB / 3.4 MB @ 512.0 KB/s
    /// #9 photo.jpg [sync download] 2.4 MB finished
    /// ```
    pub fn summary(&self) -> String {
        match self.state {
            TransferState::Finished => format!(
                "{} {} [{}] {} finished",
                self.tag,
                self.file_name,
                self.category,
                ByteSize(self.total_bytes.max(self.transferred_bytes)),
            ),
            TransferState::Active => format!(
                "{} {} [{}] {} / {} @ {}/s",
                self.tag,
                self.file_name,
                self.category,
                ByteSize(self.transferred_bytes),
                ByteSize(self.total_bytes),
                ByteSize(self.speed),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TransferSnapshot {
        TransferSnapshot {
            tag: Tag(4),
            direction: Direction::Upload,
            file_name: "report.pdf".to_string(),
            total_bytes: 1000,
            transferred_bytes: 250,
            speed: 50,
            priority: Priority(12),
            is_sync: true,
        }
    }

    #[test]
    fn from_snapshot_copies_fields() {
        let record = TransferRecord::from_snapshot(&snapshot());
        assert_eq!(record.tag(), Tag(4));
        assert_eq!(record.file_name(), "report.pdf");
        assert_eq!(record.category(), Category::SyncUpload);
        assert_eq!(record.total_bytes(), 1000);
        assert_eq!(record.transferred_bytes(), 250);
        assert_eq!(record.speed(), 50);
        assert_eq!(record.priority(), Priority(12));
        assert_eq!(record.state(), TransferState::Active);
        assert!(record.finished_at().is_none());
    }

    #[test]
    fn transferred_bytes_never_decrease_while_active() {
        let mut record = TransferRecord::from_snapshot(&snapshot());
        record.set_transferred_bytes(600);
        record.set_transferred_bytes(400);
        assert_eq!(record.transferred_bytes(), 600);
    }

    #[test]
    fn transferred_bytes_capped_at_known_total() {
        let mut record = TransferRecord::from_snapshot(&snapshot());
        record.set_transferred_bytes(5000);
        assert_eq!(record.transferred_bytes(), 1000);
    }

    #[test]
    fn unknown_total_does_not_cap() {
        let mut record = TransferRecord::new(Tag(1), Priority(1));
        record.set_transferred_bytes(5000);
        assert_eq!(record.transferred_bytes(), 5000);
        record.set_total_bytes(2000);
        assert_eq!(record.transferred_bytes(), 2000);
    }

    #[test]
    fn finish_stamps_once_and_clears_speed() {
        let mut record = TransferRecord::from_snapshot(&snapshot());
        record.finish();
        let first = record.finished_at();
        assert!(first.is_some());
        assert_eq!(record.speed(), 0);
        record.finish();
        assert_eq!(record.finished_at(), first);
        assert!(record.is_finished());
    }

    #[test]
    fn mark_active_reverts_state() {
        let mut record = TransferRecord::new(Tag(1), Priority(1));
        record.finish();
        record.mark_active();
        assert_eq!(record.state(), TransferState::Active);
    }

    #[test]
    fn overwrite_keeps_tag_and_priority() {
        let mut record = TransferRecord::from_snapshot(&snapshot());
        let mut other = TransferRecord::new(Tag(99), Priority(1));
        other.set_file_name("other.bin".into());
        other.set_total_bytes(10);
        record.overwrite_from(other);
        assert_eq!(record.tag(), Tag(4));
        assert_eq!(record.priority(), Priority(12));
        assert_eq!(record.file_name(), "other.bin");
        assert_eq!(record.total_bytes(), 10);
        assert_eq!(record.category(), Category::Download);
    }

    #[test]
    fn overwrite_of_active_record_keeps_progress() {
        let mut record = TransferRecord::from_snapshot(&snapshot());
        record.set_transferred_bytes(500);

        let mut stale = TransferRecord::new(Tag(4), Priority(12));
        stale.set_total_bytes(1000);
        stale.set_transferred_bytes(100);
        record.overwrite_from(stale);
        assert_eq!(record.transferred_bytes(), 500);

        let mut done = TransferRecord::new(Tag(4), Priority(12));
        done.set_total_bytes(1000);
        done.set_transferred_bytes(100);
        done.finish();
        record.overwrite_from(done);
        assert!(record.is_finished());
        assert_eq!(record.transferred_bytes(), 100);
    }

    #[test]
    fn progress_and_remaining_time() {
        let record = TransferRecord::from_snapshot(&snapshot());
        assert!((record.progress() - 0.25).abs() < f64::EPSILON);
        // 750 bytes left at 50 B/s
        assert_eq!(record.remaining_secs(), Some(15));

        let empty = TransferRecord::new(Tag(2), Priority(0));
        assert_eq!(empty.progress(), 0.0);
        assert_eq!(empty.remaining_secs(), None);
    }

    #[test]
    fn summary_mentions_name_and_category() {
        let mut record = TransferRecord::from_snapshot(&snapshot());
        let line = record.summary();
        assert!(line.starts_with("#4 report.pdf [sync upload]"));
        assert!(line.contains('@'));

        record.finish();
        assert!(record.summary().ends_with("finished"));
    }

    #[test]
    fn category_round_trips_direction_and_sync_flag() {
        for direction in [Direction::Download, Direction::Upload] {
            for is_sync in [false, true] {
                let category = Category::new(direction, is_sync);
                assert_eq!(category.direction(), direction);
                assert_eq!(category.is_sync(), is_sync);
            }
        }
    }
}
