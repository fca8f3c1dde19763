//! Adapter from backend lifecycle callbacks to one filtered `TransferIndex`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::event::{BackendHandle, Direction, TransferListener, TransferSnapshot};
use super::index::{ListObserver, SubscriptionId, TransferIndex};
use super::record::{Tag, TransferRecord};

/// Which transfers a sink tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransferFilter {
    /// Every in-flight transfer.
    All,
    /// In-flight transfers going one way.
    Direction(Direction),
    /// Completed transfers, kept as history.
    Finished,
}

impl TransferFilter {
    /// Whether an in-flight transfer belongs in this view.
    pub fn accepts(self, transfer: &TransferSnapshot) -> bool {
        match self {
            TransferFilter::All => true,
            TransferFilter::Direction(direction) => transfer.direction == direction,
            TransferFilter::Finished => false,
        }
    }

    pub fn is_history(self) -> bool {
        self == TransferFilter::Finished
    }
}

impl fmt::Display for TransferFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFilter::All => write!(f, "all"),
            TransferFilter::Direction(direction) => write!(f, "{}", direction),
            TransferFilter::Finished => write!(f, "finished"),
        }
    }
}

impl FromStr for TransferFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TransferFilter::All),
            "download" | "downloads" => Ok(TransferFilter::Direction(Direction::Download)),
            "upload" | "uploads" => Ok(TransferFilter::Direction(Direction::Upload)),
            "finished" | "history" => Ok(TransferFilter::Finished),
            other => Err(format!(
                "unknown view '{}', expected one of: all, download, upload, finished",
                other
            )),
        }
    }
}

impl TryFrom<String> for TransferFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransferFilter> for String {
    fn from(filter: TransferFilter) -> Self {
        filter.to_string()
    }
}

/// One list view fed by backend callbacks.
///
/// In-flight views insert on start, refresh on update and drop on finish.
/// The finished view does the opposite: it ignores starts and adds a record
/// whenever a transfer completes, capped at `history_limit` entries.
pub struct TransferEventSink {
    filter: TransferFilter,
    index: TransferIndex,
    backend: BackendHandle,
    history_limit: usize,
}

impl fmt::Debug for TransferEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEventSink")
            .field("filter", &self.filter)
            .field("index", &self.index)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

impl TransferEventSink {
    pub fn new(filter: TransferFilter, backend: BackendHandle) -> Self {
        Self {
            filter,
            index: TransferIndex::new(),
            backend,
            history_limit: 0,
        }
    }

    /// Cap the finished view at `limit` entries (0 keeps everything).
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn filter(&self) -> TransferFilter {
        self.filter
    }

    pub fn index(&self) -> &TransferIndex {
        &self.index
    }

    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: ListObserver + Send + 'static,
    {
        self.index.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.index.unsubscribe(id)
    }

    /// Populate the view from the backend's current transfer list.
    ///
    /// Returns how many records were added.
    pub fn load_snapshot(&mut self) -> usize {
        let transfers = self.backend.active_transfers();
        self.load_from(&transfers)
    }

    /// Apply start handling to each transfer, in the order given.
    pub fn load_from(&mut self, transfers: &[TransferSnapshot]) -> usize {
        let before = self.index.count();
        for transfer in transfers {
            self.on_transfer_start(transfer);
        }
        let added = self.index.count() - before;
        tracing::debug!(view = %self.filter, added, "loaded transfer snapshot");
        added
    }

    /// Handle a completion. In-flight views hand back the removed record,
    /// marked finished.
    pub fn finish(&mut self, transfer: &TransferSnapshot) -> Option<TransferRecord> {
        if self.filter.is_history() {
            self.add_history(transfer);
            return None;
        }
        if !self.filter.accepts(transfer) {
            return None;
        }
        let mut record = self.index.remove(transfer.tag)?;
        record.finish();
        Some(record)
    }

    /// Empty the view, history included.
    pub fn clear_history(&mut self) {
        self.index.clear();
    }

    fn add_history(&mut self, transfer: &TransferSnapshot) {
        let mut record = TransferRecord::from_snapshot(transfer);
        record.finish();

        if self.index.contains(transfer.tag) {
            // Tags are recycled by the backend; the newest completion wins.
            let priority = record.priority();
            self.index.refresh(transfer.tag, |existing| {
                existing.overwrite_from(record);
                existing.set_priority(priority);
            });
        } else {
            self.index.insert(record);
        }

        if self.history_limit > 0 {
            let evicted = self.index.truncate_oldest(self.history_limit);
            if !evicted.is_empty() {
                tracing::debug!(evicted = evicted.len(), "history limit reached");
            }
        }
    }

    fn apply_progress(&mut self, transfer: &TransferSnapshot) {
        let history = self.filter.is_history();
        self.index.refresh(transfer.tag, |record| {
            record.set_speed(transfer.speed);
            record.set_transferred_bytes(transfer.transferred_bytes);
            if history {
                record.finish();
            } else {
                record.mark_active();
            }
            record.set_priority(transfer.priority);
        });
    }

    fn is_tracked(&self, tag: Tag) -> bool {
        self.index.contains(tag)
    }
}

impl TransferListener for TransferEventSink {
    fn on_transfer_start(&mut self, transfer: &TransferSnapshot) {
        if !self.filter.accepts(transfer) {
            return;
        }
        if self.is_tracked(transfer.tag) {
            tracing::debug!(tag = %transfer.tag, view = %self.filter, "start for listed transfer ignored");
            return;
        }
        self.index.insert(TransferRecord::from_snapshot(transfer));
    }

    fn on_transfer_update(&mut self, transfer: &TransferSnapshot) {
        if self.filter.is_history() {
            if !self.is_tracked(transfer.tag) {
                self.add_history(transfer);
                return;
            }
        } else if !self.filter.accepts(transfer) {
            return;
        }
        self.apply_progress(transfer);
    }

    fn on_transfer_temporary_error(&mut self, transfer: &TransferSnapshot, error: &str) {
        // Retries are the backend's business; the list does not change.
        tracing::debug!(tag = %transfer.tag, error, "temporary transfer error");
    }

    fn on_transfer_finish(&mut self, transfer: &TransferSnapshot, error: Option<&str>) {
        if let Some(error) = error {
            tracing::debug!(tag = %transfer.tag, error, "transfer finished with error");
        }
        self.finish(transfer);
    }
}
