//! The set of transfer views a tray shell shows.
//!
//! Each configured view is an independent `TransferEventSink` holding its own
//! copies of the records, so one transfer can be listed under "all",
//! "downloads" and later "finished" at the same time without the views
//! sharing mutable state.

use std::fmt;

use crate::config::TrayConfig;
use crate::transfer::{
    BackendHandle, TransferEventSink, TransferFilter, TransferListener, TransferSnapshot,
    TransferTotals,
};

pub struct TransferBoard {
    views: Vec<TransferEventSink>,
    totals: TransferTotals,
    backend: BackendHandle,
}

impl fmt::Debug for TransferBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferBoard")
            .field("views", &self.views)
            .field("totals", &self.totals)
            .finish()
    }
}

impl TransferBoard {
    /// Build one view per configured filter, all sharing `backend`.
    ///
    /// Repeated filters are only built once.
    pub fn new(backend: BackendHandle, config: &TrayConfig) -> Self {
        let mut views: Vec<TransferEventSink> = Vec::new();
        for &filter in &config.views {
            if views.iter().any(|v| v.filter() == filter) {
                tracing::warn!(view = %filter, "view configured twice, ignoring duplicate");
                continue;
            }
            let mut sink = TransferEventSink::new(filter, backend.clone());
            if filter.is_history() {
                sink = sink.with_history_limit(config.history_limit);
            }
            views.push(sink);
        }
        Self {
            views,
            totals: TransferTotals::new(),
            backend,
        }
    }

    /// Populate every view and the totals from the backend's active list.
    pub fn load_snapshot(&mut self) -> usize {
        let transfers = self.backend.active_transfers();
        for view in self.views.iter_mut() {
            view.load_from(&transfers);
        }
        self.totals.load_from(&transfers);
        tracing::info!(transfers = transfers.len(), "transfer views populated");
        transfers.len()
    }

    pub fn views(&self) -> &[TransferEventSink] {
        &self.views
    }

    pub fn view(&self, filter: TransferFilter) -> Option<&TransferEventSink> {
        self.views.iter().find(|v| v.filter() == filter)
    }

    pub fn view_mut(&mut self, filter: TransferFilter) -> Option<&mut TransferEventSink> {
        self.views.iter_mut().find(|v| v.filter() == filter)
    }

    pub fn totals(&self) -> &TransferTotals {
        &self.totals
    }

    /// Whether any in-flight view has rows; drives the tray overlay.
    pub fn has_active_transfers(&self) -> bool {
        self.views
            .iter()
            .any(|v| !v.filter().is_history() && !v.index().is_empty())
    }
}

impl TransferListener for TransferBoard {
    fn on_transfer_start(&mut self, transfer: &TransferSnapshot) {
        tracing::debug!(tag = %transfer.tag, file = %transfer.file_name, "transfer started");
        for view in self.views.iter_mut() {
            view.on_transfer_start(transfer);
        }
        self.totals.on_transfer_start(transfer);
    }

    fn on_transfer_update(&mut self, transfer: &TransferSnapshot) {
        tracing::trace!(
            tag = %transfer.tag,
            transferred = transfer.transferred_bytes,
            speed = transfer.speed,
            "transfer update"
        );
        // History only learns about a transfer through its finish callback.
        for view in self.views.iter_mut().filter(|v| !v.filter().is_history()) {
            view.on_transfer_update(transfer);
        }
        self.totals.on_transfer_update(transfer);
    }

    fn on_transfer_temporary_error(&mut self, transfer: &TransferSnapshot, error: &str) {
        for view in self.views.iter_mut() {
            view.on_transfer_temporary_error(transfer, error);
        }
        self.totals.on_transfer_temporary_error(transfer, error);
    }

    fn on_transfer_finish(&mut self, transfer: &TransferSnapshot, error: Option<&str>) {
        tracing::debug!(tag = %transfer.tag, failed = error.is_some(), "transfer finished");
        for view in self.views.iter_mut() {
            view.on_transfer_finish(transfer, error);
        }
        self.totals.on_transfer_finish(transfer, error);
    }
}
