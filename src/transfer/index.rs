//! Priority-ordered transfer list with change notifications.
//!
//! `TransferIndex` owns its records in an arena of slots. Two structures point
//! into the arena: a tag lookup and the ordered sequence of slot ids sorted
//! ascending by priority. Rows (positions in the ordered sequence) are the
//! only addressing scheme handed to views; records are read back through
//! `row`, `lookup` and `iter`.
//!
//! Records with equal priority keep the order in which they were placed:
//! every insertion and every priority move lands after the existing records
//! of the same priority. Because the sequence is always sorted, a record's
//! row is found by binary search on its priority followed by a scan of the
//! (usually one element long) run of equal priorities.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::record::{Priority, Tag, TransferRecord};

/// Structural or data change of the ordered sequence, addressed by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    RowsInserted { position: usize, count: usize },
    RowsRemoved { position: usize, count: usize },
    /// A single row moved; `to` is its row after the move.
    RowMoved { from: usize, to: usize },
    DataChanged { position: usize },
    BecameEmpty,
    BecameNonEmpty,
}

impl fmt::Display for ListChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListChange::RowsInserted { position, count } => {
                write!(f, "inserted {} row(s) at {}", count, position)
            }
            ListChange::RowsRemoved { position, count } => {
                write!(f, "removed {} row(s) at {}", count, position)
            }
            ListChange::RowMoved { from, to } => write!(f, "moved row {} -> {}", from, to),
            ListChange::DataChanged { position } => write!(f, "changed row {}", position),
            ListChange::BecameEmpty => write!(f, "became empty"),
            ListChange::BecameNonEmpty => write!(f, "became non-empty"),
        }
    }
}

/// Subscriber to list changes, typically a view adapter.
pub trait ListObserver {
    fn on_change(&mut self, change: &ListChange);
}

impl<F> ListObserver for F
where
    F: FnMut(&ListChange),
{
    fn on_change(&mut self, change: &ListChange) {
        self(change)
    }
}

/// Forwards changes into a tokio channel so a view on another task can
/// consume them as a stream. A closed receiver is ignored.
pub struct ChannelObserver(pub mpsc::UnboundedSender<ListChange>);

impl ListObserver for ChannelObserver {
    fn on_change(&mut self, change: &ListChange) {
        let _ = self.0.send(*change);
    }
}

/// Shared, cloneable recorder of every change it observes.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog(Arc<Mutex<Vec<ListChange>>>);

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded changes.
    pub fn take(&self) -> Vec<ListChange> {
        match self.0.lock() {
            Ok(mut changes) => std::mem::take(&mut *changes),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ListObserver for ChangeLog {
    fn on_change(&mut self, change: &ListChange) {
        match self.0.lock() {
            Ok(mut changes) => changes.push(*change),
            Err(poisoned) => poisoned.into_inner().push(*change),
        }
    }
}

/// Handle returned by `TransferIndex::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Slot {
    record: TransferRecord,
    /// Insertion counter, used to find the oldest records.
    inserted: u64,
}

/// Keyed and priority-ordered collection of transfer records.
pub struct TransferIndex {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    by_tag: HashMap<Tag, usize>,
    order: Vec<usize>,
    next_insert: u64,
    observers: Vec<(SubscriptionId, Box<dyn ListObserver + Send>)>,
    next_subscription: u64,
}

impl Default for TransferIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransferIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferIndex")
            .field("rows", &self.iter().map(|r| r.tag()).collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TransferIndex {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_tag: HashMap::new(),
            order: Vec::new(),
            next_insert: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Register an observer. Changes are delivered synchronously, in order.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: ListObserver + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Insert a record and return its row.
    ///
    /// A tag that is already present is a contract violation by the backend.
    /// It is logged, and the existing record takes over the new display
    /// fields and priority instead of a second row being created.
    pub fn insert(&mut self, record: TransferRecord) -> usize {
        let tag = record.tag();
        if self.by_tag.contains_key(&tag) {
            tracing::warn!(%tag, "transfer already listed, overwriting its record");
            return self.overwrite(record);
        }

        let row = self.upper_bound(record.priority());
        let slot = self.allocate(record);
        self.by_tag.insert(tag, slot);
        self.order.insert(row, slot);
        tracing::trace!(%tag, row, "transfer inserted");

        self.notify(ListChange::RowsInserted {
            position: row,
            count: 1,
        });
        if self.order.len() == 1 {
            self.notify(ListChange::BecameNonEmpty);
        }
        row
    }

    /// Remove a record. Unknown tags are ignored without notification.
    pub fn remove(&mut self, tag: Tag) -> Option<TransferRecord> {
        let slot = *self.by_tag.get(&tag)?;
        let row = self.locate(slot)?;

        self.order.remove(row);
        self.by_tag.remove(&tag);
        let record = self.release(slot)?;
        tracing::trace!(%tag, row, "transfer removed");

        self.notify(ListChange::RowsRemoved {
            position: row,
            count: 1,
        });
        if self.order.is_empty() {
            self.notify(ListChange::BecameEmpty);
        }
        Some(record)
    }

    /// Change a record's priority and return its new row.
    ///
    /// An equal priority, or a new priority that leaves the row where it
    /// was, only reports the row as changed. Anything else is reported as a
    /// single move.
    pub fn update_priority(&mut self, tag: Tag, priority: Priority) -> Option<usize> {
        let slot = *self.by_tag.get(&tag)?;
        let from = self.locate(slot)?;

        if self.priority_of(slot) == priority {
            self.notify(ListChange::DataChanged { position: from });
            return Some(from);
        }

        self.order.remove(from);
        if let Some(entry) = self.slots[slot].as_mut() {
            entry.record.set_priority(priority);
        }
        let to = self.upper_bound(priority);
        self.order.insert(to, slot);

        if to == from {
            self.notify(ListChange::DataChanged { position: to });
        } else {
            tracing::trace!(%tag, from, to, "transfer moved");
            self.notify(ListChange::RowMoved { from, to });
        }
        Some(to)
    }

    /// Mutate a record's display fields and report its row as changed.
    ///
    /// If `apply` touches the priority, the change is routed through
    /// `update_priority` so the sequence stays sorted and a move is reported
    /// instead.
    pub fn refresh<F>(&mut self, tag: Tag, apply: F) -> Option<usize>
    where
        F: FnOnce(&mut TransferRecord),
    {
        let slot = *self.by_tag.get(&tag)?;
        let entry = self.slots[slot].as_mut()?;
        let before = entry.record.priority();
        apply(&mut entry.record);
        let after = entry.record.priority();

        if after != before {
            entry.record.set_priority(before);
            return self.update_priority(tag, after);
        }

        let row = self.locate(slot)?;
        self.notify(ListChange::DataChanged { position: row });
        Some(row)
    }

    pub fn lookup(&self, tag: Tag) -> Option<&TransferRecord> {
        let slot = *self.by_tag.get(&tag)?;
        self.record(slot)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.by_tag.contains_key(&tag)
    }

    /// Current row of a record.
    pub fn position_of(&self, tag: Tag) -> Option<usize> {
        let slot = *self.by_tag.get(&tag)?;
        self.locate(slot)
    }

    /// Record shown at a row.
    pub fn row(&self, position: usize) -> Option<&TransferRecord> {
        let slot = *self.order.get(position)?;
        self.record(slot)
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in row order.
    pub fn iter(&self) -> impl Iterator<Item = &TransferRecord> + '_ {
        self.order.iter().filter_map(move |&slot| self.record(slot))
    }

    /// Drop every record, reporting a single removal of all rows.
    pub fn clear(&mut self) {
        let count = self.order.len();
        if count == 0 {
            return;
        }
        self.order.clear();
        self.by_tag.clear();
        self.slots.clear();
        self.free.clear();

        self.notify(ListChange::RowsRemoved { position: 0, count });
        self.notify(ListChange::BecameEmpty);
    }

    /// Evict the earliest inserted records until at most `limit` remain.
    pub fn truncate_oldest(&mut self, limit: usize) -> Vec<TransferRecord> {
        let mut evicted = Vec::new();
        while self.order.len() > limit {
            let oldest = self
                .order
                .iter()
                .filter_map(|&slot| self.slots[slot].as_ref())
                .min_by_key(|entry| entry.inserted)
                .map(|entry| entry.record.tag());
            match oldest.and_then(|tag| self.remove(tag)) {
                Some(record) => evicted.push(record),
                None => break,
            }
        }
        evicted
    }

    fn overwrite(&mut self, record: TransferRecord) -> usize {
        let tag = record.tag();
        let priority = record.priority();
        if let Some(entry) = self
            .by_tag
            .get(&tag)
            .copied()
            .and_then(|slot| self.slots[slot].as_mut())
        {
            entry.record.overwrite_from(record);
        }
        self.update_priority(tag, priority).unwrap_or_default()
    }

    fn allocate(&mut self, record: TransferRecord) -> usize {
        let entry = Slot {
            record,
            inserted: self.next_insert,
        };
        self.next_insert += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) -> Option<TransferRecord> {
        let entry = self.slots.get_mut(slot)?.take()?;
        self.free.push(slot);
        Some(entry.record)
    }

    fn record(&self, slot: usize) -> Option<&TransferRecord> {
        self.slots.get(slot)?.as_ref().map(|entry| &entry.record)
    }

    fn priority_of(&self, slot: usize) -> Priority {
        self.record(slot)
            .map(TransferRecord::priority)
            .unwrap_or_default()
    }

    /// First row whose priority is not less than `priority`.
    fn lower_bound(&self, priority: Priority) -> usize {
        self.order
            .partition_point(|&slot| self.priority_of(slot) < priority)
    }

    /// First row whose priority is greater than `priority`.
    fn upper_bound(&self, priority: Priority) -> usize {
        self.order
            .partition_point(|&slot| self.priority_of(slot) <= priority)
    }

    fn locate(&self, slot: usize) -> Option<usize> {
        let priority = self.priority_of(slot);
        let start = self.lower_bound(priority);
        let found = self.order[start..]
            .iter()
            .take_while(|&&other| self.priority_of(other) == priority)
            .position(|&other| other == slot)
            .map(|offset| start + offset);
        if found.is_none() {
            tracing::warn!(slot, "listed record missing from ordered sequence");
        }
        found
    }

    fn notify(&mut self, change: ListChange) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_change(&change);
        }
    }
}
