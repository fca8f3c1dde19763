//! Transfer list model: records, the ordered index, and the sinks that feed
//! it from backend callbacks.

pub mod event;
pub mod index;
pub mod record;
pub mod sink;
pub mod stats;

pub use event::{
    BackendHandle, Direction, StaticBackend, TransferBackend, TransferEvent, TransferListener,
    TransferSnapshot,
};
pub use index::{ChangeLog, ChannelObserver, ListChange, ListObserver, SubscriptionId, TransferIndex};
pub use record::{Category, Priority, Tag, TransferRecord, TransferState};
pub use sink::{TransferEventSink, TransferFilter};
pub use stats::TransferTotals;
