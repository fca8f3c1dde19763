//! Ordered transfer list model for a cloud-storage tray shell.
//!
//! Backend lifecycle callbacks (start, update, temporary error, finish) are
//! turned into a live, priority-ordered list per view, with row-addressed
//! change notifications for whatever list widget displays it.
//!
//! ```
//! use transfer_tray::transfer::{
//!     Direction, Priority, StaticBackend, Tag, TransferEventSink, TransferFilter,
//!     TransferListener, TransferSnapshot,
//! };
//!
//! let mut sink = TransferEventSink::new(TransferFilter::All, StaticBackend::default().handle());
//! let transfer = TransferSnapshot {
//!     tag: Tag(1),
//!     direction: Direction::Download,
//!     file_name: "photo.jpg".into(),
//!     total_bytes: 2048,
//!     transferred_bytes: 0,
//!     speed: 0,
//!     priority: Priority(10),
//!     is_sync: false,
//! };
//! sink.on_transfer_start(&transfer);
//! assert_eq!(sink.index().position_of(Tag(1)), Some(0));
//! ```

pub mod board;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod replay;
pub mod transfer;
