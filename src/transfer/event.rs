//! Backend-facing contract: what the storage SDK reports about transfers and
//! how it reports it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::record::{Priority, Tag};

/// Direction of a transfer relative to the local machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Download,
    Upload,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Download => write!(f, "download"),
            Direction::Upload => write!(f, "upload"),
        }
    }
}

/// Everything the backend tells us about one transfer at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSnapshot {
    pub tag: Tag,
    pub direction: Direction,
    pub file_name: String,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub transferred_bytes: u64,
    #[serde(default)]
    pub speed: u64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_sync: bool,
}

/// One lifecycle callback, as recorded or queued for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransferEvent {
    Start {
        transfer: TransferSnapshot,
    },
    Update {
        transfer: TransferSnapshot,
    },
    TemporaryError {
        transfer: TransferSnapshot,
        #[serde(default)]
        error: String,
    },
    Finish {
        transfer: TransferSnapshot,
        #[serde(default)]
        error: Option<String>,
    },
}

impl TransferEvent {
    pub fn transfer(&self) -> &TransferSnapshot {
        match self {
            TransferEvent::Start { transfer }
            | TransferEvent::Update { transfer }
            | TransferEvent::TemporaryError { transfer, .. }
            | TransferEvent::Finish { transfer, .. } => transfer,
        }
    }

    /// Short lowercase name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferEvent::Start { .. } => "start",
            TransferEvent::Update { .. } => "update",
            TransferEvent::TemporaryError { .. } => "temporary_error",
            TransferEvent::Finish { .. } => "finish",
        }
    }
}

/// Receiver of backend transfer callbacks.
///
/// All callbacks for one listener must arrive from a single logical thread;
/// see `crate::dispatch` for a way to guarantee that.
pub trait TransferListener {
    fn on_transfer_start(&mut self, transfer: &TransferSnapshot);

    fn on_transfer_update(&mut self, transfer: &TransferSnapshot);

    fn on_transfer_temporary_error(&mut self, transfer: &TransferSnapshot, error: &str);

    fn on_transfer_finish(&mut self, transfer: &TransferSnapshot, error: Option<&str>);

    /// Route a queued event to the matching callback.
    fn handle(&mut self, event: &TransferEvent) {
        match event {
            TransferEvent::Start { transfer } => self.on_transfer_start(transfer),
            TransferEvent::Update { transfer } => self.on_transfer_update(transfer),
            TransferEvent::TemporaryError { transfer, error } => {
                self.on_transfer_temporary_error(transfer, error)
            }
            TransferEvent::Finish { transfer, error } => {
                self.on_transfer_finish(transfer, error.as_deref())
            }
        }
    }
}

/// Handle to the backend connection, injected into every sink.
pub trait TransferBackend: Send + Sync {
    /// Transfers currently in flight, used to populate views on (re)connect.
    fn active_transfers(&self) -> Vec<TransferSnapshot>;
}

/// Shared backend handle.
pub type BackendHandle = Arc<dyn TransferBackend>;

/// Backend with a fixed list of active transfers.
///
/// Serves snapshots loaded from disk by the replay driver, and stands in for
/// a live connection in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    transfers: Vec<TransferSnapshot>,
}

impl StaticBackend {
    pub fn new(transfers: Vec<TransferSnapshot>) -> Self {
        Self { transfers }
    }

    pub fn handle(self) -> BackendHandle {
        Arc::new(self)
    }
}

impl TransferBackend for StaticBackend {
    fn active_transfers(&self) -> Vec<TransferSnapshot> {
        self.transfers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_parses_from_tagged_json() {
        let line = r#"{"event":"finish","transfer":{"tag":3,"direction":"upload","file_name":"a.txt","priority":7},"error":null}"#;
        let event: TransferEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.kind(), "finish");
        let transfer = event.transfer();
        assert_eq!(transfer.tag, Tag(3));
        assert_eq!(transfer.direction, Direction::Upload);
        assert_eq!(transfer.priority, Priority(7));
        assert_eq!(transfer.total_bytes, 0);
        assert!(!transfer.is_sync);
    }

    #[test]
    fn temporary_error_defaults_message() {
        let line = r#"{"event":"temporary_error","transfer":{"tag":1,"direction":"download","file_name":"b"}}"#;
        let event: TransferEvent = serde_json::from_str(line).unwrap();
        match event {
            TransferEvent::TemporaryError { error, .. } => assert!(error.is_empty()),
            other => panic!("Expected TemporaryError, got: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_is_rejected() {
        let line = r#"{"event":"paused","transfer":{"tag":1,"direction":"download","file_name":"b"}}"#;
        assert!(serde_json::from_str::<TransferEvent>(line).is_err());
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl TransferListener for Recorder {
        fn on_transfer_start(&mut self, t: &TransferSnapshot) {
            self.0.push(format!("start {}", t.tag));
        }
        fn on_transfer_update(&mut self, t: &TransferSnapshot) {
            self.0.push(format!("update {}", t.tag));
        }
        fn on_transfer_temporary_error(&mut self, t: &TransferSnapshot, error: &str) {
            self.0.push(format!("temporary_error {} {}", t.tag, error));
        }
        fn on_transfer_finish(&mut self, t: &TransferSnapshot, error: Option<&str>) {
            self.0.push(format!("finish {} {:?}", t.tag, error));
        }
    }

    #[test]
    fn handle_routes_to_callbacks() {
        let transfer = TransferSnapshot {
            tag: Tag(2),
            direction: Direction::Download,
            file_name: "x".into(),
            total_bytes: 0,
            transferred_bytes: 0,
            speed: 0,
            priority: Priority(0),
            is_sync: false,
        };
        let mut recorder = Recorder::default();
        recorder.handle(&TransferEvent::Start { transfer: transfer.clone() });
        recorder.handle(&TransferEvent::TemporaryError {
            transfer: transfer.clone(),
            error: "retry".into(),
        });
        recorder.handle(&TransferEvent::Finish {
            transfer,
            error: Some("quota".into()),
        });
        assert_eq!(
            recorder.0,
            vec![
                "start #2".to_string(),
                "temporary_error #2 retry".to_string(),
                "finish #2 Some(\"quota\")".to_string(),
            ]
        );
    }

    #[test]
    fn static_backend_returns_its_list() {
        let backend = StaticBackend::new(Vec::new()).handle();
        assert!(backend.active_transfers().is_empty());
    }
}
