//! Marshals backend callbacks onto a single task.
//!
//! The model types are only ever mutated by one logical thread. Backend
//! callback threads hold an `EventSender` and push events into an unbounded
//! channel; one spawned tokio task owns the `TransferBoard` and applies the
//! events in arrival order. When the last sender is dropped the task ends
//! and hands the board back through `Dispatcher::join`.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::board::TransferBoard;
use crate::error::TrayError;
use crate::transfer::{TransferEvent, TransferListener, TransferSnapshot};

/// Cloneable producer side, safe to hand to any backend thread.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<TransferEvent>,
}

impl EventSender {
    /// Queue an event for the dispatcher task.
    pub fn send(&self, event: TransferEvent) -> Result<(), TrayError> {
        self.tx
            .send(event)
            .map_err(|_| TrayError::Dispatcher("dispatcher task has stopped".into()))
    }

    fn forward(&self, event: TransferEvent) {
        if let Err(e) = self.send(event) {
            tracing::warn!("dropping transfer event: {}", e);
        }
    }
}

/// Lets an `EventSender` be registered directly as the backend's listener.
impl TransferListener for EventSender {
    fn on_transfer_start(&mut self, transfer: &TransferSnapshot) {
        self.forward(TransferEvent::Start {
            transfer: transfer.clone(),
        });
    }

    fn on_transfer_update(&mut self, transfer: &TransferSnapshot) {
        self.forward(TransferEvent::Update {
            transfer: transfer.clone(),
        });
    }

    fn on_transfer_temporary_error(&mut self, transfer: &TransferSnapshot, error: &str) {
        self.forward(TransferEvent::TemporaryError {
            transfer: transfer.clone(),
            error: error.to_string(),
        });
    }

    fn on_transfer_finish(&mut self, transfer: &TransferSnapshot, error: Option<&str>) {
        self.forward(TransferEvent::Finish {
            transfer: transfer.clone(),
            error: error.map(str::to_string),
        });
    }
}

/// Consumer task owning the board.
pub struct Dispatcher {
    task: JoinHandle<TransferBoard>,
}

impl Dispatcher {
    /// Wait for every sender to be dropped and take the board back.
    pub async fn join(self) -> Result<TransferBoard, TrayError> {
        Ok(self.task.await?)
    }
}

/// Move `board` onto a new tokio task and return the sender feeding it.
///
/// Must be called from within a tokio runtime.
pub fn spawn(mut board: TransferBoard) -> (EventSender, Dispatcher) {
    let (tx, mut rx) = mpsc::unbounded_channel::<TransferEvent>();

    let task = tokio::spawn(async move {
        let mut handled = 0u64;
        while let Some(event) = rx.recv().await {
            tracing::trace!(
                kind = event.kind(),
                tag = %event.transfer().tag,
                "dispatching transfer event"
            );
            board.handle(&event);
            handled += 1;
        }
        tracing::debug!(handled, "all event senders closed");
        board
    });

    (EventSender { tx }, Dispatcher { task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrayConfig;
    use crate::transfer::{Direction, Priority, StaticBackend, Tag, TransferFilter};

    fn snap(tag: i32, priority: u64) -> TransferSnapshot {
        TransferSnapshot {
            tag: Tag(tag),
            direction: Direction::Download,
            file_name: format!("file-{}", tag),
            total_bytes: 100,
            transferred_bytes: 0,
            speed: 0,
            priority: Priority(priority),
            is_sync: false,
        }
    }

    fn board() -> TransferBoard {
        TransferBoard::new(StaticBackend::default().handle(), &TrayConfig::default())
    }

    #[tokio::test]
    async fn applies_events_in_order() {
        let (sender, dispatcher) = spawn(board());
        sender
            .send(TransferEvent::Start {
                transfer: snap(1, 5),
            })
            .unwrap();
        sender
            .send(TransferEvent::Start {
                transfer: snap(2, 3),
            })
            .unwrap();
        sender
            .send(TransferEvent::Update {
                transfer: snap(1, 1),
            })
            .unwrap();
        drop(sender);

        let board = dispatcher.join().await.unwrap();
        let order: Vec<i32> = board
            .view(TransferFilter::All)
            .unwrap()
            .index()
            .iter()
            .map(|r| r.tag().0)
            .collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[tokio::test]
    async fn senders_on_other_threads_feed_one_board() {
        let (sender, dispatcher) = spawn(board());
        let handles: Vec<_> = (0..4)
            .map(|tag| {
                let mut listener = sender.clone();
                std::thread::spawn(move || {
                    listener.on_transfer_start(&snap(tag, tag as u64));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(sender);

        let board = dispatcher.join().await.unwrap();
        assert_eq!(board.view(TransferFilter::All).unwrap().index().count(), 4);
        assert_eq!(board.totals().active_count(), 4);
    }

    #[tokio::test]
    async fn listener_forwards_finish_with_error() {
        let (mut sender, dispatcher) = spawn(board());
        sender.on_transfer_start(&snap(1, 1));
        sender.on_transfer_temporary_error(&snap(1, 1), "timeout");
        sender.on_transfer_finish(&snap(1, 1), Some("quota"));
        drop(sender);

        let board = dispatcher.join().await.unwrap();
        assert!(board.view(TransferFilter::All).unwrap().index().is_empty());
        assert_eq!(board.totals().direction(Direction::Download).failed, 1);
        assert_eq!(
            board.view(TransferFilter::Finished).unwrap().index().count(),
            1
        );
    }

    #[tokio::test]
    async fn send_after_dispatcher_stops_is_an_error() {
        let (sender, dispatcher) = spawn(board());
        dispatcher.task.abort();
        let _ = dispatcher.task.await;
        let err = sender
            .send(TransferEvent::Start {
                transfer: snap(1, 1),
            })
            .unwrap_err();
        assert!(matches!(err, TrayError::Dispatcher(_)));
    }
}
