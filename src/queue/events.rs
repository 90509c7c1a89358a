use std::sync::atomic::{AtomicBool, Ordering};

use async_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Serialize;
use tracing::warn;

use crate::toast::ToastId;

/// State change notifications for whoever draws the queue.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueEvent {
    Shown { id: ToastId },
    Updated { id: ToastId },
    Paused { id: ToastId },
    Resumed { id: ToastId },
    Exiting { id: ToastId },
    /// Final removal. `evicted` toasts skipped the exit phase.
    Removed { id: ToastId, evicted: bool },
    ConfigChanged,
}

pub(super) struct EventSink {
    tx: Sender<QueueEvent>,
    rx: Receiver<QueueEvent>,
    subscribed: AtomicBool,
}

impl EventSink {
    pub(super) fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self {
            tx,
            rx,
            subscribed: AtomicBool::new(false),
        }
    }

    pub(super) fn subscribe(&self) -> Receiver<QueueEvent> {
        self.subscribed.store(true, Ordering::Release);
        self.rx.clone()
    }

    /// Nothing is buffered until someone subscribes.
    pub(super) fn emit(&self, event: QueueEvent) {
        if !self.subscribed.load(Ordering::Acquire) {
            return;
        }
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "toast event buffer full; dropping event");
            }
        }
    }
}
