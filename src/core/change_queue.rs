use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::model::FieldKind;
use crate::AccessError;

/// An immutable unit of work against the shared lattice.
///
/// Created by a writer, owned by the queue until drained, applied once by
/// the worker and then discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingChange {
    /// Set `field` to `value` on the element at 1-based `index`
    Set {
        index: usize,
        field: FieldKind,
        value: f64,
    },
    /// No-op wake-up forcing a fresh recalculation cycle
    Refresh,
}

/// Sender half of the ordered change channel.
///
/// Unbounded: `push` enqueues at the tail and never blocks, never drops.
/// Strict FIFO with no coalescing; when several changes target the same
/// field the last applied wins on the model, in submission order.
pub(crate) struct ChangeQueue {
    tx: mpsc::UnboundedSender<PendingChange>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<PendingChange>>>,
}

impl ChangeQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    pub(crate) fn push(
        &self,
        change: PendingChange,
    ) -> Result<(), AccessError> {
        self.tx.send(change).map_err(|_| AccessError::WorkerStopped)
    }

    /// Hand the receiver half to the worker. Yields `None` on the second
    /// call; there is exactly one consumer.
    pub(crate) fn take_receiver(&self) -> Option<ChangeReceiver> {
        self.rx.lock().take().map(|rx| ChangeReceiver { rx })
    }
}

/// Receiver half, owned by the worker for its whole lifetime.
pub(crate) struct ChangeReceiver {
    rx: mpsc::UnboundedReceiver<PendingChange>,
}

impl ChangeReceiver {
    /// Blocking pop: the worker's sole suspension point when idle.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub(crate) async fn next(&mut self) -> Option<PendingChange> {
        self.rx.recv().await
    }

    /// Non-blocking pop used to drain everything currently available.
    pub(crate) fn try_next(&mut self) -> Option<PendingChange> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Close the channel and discard everything still pending. Used at
    /// shutdown so no further processing occurs.
    pub(crate) fn reset(&mut self) {
        self.rx.close();
        let mut discarded = 0usize;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("discarded {discarded} pending changes on reset");
        }
    }
}
