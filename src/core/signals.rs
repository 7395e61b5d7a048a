use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::watch;

/// Binary up-to-date / stale signal with bounded blocking waits.
///
/// False whenever the change queue is non-empty or a computation is in
/// flight; set true only right after a snapshot swap that accounts for all
/// changes enqueued before the flag was last cleared. Any number of
/// concurrent waiters, one signaler.
pub(crate) struct ConsistencyFlag {
    tx: watch::Sender<bool>,
}

impl ConsistencyFlag {
    pub(crate) fn new(up_to_date: bool) -> Self {
        let (tx, _rx) = watch::channel(up_to_date);
        Self { tx }
    }

    /// Mark the derived data stale. Idempotent.
    pub(crate) fn clear(&self) {
        self.tx.send_replace(false);
    }

    /// Mark the derived data up to date and wake every blocked waiter.
    pub(crate) fn signal(&self) {
        self.tx.send_replace(true);
    }

    pub(crate) fn is_up_to_date(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspend until the data is up to date or `timeout` elapses.
    ///
    /// Returns a boolean instead of an error so callers can choose strict
    /// or lenient handling.
    pub(crate) async fn wait(
        &self,
        timeout: Duration,
    ) -> bool {
        let mut rx = self.tx.subscribe();
        let result = match tokio::time::timeout(timeout, rx.wait_for(|up| *up)).await {
            Ok(result) => result.is_ok(),
            Err(_elapsed) => false,
        };
        result
    }
}

/// Suppresses recomputation, not queue draining, while set.
///
/// Independent of [`ConsistencyFlag`]: a paused worker keeps applying
/// changes to the lattice but leaves the derived data and the flag alone.
pub(crate) struct PauseControl {
    paused: AtomicBool,
}

impl PauseControl {
    pub(crate) fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
        }
    }

    pub(crate) fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Clear the pause flag; returns whether it was set.
    pub(crate) fn unpause(&self) -> bool {
        self.paused.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}
