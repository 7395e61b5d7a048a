use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::warn;

use super::ChangeReceiver;
use super::ConsistencyFlag;
use super::PauseControl;
use super::PendingChange;
use crate::model::Lattice;
use crate::physics::LatticeData;
use crate::physics::PhysicsEngine;
use crate::physics::RefPoints;
use crate::ComputationError;
use crate::Error;
use crate::Result;

/// Invoked once per successful recompute with the freshly published snapshot.
pub type RecalcCallback = Arc<dyn Fn(Arc<LatticeData>) + Send + Sync>;

/// Run the engine on a lattice snapshot, off the async runtime.
///
/// The engine call is synchronous, CPU-bound and potentially long-running,
/// so it goes through `spawn_blocking`. A panic inside the engine is a
/// contract violation and comes back fatal.
pub(crate) async fn compute_optics(
    engine: Arc<dyn PhysicsEngine>,
    lattice: Lattice,
    refpts: RefPoints,
    disable_emittance: bool,
) -> std::result::Result<LatticeData, ComputationError> {
    debug!("starting physics calculations");
    let handle = tokio::task::spawn_blocking(move || engine.compute(&lattice, &refpts, disable_emittance));
    match handle.await {
        Ok(result) => result,
        Err(join_error) => Err(ComputationError::TaskFailed(join_error)),
    }
}

/// The single long-lived background task behind a simulator.
///
/// Drains the change queue, applies each change to the lattice and, unless
/// paused, recomputes and publishes the derived data. The only suspension
/// points are the queue wait when idle and the engine call.
pub(crate) struct RecalculationWorker {
    lattice: Arc<RwLock<Lattice>>,
    engine: Arc<dyn PhysicsEngine>,
    refpts: RefPoints,
    disable_emittance: bool,
    store: Arc<ArcSwap<LatticeData>>,
    up_to_date: Arc<ConsistencyFlag>,
    paused: Arc<PauseControl>,
    /// Serializes enqueue (clear + push) against publish (empty-check +
    /// signal) so the flag can never read up-to-date with a change pending.
    enqueue_gate: Arc<Mutex<()>>,
    changes: Option<ChangeReceiver>,
    callback: Option<RecalcCallback>,
    shutdown: CancellationToken,
}

impl RecalculationWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        lattice: Arc<RwLock<Lattice>>,
        engine: Arc<dyn PhysicsEngine>,
        refpts: RefPoints,
        disable_emittance: bool,
        store: Arc<ArcSwap<LatticeData>>,
        up_to_date: Arc<ConsistencyFlag>,
        paused: Arc<PauseControl>,
        enqueue_gate: Arc<Mutex<()>>,
        changes: ChangeReceiver,
        callback: Option<RecalcCallback>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            lattice,
            engine,
            refpts,
            disable_emittance,
            store,
            up_to_date,
            paused,
            enqueue_gate,
            changes: Some(changes),
            callback,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) -> Result<()> {
        let mut changes = self.changes.take().expect("Expected a change receiver but found None");
        debug!("starting recalculation loop");

        loop {
            tokio::select! {
                // Use biased to ensure branch order
                biased;
                // P0: shutdown received; finish after the current cycle
                _ = self.shutdown.cancelled() => {
                    warn!("[RecalculationWorker] shutdown signal received.");
                    changes.reset();
                    return Ok(());
                }
                // P1: queue wait, the sole idle suspension point
                maybe_change = changes.next() => {
                    let Some(change) = maybe_change else {
                        warn!("change queue closed; stopping recalculation loop");
                        return Ok(());
                    };
                    self.apply(change);
                    while let Some(more) = changes.try_next() {
                        self.apply(more);
                    }
                    if self.paused.is_paused() {
                        debug!("calculations paused; queue drained without recomputing");
                    } else {
                        self.recompute(&changes).await?;
                    }
                }
            }
        }
    }

    fn apply(
        &self,
        change: PendingChange,
    ) {
        match change {
            PendingChange::Refresh => {}
            PendingChange::Set { index, field, value } => {
                let mut lattice = self.lattice.write();
                // Validated at enqueue time; a failure here means the model
                // changed underneath the queue.
                if let Err(e) = lattice.set_field(index, field, value) {
                    error!("failed to apply queued change to element {index}: {e}");
                } else {
                    debug!("applied {field} = {value} on element {index}");
                }
            }
        }
    }

    /// One computation cycle. Transient engine failures are downgraded to
    /// warnings and the last-known-good snapshot stays published; fatal
    /// failures stop the loop.
    async fn recompute(
        &self,
        changes: &ChangeReceiver,
    ) -> Result<()> {
        let snapshot = self.lattice.read().clone();
        let result = compute_optics(
            Arc::clone(&self.engine),
            snapshot,
            self.refpts.clone(),
            self.disable_emittance,
        )
        .await;

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                self.store.store(Arc::clone(&data));
                {
                    let _gate = self.enqueue_gate.lock();
                    if changes.is_empty() {
                        self.up_to_date.signal();
                        debug!("simulation up to date");
                    } else {
                        debug!("changes arrived during computation; staying stale");
                    }
                }
                if let Some(callback) = &self.callback {
                    callback(data);
                    debug!("recalculation callback completed");
                }
                Ok(())
            }
            Err(e) if e.is_transient() => {
                warn!("optics computation failed, keeping last-known-good data: {e}");
                Ok(())
            }
            Err(e) => {
                error!("physics engine contract violation; stopping recalculation loop: {e}");
                Err(Error::Computation(e))
            }
        }
    }
}
