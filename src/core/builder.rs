//! Builder for [`Simulator`] construction.
//!
//! Assembles the lattice, physics engine, configuration and optional
//! completion callback, validates the configuration, performs the initial
//! physics computation and spawns the background worker.
//!
//! The initial computation happens here, during construction, so the
//! derived data can never be referenced before it exists; a failing initial
//! computation fails construction instead of leaving a simulator with no
//! snapshot to serve.

use std::sync::Arc;

use arc_swap::ArcSwap;
use config::ConfigError;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;

use super::compute_optics;
use super::ChangeQueue;
use super::ConsistencyFlag;
use super::PauseControl;
use super::RecalcCallback;
use super::RecalculationWorker;
use super::Simulator;
use crate::model::Lattice;
use crate::physics::LatticeData;
use crate::physics::PhysicsEngine;
use crate::physics::RefPoints;
use crate::Result;
use crate::SimConfig;

pub struct SimulatorBuilder {
    lattice: Lattice,
    engine: Arc<dyn PhysicsEngine>,
    config: SimConfig,
    callback: Option<RecalcCallback>,
}

impl SimulatorBuilder {
    pub fn new(
        lattice: Lattice,
        engine: Arc<dyn PhysicsEngine>,
    ) -> Self {
        Self {
            lattice,
            engine,
            config: SimConfig::default(),
            callback: None,
        }
    }

    pub fn config(
        mut self,
        config: SimConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Called once per successful recompute with the freshly published
    /// snapshot.
    pub fn callback<F>(
        mut self,
        callback: F,
    ) -> Self
    where
        F: Fn(Arc<LatticeData>) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub async fn build(self) -> Result<Simulator> {
        self.config.validate()?;
        if self.lattice.is_empty() {
            return Err(ConfigError::Message("lattice must contain at least one element".to_string()).into());
        }

        let refpts = RefPoints::all(self.lattice.len());

        // Initial physics data calculation.
        let initial = compute_optics(
            Arc::clone(&self.engine),
            self.lattice.clone(),
            refpts.clone(),
            self.config.disable_emittance,
        )
        .await?;
        info!("initial physics calculation complete; starting recalculation worker");

        let lattice = Arc::new(RwLock::new(self.lattice));
        let store = Arc::new(ArcSwap::from_pointee(initial));
        let up_to_date = Arc::new(ConsistencyFlag::new(true));
        let paused = Arc::new(PauseControl::new());
        let enqueue_gate = Arc::new(Mutex::new(()));
        let shutdown = CancellationToken::new();

        let queue = ChangeQueue::new();
        let changes = queue.take_receiver().expect("Expected a change receiver but found None");

        let worker = RecalculationWorker::new(
            Arc::clone(&lattice),
            self.engine,
            refpts,
            self.config.disable_emittance,
            Arc::clone(&store),
            Arc::clone(&up_to_date),
            Arc::clone(&paused),
            Arc::clone(&enqueue_gate),
            changes,
            self.callback,
            shutdown.clone(),
        );

        // This task should last the lifetime of the simulator.
        let worker_handle = tokio::spawn(async move {
            let result = worker.run().await;
            if let Err(ref e) = result {
                error!("recalculation worker stopped with error: {e:?}");
            }
            result
        });

        Ok(Simulator {
            lattice,
            queue,
            store,
            up_to_date,
            paused,
            enqueue_gate,
            shutdown,
            worker_handle,
            config: self.config,
        })
    }
}
