//! The public coordinator facade.
//!
//! ## Key Responsibilities
//! - Accepts mutation intents against the shared lattice and batches them
//!   onto the change queue
//! - Exposes pause/trigger/wait lifecycle control over the background worker
//! - Serves typed, consistency-waiting read accessors over the latest
//!   derived-data snapshot
//!
//! ## Example Usage
//! ```rust,no_run
//! # use std::time::Duration;
//! # use latsim::Simulator;
//! # async fn demo(simulator: Simulator) -> latsim::Result<()> {
//! simulator.queue_set(5, "b1".parse()?, 2.5)?;
//! assert!(simulator.wait_for_calculations(Duration::from_secs(5)).await);
//! let tunes = simulator.get_tunes().await?;
//! assert!(tunes[0] < 1.0);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Array3;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ChangeQueue;
use super::ConsistencyFlag;
use super::PauseControl;
use super::PendingChange;
use crate::constants::C_GAMMA;
use crate::constants::C_Q;
use crate::constants::ELECTRON_REST_ENERGY_EV;
use crate::constants::SPEED_OF_LIGHT;
use crate::model::Element;
use crate::model::FieldKind;
use crate::model::Lattice;
use crate::model::OrbitPlane;
use crate::model::Plane;
use crate::physics::LatticeData;
use crate::AccessError;
use crate::Error;
use crate::ReadPolicy;
use crate::Result;
use crate::SimConfig;

/// A centralised coordinator which keeps the derived physics data of the
/// lattice it holds consistent with every change made to it.
///
/// Changes are enqueued, drained by a single background worker, applied to
/// the lattice and followed by a recomputation through the physics engine;
/// the consistency flag tells readers when the derived data has caught up.
pub struct Simulator {
    pub(crate) lattice: Arc<RwLock<Lattice>>,
    pub(crate) queue: ChangeQueue,
    pub(crate) store: Arc<ArcSwap<LatticeData>>,
    pub(crate) up_to_date: Arc<ConsistencyFlag>,
    pub(crate) paused: Arc<PauseControl>,
    pub(crate) enqueue_gate: Arc<Mutex<()>>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) worker_handle: JoinHandle<Result<()>>,
    pub(crate) config: SimConfig,
}

impl Simulator {
    // --- write path ---

    /// Enqueue a field change, to be applied when the queue is drained.
    ///
    /// Validates the field against the element eagerly, so an unknown field
    /// fails here and never silently disappears into the queue. Clears the
    /// consistency flag and returns without blocking.
    pub fn queue_set(
        &self,
        index: usize,
        field: FieldKind,
        value: f64,
    ) -> Result<()> {
        self.lattice.read().validate_field(index, field)?;
        if !self.is_running() {
            return Err(AccessError::WorkerStopped.into());
        }
        {
            let _gate = self.enqueue_gate.lock();
            self.up_to_date.clear();
            self.queue.push(PendingChange::Set { index, field, value })?;
        }
        debug!("queued {field} = {value} on element {index}");
        Ok(())
    }

    /// Unpause and force a fresh recalculation cycle even with no real
    /// mutation pending.
    ///
    /// Does not wait for the recalculation to complete; that is up to the
    /// caller.
    pub fn trigger_calculation(&self) -> Result<()> {
        self.unpause_calculations()?;
        self.push_refresh()
    }

    // --- pause control ---

    /// Pause the physics calculations.
    ///
    /// This does not pause the emptying of the queue: changes keep being
    /// applied to the lattice, only the engine call is suppressed.
    pub fn pause_calculations(&self) {
        info!("pausing physics calculations");
        self.paused.pause();
    }

    /// Unpause the physics calculations.
    ///
    /// If the derived data is stale this triggers a recomputation by
    /// itself, so no stale window survives a resume.
    pub fn unpause_calculations(&self) -> Result<()> {
        if self.paused.unpause() {
            info!("unpausing physics calculations");
            if !self.up_to_date.is_up_to_date() {
                self.push_refresh()?;
            }
        }
        Ok(())
    }

    /// Pause or unpause, whichever applies.
    pub fn toggle_calculations(&self) -> Result<()> {
        if self.paused.is_paused() {
            self.unpause_calculations()
        } else {
            self.pause_calculations();
            Ok(())
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_paused()
    }

    // --- consistency ---

    /// Wait until the physics calculations have taken account of all
    /// changes to the lattice, i.e. the derived data is fully up to date.
    ///
    /// Returns `false` if `timeout` elapsed before the calculations
    /// concluded, else `true`. A terminated worker can never signal, so the
    /// wait fails fast instead of parking forever.
    pub async fn wait_for_calculations(
        &self,
        timeout: Duration,
    ) -> bool {
        if !self.is_running() && !self.up_to_date.is_up_to_date() {
            warn!("wait_for_calculations called on a terminated simulator with stale data");
            return false;
        }
        self.up_to_date.wait(timeout).await
    }

    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date.is_up_to_date()
    }

    // --- lifecycle ---

    /// Request termination; effective after the current drain/compute
    /// cycle, upon which the queue is reset. Safe to call mid-computation.
    pub fn terminate(&self) {
        info!("terminating recalculation worker");
        self.shutdown.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.worker_handle.is_finished()
    }

    /// Terminate and join the worker task, surfacing any fatal worker
    /// error.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.cancel();
        match self.worker_handle.await {
            Ok(result) => result,
            Err(join_error) => Err(Error::Fatal(format!("recalculation worker panicked: {join_error}"))),
        }
    }

    // --- derived-data reads ---

    /// The latest snapshot, after a consistency wait bounded by the
    /// configured timeout.
    ///
    /// On timeout, `Strict` raises [`AccessError::StaleData`] while
    /// `BestEffort` logs a warning and serves the last-known-good data. The
    /// typed accessors below all use the configured default policy; callers
    /// needing per-read control come through here.
    pub async fn data(
        &self,
        policy: ReadPolicy,
    ) -> Result<Arc<LatticeData>> {
        let timeout = self.config.wait_timeout();
        if !self.wait_for_calculations(timeout).await {
            match policy {
                ReadPolicy::Strict => return Err(AccessError::StaleData { timeout }.into()),
                ReadPolicy::BestEffort => {
                    warn!("derived data still stale after {timeout:?}; serving last-known-good snapshot");
                }
            }
        }
        Ok(self.store.load_full())
    }

    async fn ready_data(&self) -> Result<Arc<LatticeData>> {
        self.data(self.config.read_policy).await
    }

    /// Fractional tunes of both transverse planes.
    pub async fn get_tunes(&self) -> Result<[f64; 2]> {
        Ok(self.ready_data().await?.fractional_tunes())
    }

    /// Fractional tune of one transverse plane.
    pub async fn get_tune(
        &self,
        plane: Plane,
    ) -> Result<f64> {
        Ok(self.ready_data().await?.fractional_tunes()[plane.cell()])
    }

    pub async fn get_chromaticities(&self) -> Result<[f64; 2]> {
        Ok(self.ready_data().await?.chromaticity)
    }

    pub async fn get_chromaticity(
        &self,
        plane: Plane,
    ) -> Result<f64> {
        Ok(self.ready_data().await?.chromaticity[plane.cell()])
    }

    /// Closed orbit at every element, all four phase-space coordinates.
    pub async fn get_orbits(&self) -> Result<Array2<f64>> {
        Ok(self.ready_data().await?.orbit())
    }

    /// Closed orbit at every element on one phase-space coordinate.
    pub async fn get_orbit(
        &self,
        plane: OrbitPlane,
    ) -> Result<Array1<f64>> {
        Ok(self.ready_data().await?.orbit_plane(plane))
    }

    pub async fn get_dispersions(&self) -> Result<Array2<f64>> {
        Ok(self.ready_data().await?.dispersion())
    }

    pub async fn get_dispersion(
        &self,
        plane: OrbitPlane,
    ) -> Result<Array1<f64>> {
        Ok(self.ready_data().await?.dispersion_plane(plane))
    }

    pub async fn get_alpha(&self) -> Result<Array2<f64>> {
        Ok(self.ready_data().await?.alpha())
    }

    pub async fn get_beta(&self) -> Result<Array2<f64>> {
        Ok(self.ready_data().await?.beta())
    }

    pub async fn get_mu(&self) -> Result<Array2<f64>> {
        Ok(self.ready_data().await?.mu())
    }

    pub async fn get_m66(&self) -> Result<Array3<f64>> {
        Ok(self.ready_data().await?.m66())
    }

    /// s position of every element.
    pub async fn get_s(&self) -> Result<Array1<f64>> {
        Ok(self.ready_data().await?.s_positions())
    }

    /// Emittance of one transverse plane, from the beam envelope.
    ///
    /// The emittance at the lattice entrance is constant throughout, so
    /// which element's value is served is arbitrary.
    pub async fn get_emittance(
        &self,
        plane: Plane,
    ) -> Result<f64> {
        Ok(self.get_emittances().await?[plane.cell()])
    }

    pub async fn get_emittances(&self) -> Result<[f64; 2]> {
        if self.config.disable_emittance {
            return Err(AccessError::EmittanceDisabled.into());
        }
        let data = self.ready_data().await?;
        data.emittance
            .ok_or_else(|| AccessError::EmittanceDisabled.into())
    }

    /// The 5 synchrotron radiation integrals.
    pub async fn get_radiation_integrals(&self) -> Result<[f64; 5]> {
        Ok(self.ready_data().await?.radiation_integrals)
    }

    /// Linear momentum compaction factor.
    pub async fn get_momentum_compaction(&self) -> Result<f64> {
        let data = self.ready_data().await?;
        let [i1, _, _, _, _] = data.radiation_integrals;
        Ok(i1 / data.total_path_length())
    }

    /// Relative energy spread of the equilibrium beam.
    pub async fn get_energy_spread(&self) -> Result<f64> {
        let [_, i2, i3, i4, _] = self.ready_data().await?.radiation_integrals;
        let gamma = self.get_energy() / ELECTRON_REST_ENERGY_EV;
        Ok(gamma * ((C_Q * i3) / ((2.0 * i2) + i4)).sqrt())
    }

    /// Energy loss per turn, in eV.
    pub async fn get_energy_loss(&self) -> Result<f64> {
        let [_, i2, _, _, _] = self.ready_data().await?.radiation_integrals;
        let energy_gev = self.get_energy() / 1e9;
        let u0_gev = (C_GAMMA * i2 * energy_gev.powi(4)) / (2.0 * std::f64::consts::PI);
        Ok(u0_gev * 1e9)
    }

    /// Damping partition numbers of the 3 normal modes.
    pub async fn get_damping_partition_numbers(&self) -> Result<[f64; 3]> {
        let [_, i2, _, i4, _] = self.ready_data().await?.radiation_integrals;
        let jx = 1.0 - (i4 / i2);
        let je = 2.0 + (i4 / i2);
        // Check they sum to 4, don't just assume Jy is 1.
        let jy = 4.0 - (jx + je);
        Ok([jx, jy, je])
    }

    /// Damping times of the 3 normal modes, in seconds.
    ///
    /// [tx, ty, tz] = (2*E0*T0)/(U0*[Jx, Jy, Jz])
    pub async fn get_damping_times(&self) -> Result<[f64; 3]> {
        let e0 = self.get_energy();
        let u0 = self.get_energy_loss().await?;
        let partition = self.get_damping_partition_numbers().await?;
        let t0 = self.get_circumference() / SPEED_OF_LIGHT;
        Ok(partition.map(|j| (2.0 * t0 * e0) / (u0 * j)))
    }

    /// Linear dispersion action ("curly H").
    pub async fn get_linear_dispersion_action(&self) -> Result<f64> {
        let [_, i2, _, _, i5] = self.ready_data().await?.radiation_integrals;
        Ok(i5 / i2)
    }

    /// Horizontal emittance from the radiation integrals, as opposed to the
    /// beam envelope formalism behind [`Simulator::get_emittance`].
    pub async fn get_horizontal_emittance(&self) -> Result<f64> {
        let [_, i2, _, i4, i5] = self.ready_data().await?.radiation_integrals;
        let gamma = self.get_energy() / ELECTRON_REST_ENERGY_EV;
        Ok((i5 * C_Q * gamma.powi(2)) / (i2 - i4))
    }

    // --- pass-through lattice reads (no consistency wait) ---

    /// Beam energy in eV, taken from the lattice attribute.
    pub fn get_energy(&self) -> f64 {
        self.lattice.read().energy()
    }

    pub fn get_circumference(&self) -> f64 {
        self.lattice.read().circumference()
    }

    /// A copy of the element at the given 1-based index.
    pub fn get_element(
        &self,
        index: usize,
    ) -> Result<Element> {
        Ok(self.lattice.read().element(index)?.clone())
    }

    /// A copy of the whole lattice.
    pub fn get_lattice(&self) -> Lattice {
        self.lattice.read().clone()
    }

    /// Read an element attribute directly, with the same field validation
    /// and corrector conversions as the write path.
    pub fn get_element_field(
        &self,
        index: usize,
        field: FieldKind,
    ) -> Result<f64> {
        Ok(self.lattice.read().get_field(index, field)?)
    }

    /// Total bending angle of all the dipoles, in degrees.
    pub fn get_total_bend_angle(&self) -> f64 {
        self.lattice.read().total_bend_angle()
    }

    /// Total absolute bending angle of all the dipoles, in degrees.
    pub fn get_total_absolute_bend_angle(&self) -> f64 {
        self.lattice.read().total_absolute_bend_angle()
    }

    // --- internal ---

    fn push_refresh(&self) -> Result<()> {
        if !self.is_running() {
            return Err(AccessError::WorkerStopped.into());
        }
        {
            let _gate = self.enqueue_gate.lock();
            self.up_to_date.clear();
            self.queue.push(PendingChange::Refresh)?;
        }
        Ok(())
    }
}
