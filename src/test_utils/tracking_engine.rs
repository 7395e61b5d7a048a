use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Array3;
use parking_lot::Mutex;

use crate::model::Lattice;
use crate::physics::LatticeData;
use crate::physics::PhysicsEngine;
use crate::physics::RefPoints;
use crate::physics::Twiss;
use crate::ComputationError;

/// Deterministic stand-in for the wrapped numerics library.
///
/// Derives every output from the current lattice attributes, so a queued
/// setpoint change is observable through the accessors, counts its
/// invocations and can be primed to fail exactly once.
pub struct TrackingEngine {
    calls: AtomicUsize,
    fail_next: Mutex<Option<ComputationError>>,
}

impl TrackingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prime the next `compute` call to fail with `error`; consumed on use.
    pub fn fail_next(
        &self,
        error: ComputationError,
    ) {
        *self.fail_next.lock() = Some(error);
    }
}

impl PhysicsEngine for TrackingEngine {
    fn compute(
        &self,
        lattice: &Lattice,
        refpts: &RefPoints,
        disable_emittance: bool,
    ) -> std::result::Result<LatticeData, ComputationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        Ok(synthetic_data(lattice, refpts, disable_emittance))
    }
}

/// Folds every mutable attribute into one scalar so that any applied change
/// shifts the synthetic outputs.
fn state_checksum(lattice: &Lattice) -> f64 {
    lattice
        .iter()
        .map(|e| {
            e.polynom_a.iter().sum::<f64>()
                + e.polynom_b.iter().sum::<f64>()
                + e.kick_angle[0]
                + e.kick_angle[1]
                + e.bending_angle
                + e.frequency * 1.0e-9
        })
        .sum()
}

pub fn synthetic_data(
    lattice: &Lattice,
    refpts: &RefPoints,
    disable_emittance: bool,
) -> LatticeData {
    assert_eq!(refpts.len(), lattice.len() + 1, "refpts must cover every point");

    let n = lattice.len();
    let checksum = state_checksum(lattice);

    let mut s = 0.0;
    let mut s_pos = Vec::with_capacity(n + 1);
    s_pos.push(0.0);
    for element in lattice.iter() {
        s += element.length;
        s_pos.push(s);
    }

    let closed_orbit = Array2::from_shape_fn((n + 1, 4), |(i, j)| 1.0e-6 * (i as f64) * (j as f64 + 1.0));
    let dispersion = Array2::from_shape_fn((n + 1, 4), |(i, j)| 1.0e-3 * ((i + j) as f64));
    let alpha = Array2::from_elem((n + 1, 2), 0.1);
    let beta = Array2::from_shape_fn((n + 1, 2), |(i, j)| 10.0 + (i as f64) + (j as f64));
    let mu = Array2::from_shape_fn((n + 1, 2), |(i, j)| 0.5 * (i as f64) + (j as f64));
    let m66 = Array3::from_shape_fn((n + 1, 6, 6), |(_, r, c)| if r == c { 1.0 } else { 0.0 });

    LatticeData {
        twiss: Twiss {
            s_pos: Array1::from_vec(s_pos),
            closed_orbit,
            dispersion,
            alpha,
            beta,
            mu,
            m66,
        },
        tune: [0.275 + 0.0137 * checksum, 0.362 - 0.0091 * checksum],
        chromaticity: [1.7 + 0.1 * checksum, 2.1 - 0.05 * checksum],
        emittance: (!disable_emittance).then_some([2.7e-9, 8.0e-12]),
        radiation_integrals: [
            5.9e-3,
            1.6e-3 * (1.0 + 0.01 * checksum.abs()),
            2.5e-4,
            1.1e-4,
            6.8e-5,
        ],
    }
}
