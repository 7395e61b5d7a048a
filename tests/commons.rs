//! Shared fixtures for the integration tests: a small demo ring and a
//! deterministic stand-in physics engine driven through the public API only.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Array3;

use latsim::ComputationError;
use latsim::Element;
use latsim::ElementKind;
use latsim::Lattice;
use latsim::LatticeData;
use latsim::PhysicsEngine;
use latsim::RefPoints;
use latsim::Twiss;

pub fn demo_ring() -> Lattice {
    let elements = vec![
        Element::new(1, "BB1", ElementKind::Dipole, 0.95).with_bending_angle(0.196_349),
        Element::new(2, "Q1", ElementKind::Quadrupole, 0.4).with_polynom_b(1, 1.2),
        Element::new(3, "S1", ElementKind::Sextupole, 0.29).with_polynom_b(2, 6.0),
        Element::new(4, "HV1", ElementKind::Corrector, 0.1),
        Element::new(5, "RF1", ElementKind::RfCavity, 0.3).with_frequency(499.65e6),
        Element::new(6, "D1", ElementKind::Drift, 1.0),
    ];
    Lattice::new(elements, 3.0e9)
}

/// Deterministic engine: the tune tracks the quadrupole strengths, so a
/// queued setpoint change is observable through the accessors.
pub struct DemoEngine {
    calls: AtomicUsize,
    fail_next: Mutex<Option<String>>,
}

impl DemoEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prime the next compute call to fail; consumed on use.
    pub fn fail_next(
        &self,
        message: &str,
    ) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }
}

impl PhysicsEngine for DemoEngine {
    fn compute(
        &self,
        lattice: &Lattice,
        refpts: &RefPoints,
        disable_emittance: bool,
    ) -> Result<LatticeData, ComputationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(ComputationError::Transient(message));
        }

        let n = lattice.len();
        assert_eq!(refpts.len(), n + 1);

        let b1_sum: f64 = lattice
            .iter()
            .map(|e| e.polynom_b.get(1).copied().unwrap_or_default())
            .sum();

        let mut s = 0.0;
        let mut s_pos = Vec::with_capacity(n + 1);
        s_pos.push(0.0);
        for element in lattice.iter() {
            s += element.length;
            s_pos.push(s);
        }

        Ok(LatticeData {
            twiss: Twiss {
                s_pos: Array1::from_vec(s_pos),
                closed_orbit: Array2::zeros((n + 1, 4)),
                dispersion: Array2::zeros((n + 1, 4)),
                alpha: Array2::from_elem((n + 1, 2), 0.1),
                beta: Array2::from_elem((n + 1, 2), 10.0),
                mu: Array2::zeros((n + 1, 2)),
                m66: Array3::from_shape_fn((n + 1, 6, 6), |(_, r, c)| if r == c { 1.0 } else { 0.0 }),
            },
            tune: [0.27 + 0.01 * b1_sum, 0.36 - 0.005 * b1_sum],
            chromaticity: [1.7, 2.1],
            emittance: (!disable_emittance).then_some([2.7e-9, 8.0e-12]),
            radiation_integrals: [5.9e-3, 1.6e-3, 2.5e-4, 1.1e-4, 6.8e-5],
        })
    }
}
