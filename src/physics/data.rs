use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Array3;

use crate::model::OrbitPlane;

/// The set of lattice positions at which derived data is evaluated.
///
/// A boolean mask over `n + 1` points: every element entrance plus the
/// lattice end. The coordinator always evaluates at every point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefPoints(Vec<bool>);

impl RefPoints {
    /// Select every point of a lattice with `n_elements` elements.
    pub fn all(n_elements: usize) -> Self {
        Self(vec![true; n_elements + 1])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_selected(
        &self,
        point: usize,
    ) -> bool {
        self.0.get(point).copied().unwrap_or(false)
    }

    pub fn count_selected(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

/// Per-refpoint linear optics functions.
///
/// All arrays span `n + 1` points; the last row belongs to the lattice end
/// point and is dropped by the per-element views on [`LatticeData`].
#[derive(Debug, Clone, PartialEq)]
pub struct Twiss {
    /// s position of each point, metres
    pub s_pos: Array1<f64>,
    /// Closed orbit, (n+1) x 4: x, px, y, py
    pub closed_orbit: Array2<f64>,
    /// Dispersion, (n+1) x 4: eta x, eta' x, eta y, eta' y
    pub dispersion: Array2<f64>,
    /// Alpha function, (n+1) x 2
    pub alpha: Array2<f64>,
    /// Beta function, (n+1) x 2
    pub beta: Array2<f64>,
    /// Phase advance, (n+1) x 2
    pub mu: Array2<f64>,
    /// One-turn transfer matrix at each point, (n+1) x 6 x 6
    pub m66: Array3<f64>,
}

/// One immutable snapshot of the derived physics data.
///
/// Produced by the engine after each successful recompute and swapped in
/// atomically at the `Arc` level; a previous snapshot stays valid for any
/// reader still holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeData {
    pub twiss: Twiss,
    pub tune: [f64; 2],
    pub chromaticity: [f64; 2],
    /// Transverse emittance pair; `None` when the computation is disabled
    pub emittance: Option<[f64; 2]>,
    /// The 5 synchrotron radiation integrals
    pub radiation_integrals: [f64; 5],
}

impl LatticeData {
    fn n_elements(&self) -> usize {
        self.twiss.s_pos.len().saturating_sub(1)
    }

    /// Fractional part of both tunes; only the fractional digits are
    /// physically observable on the machine.
    pub fn fractional_tunes(&self) -> [f64; 2] {
        [self.tune[0].rem_euclid(1.0), self.tune[1].rem_euclid(1.0)]
    }

    /// s position of every element.
    pub fn s_positions(&self) -> Array1<f64> {
        self.twiss.s_pos.slice(s![..self.n_elements()]).to_owned()
    }

    /// Total path length, taken from the end point.
    pub fn total_path_length(&self) -> f64 {
        self.twiss.s_pos.last().copied().unwrap_or_default()
    }

    /// Closed orbit at every element, all four phase-space coordinates.
    pub fn orbit(&self) -> Array2<f64> {
        self.twiss.closed_orbit.slice(s![..self.n_elements(), ..]).to_owned()
    }

    /// Closed orbit at every element on one phase-space coordinate.
    pub fn orbit_plane(
        &self,
        plane: OrbitPlane,
    ) -> Array1<f64> {
        self.twiss
            .closed_orbit
            .slice(s![..self.n_elements(), plane.cell()])
            .to_owned()
    }

    /// Dispersion at every element, all four phase-space coordinates.
    pub fn dispersion(&self) -> Array2<f64> {
        self.twiss.dispersion.slice(s![..self.n_elements(), ..]).to_owned()
    }

    /// Dispersion at every element on one phase-space coordinate.
    pub fn dispersion_plane(
        &self,
        plane: OrbitPlane,
    ) -> Array1<f64> {
        self.twiss
            .dispersion
            .slice(s![..self.n_elements(), plane.cell()])
            .to_owned()
    }

    pub fn alpha(&self) -> Array2<f64> {
        self.twiss.alpha.slice(s![..self.n_elements(), ..]).to_owned()
    }

    pub fn beta(&self) -> Array2<f64> {
        self.twiss.beta.slice(s![..self.n_elements(), ..]).to_owned()
    }

    pub fn mu(&self) -> Array2<f64> {
        self.twiss.mu.slice(s![..self.n_elements(), ..]).to_owned()
    }

    pub fn m66(&self) -> Array3<f64> {
        self.twiss.m66.slice(s![..self.n_elements(), .., ..]).to_owned()
    }
}
