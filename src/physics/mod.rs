//! The seam to the wrapped numerics library.
//!
//! The coordinator never implements any physics itself: everything it knows
//! about optics arrives through the [`PhysicsEngine`] trait as one opaque,
//! synchronous, CPU-bound call returning a complete [`LatticeData`]
//! snapshot. Failures cross the seam on the two-severity
//! [`ComputationError`](crate::ComputationError) channel.

mod data;

pub use data::*;

#[cfg(test)]
mod data_test;

#[cfg(test)]
use mockall::automock;

use crate::model::Lattice;
use crate::ComputationError;

#[cfg_attr(test, automock)]
pub trait PhysicsEngine: Send + Sync + 'static {
    /// Evaluate the derived optics data of `lattice` at `refpts`.
    ///
    /// Called by the worker on a cloned lattice snapshot, off the async
    /// runtime. A `Transient` error loses this cycle only; a `Fatal` error
    /// declares the engine broken and stops the coordinator.
    fn compute(
        &self,
        lattice: &Lattice,
        refpts: &RefPoints,
        disable_emittance: bool,
    ) -> std::result::Result<LatticeData, ComputationError>;
}
