//! The mutable lattice model and its fixed field enumerations.
//!
//! ## Key Responsibilities
//! - Element records (field strengths, kick angles, RF frequency) with the
//!   combined-function corrector conversions
//! - The tagged-variant [`FieldKind`] dispatcher replacing string-keyed
//!   handler lookup, validated eagerly at submission time
//! - Plane selectors for the typed read accessors

mod element;
mod field;
mod lattice;

pub use element::*;
pub use field::*;
pub use lattice::*;
