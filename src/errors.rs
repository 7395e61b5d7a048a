//! Optics Coordinator Error Hierarchy
//!
//! Defines the error types for the recalculation coordinator, categorized by
//! the layer they originate from: model field access, derived-data access,
//! physics computation and configuration.

use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Field lookups against the fixed model enumerations
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Derived-data read failures
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Physics engine failures
    #[error(transparent)]
    Computation(#[from] ComputationError),

    /// Unrecoverable failures requiring coordinator termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Errors raised when a requested field is not part of the coordinator's
/// fixed enumeration, on both the read and the write path.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// The element does not carry the requested attribute
    #[error("Element {index} ({kind}) has no field '{field}'")]
    UnknownField {
        index: usize,
        kind: &'static str,
        field: String,
    },

    /// A control-system field name that maps to no known field kind
    #[error("'{0}' is not a recognised field name")]
    UnknownFieldName(String),

    /// A plane selector outside the fixed enumeration
    #[error("Field '{field}' is not a valid {target} plane")]
    UnknownPlane { field: String, target: &'static str },

    /// Polynomial cell beyond the element's coefficient array
    #[error("Polynom cell {cell} out of range for element {index} (len {len})")]
    CellOutOfRange { index: usize, cell: usize, len: usize },

    /// Element index outside the lattice
    #[error("Element index {index} out of range (lattice length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by the typed read accessors.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Consistency wait exceeded its bound under strict read policy
    #[error("Derived data still stale after {timeout:?}")]
    StaleData { timeout: Duration },

    /// Emittance accessor requested with emittance computation disabled
    #[error("Emittance calculations not enabled on this simulator")]
    EmittanceDisabled,

    /// Enqueue or trigger against a terminated worker
    #[error("Recalculation worker is not running")]
    WorkerStopped,
}

/// Two-severity error channel for the physics engine call.
///
/// Transient failures are downgraded to warnings inside the worker and the
/// loop continues; fatal failures indicate a broken collaborator contract and
/// terminate the worker.
#[derive(Debug, thiserror::Error)]
pub enum ComputationError {
    /// A cycle failed; last-known-good data is retained
    #[error("Optics computation failed: {0}")]
    Transient(String),

    /// The engine violated its contract; should never happen
    #[error("Physics engine contract violation: {0}")]
    Fatal(String),

    /// The blocking computation task was cancelled or panicked
    #[error("Computation task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl ComputationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ComputationError::Transient(_))
    }
}
