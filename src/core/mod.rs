//! The recalculation coordinator.
//!
//! ## Key Responsibilities
//! - Order concurrent mutation intents through the FIFO change queue
//! - Keep the shared lattice and its derived data consistent via a single
//!   background worker
//! - Publish immutable derived-data snapshots with one atomic swap
//! - Give callers a bounded way to wait for read-after-write consistency
//!
//! ## Relationship Between `Simulator` and `RecalculationWorker`
//! The [`Simulator`] is the only public surface: foreground callers enqueue
//! intents and read snapshots through it and never touch the lattice
//! directly. The worker is the single writer; it drains the queue, applies
//! each change and republishes the derived data through the engine. This
//! keeps all mutation on one task while reads stay lock-free.

mod builder;
mod change_queue;
mod signals;
mod simulator;
mod worker;

pub use builder::*;
pub use change_queue::PendingChange;
pub use simulator::*;
pub use worker::RecalcCallback;

pub(crate) use change_queue::*;
pub(crate) use signals::*;
pub(crate) use worker::*;
