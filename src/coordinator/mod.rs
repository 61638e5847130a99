//! Work-distribution and locking core.
//!
//! Partitions the remote item stream into exclusive batches per operator
//! session and sequences the fetch, generate, decide, persist, advance
//! lifecycle for each item. [`LockTable`] provides mutual exclusion with
//! timeout recovery; [`fill_batch`](assembler::fill_batch) claims the next
//! run of workable items; [`recorder`] applies decisions;
//! [`CoordinatorService`] ties them together behind the operator-facing API.

pub mod assembler;
pub mod cursor;
pub mod locks;
pub mod recorder;
pub mod service;

pub use assembler::{AssemblerConfig, FillOutcome};
pub use cursor::{Batch, BatchItem, SessionCursor, SessionStats};
pub use locks::LockTable;
pub use recorder::{DecideOutcome, Decision};
pub use service::{CoordinatorService, ItemView, NextItem};
