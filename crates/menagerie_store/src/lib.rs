//! # Menagerie Record Store
//!
//! Serializable atomic read-modify-write over a named record set.
//!
//! The rest of the workspace treats persistence as an external capability
//! with exactly one contract: [`AtomicStore::run_atomic`] runs a closure that
//! reads and conditionally writes one or more records, all-or-nothing, with
//! automatic retry when a concurrent commit touches the same records. Any
//! backend offering optimistic-concurrency retry or row locks can stand in;
//! this crate ships the in-memory realization used in production-shaped tests.
//!
//! ## Guarantees
//!
//! 1. **Atomicity** - a committed transaction applies every staged write;
//!    an aborted one applies none
//! 2. **Serializability** - commit validates the version of every record the
//!    closure read, under the store's write lock
//! 3. **Bounded retry** - conflicting commits are retried with exponential
//!    backoff up to [`RetryPolicy::max_attempts`], then surface as
//!    [`StoreError::Contended`]

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod atomic;
pub mod error;
pub mod record;

pub use atomic::{AtomicStore, RetryPolicy, Txn};
pub use error::StoreError;
pub use record::RecordKey;
