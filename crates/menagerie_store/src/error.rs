//! # Store Error Types

use thiserror::Error;

/// Errors surfaced by the record store.
///
/// Contention is the only failure mode of the in-memory realization; it is
/// transient by definition and always safe to retry at the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Every retry attempt lost its commit race.
    #[error("record store contended: gave up after {attempts} attempts")]
    Contended {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}
