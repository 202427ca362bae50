//! # Unique Id Minting
//!
//! Instance ids must never repeat and never be reassigned, so the source of
//! ids is an injected capability rather than an inline timestamp hack. The
//! production source draws 128 random bits; tests inject the sequential one
//! and get stable, readable ids.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Collision-resistant unique-identifier source.
pub trait IdSource: Send + Sync {
    /// Mints the next identifier. Every call returns a distinct value.
    fn next_id(&self) -> String;
}

/// Production id source: 128 random bits as 32 hex characters.
pub struct RandomIdSource {
    rng: Mutex<StdRng>,
}

impl RandomIdSource {
    /// Creates a source seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a reproducible source. Collision resistance still holds
    /// within one source; two sources with one seed mint the same ids.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomIdSource {
    fn next_id(&self) -> String {
        let mut rng = self.rng.lock();
        format!("{:016x}{:016x}", rng.gen::<u64>(), rng.gen::<u64>())
    }
}

/// Deterministic id source for tests: `"{prefix}-0001"`, `"{prefix}-0002"`, ...
pub struct SequentialIdSource {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdSource {
    /// Creates a source that counts up from 1 under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n:04}", self.prefix)
    }
}
