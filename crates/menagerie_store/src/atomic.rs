//! # Atomic Transactions
//!
//! Optimistic read-modify-write over versioned records.
//!
//! Every committed write stamps its record with a fresh version drawn from a
//! store-global counter, so a record deleted and recreated between a read and
//! its commit still fails validation (no ABA). Version checks and write
//! application happen together under the store's write lock, which makes the
//! set of committed transactions serializable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::record::RecordKey;

/// Retry behavior for conflicting commits.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Attempts before a transaction surfaces as [`StoreError::Contended`].
    pub max_attempts: u32,
    /// Backoff before the second attempt, in microseconds.
    pub base_backoff_us: u64,
    /// Backoff ceiling, in microseconds.
    pub max_backoff_us: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 32,
            base_backoff_us: 50,
            max_backoff_us: 2_000,
        }
    }
}

struct Slot<D> {
    version: u64,
    doc: D,
}

/// A staged write inside a transaction.
enum Write<D> {
    Put(D),
    Delete,
}

struct ReadEntry<D> {
    version: u64,
    doc: Option<D>,
}

/// Versioned in-memory record store.
///
/// Cloning the document type in and out keeps the map the single owner of
/// committed state; nothing outside the store holds a reference into it.
pub struct AtomicStore<D> {
    slots: RwLock<HashMap<RecordKey, Slot<D>>>,
    next_version: AtomicU64,
    retry: RetryPolicy,
}

impl<D: Clone> AtomicStore<D> {
    /// Creates an empty store with the default [`RetryPolicy`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_retry(RetryPolicy::default())
    }

    /// Creates an empty store with an explicit retry policy.
    #[must_use]
    pub fn with_retry(retry: RetryPolicy) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            next_version: AtomicU64::new(0),
            retry,
        }
    }

    /// Reads the committed state of a single record.
    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<D> {
        self.slots.read().get(key).map(|slot| slot.doc.clone())
    }

    /// Reads the committed state of every record in a collection.
    ///
    /// Order is unspecified; callers sort by their own fields.
    #[must_use]
    pub fn list(&self, kind: &'static str) -> Vec<D> {
        self.slots
            .read()
            .iter()
            .filter(|(key, _)| key.kind() == kind)
            .map(|(_, slot)| slot.doc.clone())
            .collect()
    }

    /// Runs `op` as an atomic read-modify-write transaction.
    ///
    /// The closure reads records through [`Txn::get`] and stages writes with
    /// [`Txn::put`] / [`Txn::delete`]. On commit, the version of every record
    /// the closure read is validated; if any changed, the attempt is discarded
    /// and `op` reruns against fresh state after a backoff. A business `Err`
    /// from `op` aborts immediately with no writes applied.
    ///
    /// # Errors
    ///
    /// Returns whatever `op` returns, or `StoreError::Contended` (through
    /// `E::from`) once every attempt has lost its commit race.
    pub fn run_atomic<T, E, F>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(&mut Txn<'_, D>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut backoff_us = self.retry.base_backoff_us;
        for attempt in 1..=self.retry.max_attempts {
            let mut txn = Txn {
                store: self,
                reads: HashMap::new(),
                writes: HashMap::new(),
            };
            let out = op(&mut txn)?;
            if self.try_commit(&txn) {
                return Ok(out);
            }
            tracing::trace!(attempt, "transaction lost its commit race, retrying");
            thread::sleep(Duration::from_micros(backoff_us));
            backoff_us = (backoff_us.saturating_mul(2)).min(self.retry.max_backoff_us);
        }
        Err(StoreError::Contended {
            attempts: self.retry.max_attempts,
        }
        .into())
    }

    /// Validates the read set and applies the write set, all under the write
    /// lock. Returns `false` when any read record has moved on.
    fn try_commit(&self, txn: &Txn<'_, D>) -> bool {
        let mut slots = self.slots.write();
        for (key, read) in &txn.reads {
            let current = slots.get(key).map_or(0, |slot| slot.version);
            if current != read.version {
                return false;
            }
        }
        for (key, write) in &txn.writes {
            match write {
                Write::Put(doc) => {
                    let version = self.next_version.fetch_add(1, Ordering::Relaxed) + 1;
                    slots.insert(
                        key.clone(),
                        Slot {
                            version,
                            doc: doc.clone(),
                        },
                    );
                }
                Write::Delete => {
                    slots.remove(key);
                }
            }
        }
        true
    }
}

impl<D: Clone> Default for AtomicStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// One attempt of an atomic transaction.
///
/// Reads are cached: repeated [`Txn::get`] calls for the same key observe the
/// same committed state for the whole attempt, and staged writes are visible
/// to later reads within the transaction.
pub struct Txn<'s, D> {
    store: &'s AtomicStore<D>,
    reads: HashMap<RecordKey, ReadEntry<D>>,
    writes: HashMap<RecordKey, Write<D>>,
}

impl<D: Clone> Txn<'_, D> {
    /// Reads a record, recording its committed version for commit validation.
    #[must_use]
    pub fn get(&mut self, key: &RecordKey) -> Option<D> {
        if let Some(write) = self.writes.get(key) {
            return match write {
                Write::Put(doc) => Some(doc.clone()),
                Write::Delete => None,
            };
        }
        if let Some(read) = self.reads.get(key) {
            return read.doc.clone();
        }
        let (version, doc) = self
            .store
            .slots
            .read()
            .get(key)
            .map_or((0, None), |slot| (slot.version, Some(slot.doc.clone())));
        self.reads.insert(
            key.clone(),
            ReadEntry {
                version,
                doc: doc.clone(),
            },
        );
        doc
    }

    /// Stages a full overwrite of a record.
    pub fn put(&mut self, key: RecordKey, doc: D) {
        self.writes.insert(key, Write::Put(doc));
    }

    /// Stages a record deletion.
    pub fn delete(&mut self, key: RecordKey) {
        self.writes.insert(key, Write::Delete);
    }
}
