//! # Claim Code Registry
//!
//! Redemption codes are single-use per player. The per-(code, player) state
//! machine has one transition, `Unclaimed -> Claimed`, and no way back.
//!
//! Validation and claiming are deliberately separate operations: the grant
//! pipeline does its expensive work (minting, inbox deposit) between them and
//! commits "this player used this code" as a minimal atomic step at the very
//! end, shrinking the race window. The commit re-checks membership itself -
//! it never trusts a validation that ran earlier.

use std::collections::BTreeSet;
use std::sync::Arc;

use menagerie_catalog::TemplateId;

use crate::error::{LedgerError, LedgerResult};
use crate::types::{keys, CodeRecord, LedgerStore, PlayerId, Record};

/// Handle over the store for claim-code lifecycle.
#[derive(Clone)]
pub struct CodeRegistry {
    store: Arc<LedgerStore>,
}

impl CodeRegistry {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Uppercases and trims a user-entered code.
    #[must_use]
    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Creates a code if absent. An existing code is left untouched - no
    /// expiry reset, no `claimed_by` wipe - so bootstrap can run repeatedly.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on store contention.
    pub fn create(&self, code: &str, template: TemplateId, expires_at: u64) -> LedgerResult<()> {
        let normalized = Self::normalize(code);
        self.store.run_atomic(|txn| {
            let key = keys::code(&normalized);
            if txn.get(&key).is_none() {
                txn.put(
                    key,
                    Record::Code(CodeRecord {
                        template: template.clone(),
                        expires_at,
                        claimed_by: BTreeSet::new(),
                    }),
                );
            }
            Ok(())
        })
    }

    /// Case-insensitive code lookup.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<CodeRecord> {
        self.store
            .get(&keys::code(&Self::normalize(code)))
            .and_then(Record::into_code)
    }

    /// Checks that `player` may redeem `code` right now and resolves what it
    /// grants. Read-only: a passing validation reserves nothing.
    ///
    /// # Errors
    ///
    /// [`LedgerError::CodeNotFound`], [`LedgerError::CodeExpired`] when `now`
    /// is past expiry, [`LedgerError::AlreadyClaimed`] when this player has
    /// redeemed the code before.
    pub fn validate_for_player(
        &self,
        code: &str,
        player: &PlayerId,
        now: u64,
    ) -> LedgerResult<TemplateId> {
        let normalized = Self::normalize(code);
        let record = self
            .lookup(&normalized)
            .ok_or_else(|| LedgerError::CodeNotFound(normalized.clone()))?;
        if now > record.expires_at {
            return Err(LedgerError::CodeExpired {
                code: normalized,
                expired_at: record.expires_at,
            });
        }
        if record.claimed_by.contains(player) {
            return Err(LedgerError::AlreadyClaimed { code: normalized });
        }
        Ok(record.template)
    }

    /// Commits `player`'s use of `code`: re-reads the record, re-checks
    /// membership and appends, all in one transaction. The re-check is what
    /// loses the race cleanly when two redemptions of one code interleave.
    ///
    /// # Errors
    ///
    /// [`LedgerError::CodeNotFound`], [`LedgerError::AlreadyClaimed`] when
    /// the membership race was lost, [`LedgerError::Store`] on contention.
    pub fn mark_claimed(&self, code: &str, player: &PlayerId) -> LedgerResult<()> {
        let normalized = Self::normalize(code);
        self.store.run_atomic(|txn| {
            let key = keys::code(&normalized);
            let mut record = txn
                .get(&key)
                .and_then(Record::into_code)
                .ok_or_else(|| LedgerError::CodeNotFound(normalized.clone()))?;
            if !record.claimed_by.insert(player.clone()) {
                return Err(LedgerError::AlreadyClaimed {
                    code: normalized.clone(),
                });
            }
            txn.put(key, Record::Code(record));
            Ok(())
        })
    }
}
