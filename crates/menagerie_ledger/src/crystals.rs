//! # Crystal Accrual
//!
//! Converts externally tracked presence hours into currency. The reported
//! value is cumulative hours since the player's epoch; the engine pays out
//! only the delta above the stored checkpoint, so the same elapsed interval
//! can never be counted twice, and a cooldown keeps clients from polling the
//! expensive upstream on every page load.

use std::sync::Arc;

use crate::error::{LedgerError, LedgerResult};
use crate::inventory::load_player;
use crate::types::{keys, LedgerStore, PlayerId, Record};

/// Accrual tuning.
#[derive(Clone, Copy, Debug)]
pub struct AccrualConfig {
    /// Minimum seconds between accrual attempts for one player.
    pub cooldown_secs: u64,
    /// Crystals granted per tracked hour.
    pub crystals_per_hour: f64,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 3_600,
            crystals_per_hour: 1.0,
        }
    }
}

/// What one accrual attempt produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// Crystals granted by this attempt.
    pub earned: u64,
    /// Balance after the grant.
    pub balance: u64,
}

/// Handle over the store for crystal accrual.
#[derive(Clone)]
pub struct AccrualEngine {
    store: Arc<LedgerStore>,
    config: AccrualConfig,
}

impl AccrualEngine {
    /// Creates an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>, config: AccrualConfig) -> Self {
        Self { store, config }
    }

    /// Applies one accrual attempt for `player`.
    ///
    /// `total_elapsed_hours` is the cumulative tracked-hours figure reported
    /// by the presence collaborator; `now` is epoch seconds. The whole
    /// attempt - delta, payout, checkpoint, attempt timestamp - is one
    /// transaction, so two concurrent attempts serialize: the loser re-reads
    /// and lands on the cooldown gate instead of double-paying one delta.
    ///
    /// A reported value at or below the checkpoint earns nothing and leaves
    /// the checkpoint where it was, which also absorbs replays of an older
    /// figure. Fractional hours earn no fragment but stay in the checkpoint
    /// and count toward the next delta.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the player is absent,
    /// [`LedgerError::Throttled`] inside the cooldown window (nothing is
    /// mutated), [`LedgerError::Store`] on contention.
    pub fn accrue(
        &self,
        player_id: &PlayerId,
        total_elapsed_hours: f64,
        now: u64,
    ) -> LedgerResult<AccrualOutcome> {
        self.store.run_atomic(|txn| {
            let mut player = load_player(txn, player_id)?;

            if let Some(last) = player.last_accrual_at {
                let ready_at = last.saturating_add(self.config.cooldown_secs);
                if now < ready_at {
                    return Err(LedgerError::Throttled {
                        wait_secs: ready_at - now,
                    });
                }
            }

            // A non-finite report is upstream garbage; treat it as no gain.
            let gained = if total_elapsed_hours.is_finite() {
                total_elapsed_hours - player.accrual_checkpoint_hours
            } else {
                0.0
            };

            let earned = if gained > 0.0 {
                player.accrual_checkpoint_hours = total_elapsed_hours;
                (gained * self.config.crystals_per_hour).floor() as u64
            } else {
                0
            };

            player.crystals = player.crystals.saturating_add(earned);
            player.last_accrual_at = Some(now);

            let outcome = AccrualOutcome {
                earned,
                balance: player.crystals,
            };
            txn.put(keys::player(player_id), Record::Player(player));
            Ok(outcome)
        })
    }
}
