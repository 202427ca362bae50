//! # Reward Orchestration
//!
//! Composes the registry, the catalog and the inventory ledger into the three
//! grant pipelines: code redemption, first-login welcome, and evaluation
//! rewards.
//!
//! The code pipeline runs validate -> resolve -> mint -> deposit ->
//! mark-claimed, in that order. The final bookkeeping commit is best-effort:
//! by the time it runs the player already holds the grant, and an
//! inconsistent registry beats a revoked reward. A failure there is logged
//! and swallowed; under repeated transient failures one player can therefore
//! redeem a code more than once, while a duplicate `claimed_by` entry stays
//! impossible.

use std::sync::Arc;

use menagerie_catalog::{IdSource, MonsterProvider};

use crate::codes::CodeRegistry;
use crate::error::{LedgerError, LedgerResult};
use crate::inventory::InventoryLedger;
use crate::types::{GrantReason, MonsterInstance, PlayerId, PlayerRecord};

/// Composition of the grant pipelines.
#[derive(Clone)]
pub struct RewardOrchestrator {
    ledger: InventoryLedger,
    codes: CodeRegistry,
    provider: Arc<dyn MonsterProvider>,
    ids: Arc<dyn IdSource>,
}

impl RewardOrchestrator {
    /// Wires the orchestrator over its collaborators.
    #[must_use]
    pub fn new(
        ledger: InventoryLedger,
        codes: CodeRegistry,
        provider: Arc<dyn MonsterProvider>,
        ids: Arc<dyn IdSource>,
    ) -> Self {
        Self {
            ledger,
            codes,
            provider,
            ids,
        }
    }

    /// Redeems `code` for `player`: the minted instance lands in the inbox
    /// tagged `code` and is returned even when the final claim bookkeeping
    /// fails (logged, not surfaced).
    ///
    /// # Errors
    ///
    /// [`LedgerError::CodeNotFound`] / [`LedgerError::CodeExpired`] /
    /// [`LedgerError::AlreadyClaimed`] from validation,
    /// [`LedgerError::TemplateNotFound`] when the catalog no longer carries
    /// the granted template, [`LedgerError::PlayerNotFound`] when the player
    /// is absent, [`LedgerError::Store`] on contention during the deposit.
    pub fn grant_from_code(
        &self,
        player: &PlayerId,
        code: &str,
        now: u64,
    ) -> LedgerResult<MonsterInstance> {
        let template_id = self.codes.validate_for_player(code, player, now)?;
        let template = self
            .provider
            .resolve(&template_id)
            .ok_or_else(|| LedgerError::TemplateNotFound(template_id.clone()))?;
        let minted =
            MonsterInstance::mint(&template, self.ids.next_id(), Some(GrantReason::Code));
        self.ledger.deposit_to_inbox(player, minted.clone())?;

        if let Err(error) = self.codes.mark_claimed(code, player) {
            // The grant already happened; losing this write must never
            // revoke it.
            tracing::warn!(code, player = %player, %error, "claim bookkeeping failed after grant");
        }
        Ok(minted)
    }

    /// Fetches the player, creating the record on first login with one
    /// random welcome monster in the inbox. Later calls return the existing
    /// record unchanged.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on store contention.
    pub fn ensure_player(&self, player: &PlayerId, name: &str) -> LedgerResult<PlayerRecord> {
        if let Some(existing) = self.ledger.player(player) {
            return Ok(existing);
        }
        let template = self.provider.random_by_weighted_rarity();
        let welcome =
            MonsterInstance::mint(&template, self.ids.next_id(), Some(GrantReason::Welcome));
        // A racing registration wins harmlessly: the welcome instance is
        // then discarded without entering anyone's records.
        self.ledger.register_player(player, name, Some(welcome))
    }

    /// Grants one random monster per evaluation id not rewarded before and
    /// records each id. Ids already rewarded - in this call or any earlier
    /// one - grant nothing. Returns the instances actually deposited.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the player is absent,
    /// [`LedgerError::Store`] on contention.
    pub fn reward_evaluations(
        &self,
        player: &PlayerId,
        evaluations: &[u64],
    ) -> LedgerResult<Vec<MonsterInstance>> {
        let current = self
            .ledger
            .player(player)
            .ok_or_else(|| LedgerError::PlayerNotFound(player.clone()))?;

        let mut grants = Vec::new();
        let mut seen = current.granted_evaluations.clone();
        for &evaluation in evaluations {
            if seen.insert(evaluation) {
                let template = self.provider.random_by_weighted_rarity();
                grants.push((
                    evaluation,
                    MonsterInstance::mint(&template, self.ids.next_id(), Some(GrantReason::Eval)),
                ));
            }
        }
        if grants.is_empty() {
            return Ok(Vec::new());
        }
        // The deposit re-checks every id transactionally; this pre-filter
        // only avoids minting ids that are obviously already granted.
        self.ledger.deposit_evaluation_rewards(player, &grants)
    }
}
