//! # Service Facade
//!
//! The composition root the transport layer talks to. One struct owns the
//! store and every engine component; methods mirror the request/response
//! contract of the HTTP collaborator, transport-agnostic.

use std::sync::Arc;

use menagerie_catalog::{IdSource, MonsterProvider, TemplateId};

use crate::codes::CodeRegistry;
use crate::crystals::{AccrualConfig, AccrualEngine, AccrualOutcome};
use crate::error::LedgerResult;
use crate::gift::{GiftBroker, RECENT_GIFT_LIMIT};
use crate::inventory::InventoryLedger;
use crate::rewards::RewardOrchestrator;
use crate::types::{
    keys, GiftRecord, InstanceId, LedgerStore, MonsterInstance, PlayerId, PlayerRecord, Record,
};

/// The assembled inventory transaction engine.
pub struct MenagerieService {
    store: Arc<LedgerStore>,
    ledger: InventoryLedger,
    codes: CodeRegistry,
    gifts: GiftBroker,
    crystals: AccrualEngine,
    rewards: RewardOrchestrator,
}

impl MenagerieService {
    /// Assembles the engine with default accrual tuning.
    #[must_use]
    pub fn new(provider: Arc<dyn MonsterProvider>, ids: Arc<dyn IdSource>) -> Self {
        Self::with_config(provider, ids, AccrualConfig::default())
    }

    /// Assembles the engine with explicit accrual tuning.
    #[must_use]
    pub fn with_config(
        provider: Arc<dyn MonsterProvider>,
        ids: Arc<dyn IdSource>,
        accrual: AccrualConfig,
    ) -> Self {
        let store = Arc::new(LedgerStore::new());
        let ledger = InventoryLedger::new(Arc::clone(&store));
        let codes = CodeRegistry::new(Arc::clone(&store));
        let gifts = GiftBroker::new(Arc::clone(&store), Arc::clone(&ids));
        let crystals = AccrualEngine::new(Arc::clone(&store), accrual);
        let rewards = RewardOrchestrator::new(ledger.clone(), codes.clone(), provider, ids);
        Self {
            store,
            ledger,
            codes,
            gifts,
            crystals,
            rewards,
        }
    }

    // ------------------------------------------------------------------
    // Login & player reads
    // ------------------------------------------------------------------

    /// Fetches or creates the player; first login grants a welcome monster.
    ///
    /// # Errors
    ///
    /// See [`RewardOrchestrator::ensure_player`].
    pub fn ensure_player(&self, player: &PlayerId, name: &str) -> LedgerResult<PlayerRecord> {
        self.rewards.ensure_player(player, name)
    }

    /// Grants rewards for newly observed evaluations, exactly once per id.
    ///
    /// # Errors
    ///
    /// See [`RewardOrchestrator::reward_evaluations`].
    pub fn reward_evaluations(
        &self,
        player: &PlayerId,
        evaluations: &[u64],
    ) -> LedgerResult<Vec<MonsterInstance>> {
        self.rewards.reward_evaluations(player, evaluations)
    }

    /// Reads one player record, normalized. `None` when absent.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<PlayerRecord> {
        self.ledger.player(id)
    }

    /// Finds a player id by exact display name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.store
            .list(keys::PLAYERS)
            .into_iter()
            .filter_map(Record::into_player)
            .find(|player| player.name == name)
            .map(|player| player.id)
    }

    // ------------------------------------------------------------------
    // Codes
    // ------------------------------------------------------------------

    /// Bootstrap: registers a claim code if absent (idempotent).
    ///
    /// # Errors
    ///
    /// See [`CodeRegistry::create`].
    pub fn create_code(
        &self,
        code: &str,
        template: TemplateId,
        expires_at: u64,
    ) -> LedgerResult<()> {
        self.codes.create(code, template, expires_at)
    }

    /// Redeems a claim code; the minted instance lands in the inbox.
    ///
    /// # Errors
    ///
    /// See [`RewardOrchestrator::grant_from_code`].
    pub fn grant_from_code(
        &self,
        player: &PlayerId,
        code: &str,
        now: u64,
    ) -> LedgerResult<MonsterInstance> {
        self.rewards.grant_from_code(player, code, now)
    }

    // ------------------------------------------------------------------
    // Gifts
    // ------------------------------------------------------------------

    /// Transfers one owned instance into another player's inbox.
    ///
    /// # Errors
    ///
    /// See [`GiftBroker::gift`].
    pub fn send_gift(
        &self,
        sender: &PlayerId,
        recipient: &PlayerId,
        instance: &InstanceId,
        now: u64,
    ) -> LedgerResult<GiftRecord> {
        self.gifts.gift(sender, recipient, instance, now)
    }

    /// The recipient's most recent gift audit entries, newest first.
    #[must_use]
    pub fn recent_gifts(&self, recipient: &PlayerId) -> Vec<GiftRecord> {
        self.gifts.recent_for(recipient, RECENT_GIFT_LIMIT)
    }

    /// Removes one gift audit entry; absent entries are a no-op.
    ///
    /// # Errors
    ///
    /// See [`GiftBroker::dismiss`].
    pub fn dismiss_gift(&self, gift_id: &str) -> LedgerResult<()> {
        self.gifts.dismiss(gift_id)
    }

    // ------------------------------------------------------------------
    // Inbox promotion
    // ------------------------------------------------------------------

    /// Claims one pending instance into the permanent collection.
    ///
    /// # Errors
    ///
    /// See [`InventoryLedger::promote_one`].
    pub fn claim_one(&self, player: &PlayerId, instance: &InstanceId) -> LedgerResult<()> {
        self.ledger.promote_one(player, instance)
    }

    /// Claims the whole inbox. Always succeeds; returns how many moved.
    ///
    /// # Errors
    ///
    /// See [`InventoryLedger::promote_all`].
    pub fn claim_all(&self, player: &PlayerId) -> LedgerResult<usize> {
        self.ledger.promote_all(player)
    }

    // ------------------------------------------------------------------
    // Crystals
    // ------------------------------------------------------------------

    /// Applies one crystal accrual attempt.
    ///
    /// # Errors
    ///
    /// See [`AccrualEngine::accrue`].
    pub fn refresh_crystals(
        &self,
        player: &PlayerId,
        total_elapsed_hours: f64,
        now: u64,
    ) -> LedgerResult<AccrualOutcome> {
        self.crystals.accrue(player, total_elapsed_hours, now)
    }
}
