//! # Inventory Ledger
//!
//! The sole authority over a player's collection, inbox and cached count.
//! Every operation is one store transaction: two racing promotions of one
//! instance cannot both succeed, and a deposit arriving while `promote_all`
//! runs either lands before the drained snapshot (and is promoted) or commits
//! after it (and stays pending) - it is never lost.

use std::sync::Arc;

use menagerie_store::Txn;

use crate::error::{LedgerError, LedgerResult};
use crate::types::{keys, InstanceId, LedgerStore, MonsterInstance, PlayerId, PlayerRecord, Record};

/// Loads and normalizes a player record inside a transaction.
///
/// Normalization here is the single place record invariants are
/// re-established; downstream code trusts them.
pub(crate) fn load_player(
    txn: &mut Txn<'_, Record>,
    id: &PlayerId,
) -> LedgerResult<PlayerRecord> {
    let mut player = txn
        .get(&keys::player(id))
        .and_then(Record::into_player)
        .ok_or_else(|| LedgerError::PlayerNotFound(id.clone()))?;
    player.normalize();
    Ok(player)
}

/// Handle over the store for collection/inbox mutation.
#[derive(Clone)]
pub struct InventoryLedger {
    store: Arc<LedgerStore>,
}

impl InventoryLedger {
    /// Creates a ledger over `store`.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Reads one player record, normalized. `None` when absent.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<PlayerRecord> {
        let mut player = self
            .store
            .get(&keys::player(id))
            .and_then(Record::into_player)?;
        player.normalize();
        Some(player)
    }

    /// Creates the player if absent; otherwise returns the existing record
    /// untouched (the optional `welcome` deposit happens only on creation).
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on store contention.
    pub fn register_player(
        &self,
        id: &PlayerId,
        name: &str,
        welcome: Option<MonsterInstance>,
    ) -> LedgerResult<PlayerRecord> {
        self.store.run_atomic(|txn| {
            let key = keys::player(id);
            if let Some(mut existing) = txn.get(&key).and_then(Record::into_player) {
                existing.normalize();
                return Ok(existing);
            }
            let mut player = PlayerRecord::new(id.clone(), name);
            if let Some(monster) = welcome.clone() {
                player.deposit(monster);
            }
            txn.put(key, Record::Player(player.clone()));
            Ok(player)
        })
    }

    /// Moves exactly one pending instance into the collection.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the player is absent,
    /// [`LedgerError::InstanceNotFound`] when the inbox holds no such
    /// instance (already claimed, or never granted).
    pub fn promote_one(&self, id: &PlayerId, instance: &InstanceId) -> LedgerResult<()> {
        self.store.run_atomic(|txn| {
            let mut player = load_player(txn, id)?;
            if !player.promote_one(instance) {
                return Err(LedgerError::InstanceNotFound(instance.clone()));
            }
            txn.put(keys::player(id), Record::Player(player));
            Ok(())
        })
    }

    /// Moves every pending instance into the collection. An empty inbox is a
    /// successful no-op. Returns how many instances moved.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the player is absent.
    pub fn promote_all(&self, id: &PlayerId) -> LedgerResult<usize> {
        self.store.run_atomic(|txn| {
            let mut player = load_player(txn, id)?;
            let moved = player.promote_all();
            if moved > 0 {
                txn.put(keys::player(id), Record::Player(player));
            }
            Ok(moved)
        })
    }

    /// Appends `monster` to the player's inbox. This primitive does not
    /// deduplicate; idempotency is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the target player is absent.
    pub fn deposit_to_inbox(&self, id: &PlayerId, monster: MonsterInstance) -> LedgerResult<()> {
        self.store.run_atomic(|txn| {
            let mut player = load_player(txn, id)?;
            player.deposit(monster.clone());
            txn.put(keys::player(id), Record::Player(player));
            Ok(())
        })
    }

    /// Atomically checks ownership and removes the instance from the
    /// collection. This single step is the anti-double-spend guard the gift
    /// path relies on.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the player is absent,
    /// [`LedgerError::NotOwned`] when the collection holds no such instance.
    pub fn remove_from_collection_if_owned(
        &self,
        id: &PlayerId,
        instance: &InstanceId,
    ) -> LedgerResult<MonsterInstance> {
        self.store.run_atomic(|txn| {
            let mut player = load_player(txn, id)?;
            let monster = player
                .take_owned(instance)
                .ok_or_else(|| LedgerError::NotOwned {
                    player: id.clone(),
                    instance: instance.clone(),
                })?;
            txn.put(keys::player(id), Record::Player(player));
            Ok(monster)
        })
    }

    /// Deposits evaluation rewards, each gated on its evaluation id not yet
    /// being recorded. Returns the instances actually deposited.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when the player is absent.
    pub(crate) fn deposit_evaluation_rewards(
        &self,
        id: &PlayerId,
        grants: &[(u64, MonsterInstance)],
    ) -> LedgerResult<Vec<MonsterInstance>> {
        self.store.run_atomic(|txn| {
            let mut player = load_player(txn, id)?;
            let mut deposited = Vec::new();
            for (evaluation, monster) in grants {
                if player.granted_evaluations.insert(*evaluation) {
                    player.deposit(monster.clone());
                    deposited.push(monster.clone());
                }
            }
            if !deposited.is_empty() {
                txn.put(keys::player(id), Record::Player(player));
            }
            Ok(deposited)
        })
    }
}
