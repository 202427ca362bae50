//! # Gift Broker
//!
//! Moves one owned instance from a sender's collection into a recipient's
//! inbox. Both player records and the audit entry are written by a single
//! transaction: there is no observable state where the instance exists in
//! neither record or in both.

use std::sync::Arc;

use menagerie_catalog::IdSource;

use crate::error::{LedgerError, LedgerResult};
use crate::inventory::load_player;
use crate::types::{keys, GiftRecord, GrantReason, InstanceId, LedgerStore, PlayerId, Record};

/// How many audit entries a recipient sees by default.
pub const RECENT_GIFT_LIMIT: usize = 10;

/// Handle over the store for instance transfer between players.
#[derive(Clone)]
pub struct GiftBroker {
    store: Arc<LedgerStore>,
    ids: Arc<dyn IdSource>,
}

impl GiftBroker {
    /// Creates a broker over `store`, minting audit ids from `ids`.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>, ids: Arc<dyn IdSource>) -> Self {
        Self { store, ids }
    }

    /// Transfers `instance` from `sender`'s collection into `recipient`'s
    /// inbox, tagged `gift`, and records the audit entry - all or nothing.
    ///
    /// Gifting to oneself is allowed and moves the instance from the
    /// collection back into the inbox.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] when either player is absent,
    /// [`LedgerError::NotOwned`] when the sender's collection does not hold
    /// the instance, [`LedgerError::Store`] on contention.
    pub fn gift(
        &self,
        sender: &PlayerId,
        recipient: &PlayerId,
        instance: &InstanceId,
        now: u64,
    ) -> LedgerResult<GiftRecord> {
        let audit_id = self.ids.next_id();
        self.store.run_atomic(|txn| {
            let mut from = load_player(txn, sender)?;
            let mut to = if sender == recipient {
                None
            } else {
                Some(load_player(txn, recipient)?)
            };

            let mut monster = from
                .take_owned(instance)
                .ok_or_else(|| LedgerError::NotOwned {
                    player: sender.clone(),
                    instance: instance.clone(),
                })?;
            monster.reason = Some(GrantReason::Gift);

            match to.as_mut() {
                Some(to) => to.deposit(monster.clone()),
                None => from.deposit(monster.clone()),
            }

            let record = GiftRecord {
                id: audit_id.clone(),
                from: sender.clone(),
                to: recipient.clone(),
                monster,
                sent_at: now,
            };

            txn.put(keys::player(sender), Record::Player(from));
            if let Some(to) = to {
                txn.put(keys::player(recipient), Record::Player(to));
            }
            txn.put(keys::gift(&record.id), Record::Gift(record.clone()));
            Ok(record)
        })
    }

    /// The most recent audit entries addressed to `recipient`, newest first.
    #[must_use]
    pub fn recent_for(&self, recipient: &PlayerId, limit: usize) -> Vec<GiftRecord> {
        let mut gifts: Vec<GiftRecord> = self
            .store
            .list(keys::GIFTS)
            .into_iter()
            .filter_map(Record::into_gift)
            .filter(|gift| &gift.to == recipient)
            .collect();
        gifts.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then_with(|| a.id.cmp(&b.id)));
        gifts.truncate(limit);
        gifts
    }

    /// Removes one audit entry. Removing an absent entry is a no-op; the
    /// transferred instance itself is untouched either way.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on store contention.
    pub fn dismiss(&self, gift_id: &str) -> LedgerResult<()> {
        self.store.run_atomic(|txn| {
            txn.delete(keys::gift(gift_id));
            Ok(())
        })
    }
}
