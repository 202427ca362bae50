//! # Documents
//!
//! Everything the store persists: player records, claim codes, gift audit
//! entries. The shapes match what the backing document store holds, so every
//! field is part of the persistence contract.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use menagerie_catalog::{MonsterTemplate, Rarity, TemplateId};
use menagerie_store::{AtomicStore, RecordKey};

/// The store specialized to this crate's documents.
pub type LedgerStore = AtomicStore<Record>;

/// Stable opaque player identity, assigned by the login collaborator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a player id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Globally unique id of one minted instance. Never reused, never reassigned.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wraps an instance id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an instance sits in an inbox. Present only while pending; promotion
/// drops it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantReason {
    /// First-login welcome grant.
    Welcome,
    /// Reward for a newly observed evaluation.
    Eval,
    /// Received from another player.
    Gift,
    /// Redeemed from a claim code.
    Code,
}

/// One minted collectible.
///
/// Stats are snapshots taken at mint time; a later template rebalance never
/// touches instances already minted from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterInstance {
    /// Unique instance id.
    pub id: InstanceId,
    /// Template this instance was minted from.
    pub template: TemplateId,
    /// Rarity tier at mint time.
    pub rarity: Rarity,
    /// Attack snapshot.
    pub attack: u32,
    /// Defense snapshot.
    pub defense: u32,
    /// Hit point snapshot.
    pub hp: u32,
    /// Pending-grant tag; only meaningful in an inbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<GrantReason>,
}

impl MonsterInstance {
    /// Mints a new instance from `template` under a fresh id.
    #[must_use]
    pub fn mint(
        template: &MonsterTemplate,
        id: impl Into<String>,
        reason: Option<GrantReason>,
    ) -> Self {
        Self {
            id: InstanceId::new(id),
            template: template.id.clone(),
            rarity: template.rarity,
            attack: template.attack,
            defense: template.defense,
            hp: template.hp,
            reason,
        }
    }
}

/// One player's persistent state.
///
/// Mutate only through the ledger components; every mutator below keeps
/// `monster_count` equal to `monsters.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// The player's own id (documents carry their identity).
    pub id: PlayerId,
    /// Display name, fixed at first login.
    pub name: String,
    /// Permanent collection, in acquisition order.
    pub monsters: Vec<MonsterInstance>,
    /// Pending grants awaiting claim, in arrival order.
    pub inbox: Vec<MonsterInstance>,
    /// Cached `monsters.len()`.
    pub monster_count: u32,
    /// Evaluation ids already rewarded; each grants at most once, ever.
    pub granted_evaluations: BTreeSet<u64>,
    /// Crystal balance. Never decreases (no spend operation exists).
    pub crystals: u64,
    /// Last tracked-hours value used for accrual. Non-decreasing.
    pub accrual_checkpoint_hours: f64,
    /// Epoch seconds of the last non-throttled accrual attempt.
    pub last_accrual_at: Option<u64>,
}

impl PlayerRecord {
    /// Fresh record for a first login.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            monsters: Vec::new(),
            inbox: Vec::new(),
            monster_count: 0,
            granted_evaluations: BTreeSet::new(),
            crystals: 0,
            accrual_checkpoint_hours: 0.0,
            last_accrual_at: None,
        }
    }

    /// Re-establishes the record invariants once, at load.
    ///
    /// Records written by earlier revisions of the service may carry a stale
    /// count or stray pending tags on promoted monsters.
    pub(crate) fn normalize(&mut self) {
        self.recount();
        for monster in &mut self.monsters {
            monster.reason = None;
        }
    }

    fn recount(&mut self) {
        self.monster_count = u32::try_from(self.monsters.len()).unwrap_or(u32::MAX);
    }

    /// Appends a pending grant to the inbox.
    pub(crate) fn deposit(&mut self, monster: MonsterInstance) {
        self.inbox.push(monster);
    }

    /// Moves one inbox instance into the collection, dropping its tag.
    /// Returns `false` when the inbox holds no such instance.
    pub(crate) fn promote_one(&mut self, instance: &InstanceId) -> bool {
        let Some(position) = self.inbox.iter().position(|m| &m.id == instance) else {
            return false;
        };
        let mut monster = self.inbox.remove(position);
        monster.reason = None;
        self.monsters.push(monster);
        self.recount();
        true
    }

    /// Drains the whole inbox into the collection. Returns how many moved.
    pub(crate) fn promote_all(&mut self) -> usize {
        let moved = self.inbox.len();
        for mut monster in self.inbox.drain(..) {
            monster.reason = None;
            self.monsters.push(monster);
        }
        self.recount();
        moved
    }

    /// Removes an instance from the collection if present.
    pub(crate) fn take_owned(&mut self, instance: &InstanceId) -> Option<MonsterInstance> {
        let position = self.monsters.iter().position(|m| &m.id == instance)?;
        let monster = self.monsters.remove(position);
        self.recount();
        Some(monster)
    }
}

/// One redemption code.
///
/// Codes are single-use per player, not globally: `claimed_by` grows by at
/// most one entry per player, ever.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// Template the code grants.
    pub template: TemplateId,
    /// Expiry, seconds since the epoch. Redemption at the instant itself
    /// still succeeds.
    pub expires_at: u64,
    /// Players who have redeemed this code.
    pub claimed_by: BTreeSet<PlayerId>,
}

/// Immutable audit entry for one completed gift.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftRecord {
    /// Audit record id.
    pub id: String,
    /// Sender.
    pub from: PlayerId,
    /// Recipient.
    pub to: PlayerId,
    /// The transferred instance, as deposited (tagged `gift`).
    pub monster: MonsterInstance,
    /// Transfer time, seconds since the epoch.
    pub sent_at: u64,
}

/// Any document the store can hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// A player record (`players` collection).
    Player(PlayerRecord),
    /// A claim code (`claim_codes` collection).
    Code(CodeRecord),
    /// A gift audit entry (`gifts` collection).
    Gift(GiftRecord),
}

impl Record {
    /// Unwraps a player record.
    #[must_use]
    pub fn into_player(self) -> Option<PlayerRecord> {
        match self {
            Self::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Unwraps a claim code.
    #[must_use]
    pub fn into_code(self) -> Option<CodeRecord> {
        match self {
            Self::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Unwraps a gift audit entry.
    #[must_use]
    pub fn into_gift(self) -> Option<GiftRecord> {
        match self {
            Self::Gift(gift) => Some(gift),
            _ => None,
        }
    }
}

/// Collection names and key constructors.
pub mod keys {
    use super::{PlayerId, RecordKey};

    /// Player records.
    pub const PLAYERS: &str = "players";
    /// Claim codes, keyed by the normalized (uppercase) code string.
    pub const CLAIM_CODES: &str = "claim_codes";
    /// Gift audit entries.
    pub const GIFTS: &str = "gifts";

    /// Key of a player record.
    #[must_use]
    pub fn player(id: &PlayerId) -> RecordKey {
        RecordKey::new(PLAYERS, id.as_str())
    }

    /// Key of a claim code. `code` must already be normalized.
    #[must_use]
    pub fn code(code: &str) -> RecordKey {
        RecordKey::new(CLAIM_CODES, code)
    }

    /// Key of a gift audit entry.
    #[must_use]
    pub fn gift(id: &str) -> RecordKey {
        RecordKey::new(GIFTS, id)
    }
}
