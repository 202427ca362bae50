//! # Menagerie Inventory Transaction Engine
//!
//! Exactly-once, race-free mutation of shared per-player and per-code state.
//! Players accumulate monster instances through login rewards, redeemable
//! codes, peer gifting and a time-based currency; every mutation of that
//! shared state runs as one serializable transaction against the record
//! store, so double-submitted requests, concurrent gifts of the same
//! instance and replayed presence reports all resolve to a single effect.
//!
//! ## Architecture
//!
//! ```text
//! transport layer (not here)
//!          |
//!          v
//!   MenagerieService ---- RewardOrchestrator ---- MonsterProvider / IdSource
//!          |                    |                       (menagerie_catalog)
//!          |       +------------+-----------+
//!          v       v            v           v
//!   InventoryLedger      CodeRegistry   GiftBroker   AccrualEngine
//!          \________________ | ____________/_____________/
//!                           v v
//!                     AtomicStore<Record>
//!                      (menagerie_store)
//! ```
//!
//! Player records change only through [`InventoryLedger`] and
//! [`AccrualEngine`]; code records only through [`CodeRegistry`]. Nothing
//! else writes them.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codes;
pub mod crystals;
pub mod error;
pub mod gift;
pub mod inventory;
pub mod rewards;
pub mod service;
pub mod types;

pub use codes::CodeRegistry;
pub use crystals::{AccrualConfig, AccrualEngine, AccrualOutcome};
pub use error::{LedgerError, LedgerResult};
pub use gift::{GiftBroker, RECENT_GIFT_LIMIT};
pub use inventory::InventoryLedger;
pub use rewards::RewardOrchestrator;
pub use service::MenagerieService;
pub use types::{
    CodeRecord, GiftRecord, GrantReason, InstanceId, LedgerStore, MonsterInstance, PlayerId,
    PlayerRecord, Record,
};
