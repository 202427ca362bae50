//! # Ledger Error Types
//!
//! Precondition failures are expected business outcomes and travel to the
//! caller verbatim; only [`LedgerError::Store`] represents a fault, and it is
//! transient by contract (the store already retried internally).

use thiserror::Error;

use menagerie_catalog::TemplateId;
use menagerie_store::StoreError;

use crate::types::{InstanceId, PlayerId};

/// Errors surfaced by ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No player record under this id.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The instance is not in the player's inbox.
    #[error("instance not found in inbox: {0}")]
    InstanceNotFound(InstanceId),

    /// No claim code under this (normalized) code string.
    #[error("claim code not found: {0}")]
    CodeNotFound(String),

    /// The catalog no longer resolves the template a code grants.
    #[error("monster template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// The instance is not in the sender's permanent collection.
    #[error("monster {instance} is not owned by {player}")]
    NotOwned {
        /// The would-be sender.
        player: PlayerId,
        /// The instance they tried to give away.
        instance: InstanceId,
    },

    /// The code's validity window has passed.
    #[error("claim code {code} expired at {expired_at}")]
    CodeExpired {
        /// Normalized code string.
        code: String,
        /// Expiry, seconds since the epoch.
        expired_at: u64,
    },

    /// This player has already redeemed this code.
    #[error("claim code {code} already used by this player")]
    AlreadyClaimed {
        /// Normalized code string.
        code: String,
    },

    /// Accrual attempted inside the cooldown window. Retryable after the
    /// reported wait.
    #[error("accrual throttled, retry in {wait_secs}s")]
    Throttled {
        /// Seconds until the cooldown opens.
        wait_secs: u64,
    },

    /// The backing store gave up after retrying conflicting commits.
    #[error("transient store failure: {0}")]
    Store(#[from] StoreError),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
