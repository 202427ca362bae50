//! # Catalog Error Types

use thiserror::Error;

/// Errors raised while building a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The roster contained no base monsters.
    #[error("catalog roster is empty")]
    EmptyRoster,

    /// Two base monsters shared a slug; template ids would collide.
    #[error("duplicate base monster slug: {0}")]
    DuplicateSlug(String),

    /// The roster config file failed to parse.
    #[error("invalid roster config: {0}")]
    InvalidConfig(String),
}
