//! # Record Addressing
//!
//! Records live in named collections (`"players"`, `"claim_codes"`, ...) and
//! are addressed by a collection kind plus a document id, mirroring the
//! document-store layout the engine was written against.

use std::fmt;

/// Address of a single record: collection kind plus document id.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordKey {
    kind: &'static str,
    id: String,
}

impl RecordKey {
    /// Creates a key for `id` within the `kind` collection.
    #[must_use]
    pub fn new(kind: &'static str, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// The collection this key addresses.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// The document id within the collection.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
