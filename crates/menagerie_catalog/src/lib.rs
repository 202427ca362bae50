//! # Menagerie Monster Catalog
//!
//! The template side of the collection game: a roster of base monsters, the
//! rarity variants derived from them, and rarity-weighted random selection.
//!
//! Instances are minted elsewhere; this crate only answers two questions
//! behind the [`MonsterProvider`] trait:
//!
//! 1. What are the stats of template `"frostooth-rare"`?
//! 2. Give me a random template, weighted by rarity.
//!
//! It also owns the injected unique-id capability ([`IdSource`]) so that
//! everything nondeterministic about minting - which template, which id - is
//! swappable for a deterministic double in tests.
//!
//! ## Roster configuration
//!
//! The base roster ships built in ([`Catalog::standard`]) and can also be
//! loaded from TOML:
//!
//! ```toml
//! [[monster]]
//! slug = "ice"
//! name = "Frostooth"
//! element = "Ice"
//! attack = 40
//! defense = 65
//! hp = 80
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod error;
pub mod ids;
pub mod random;
pub mod template;

pub use catalog::{Catalog, MonsterProvider};
pub use error::CatalogError;
pub use ids::{IdSource, RandomIdSource, SequentialIdSource};
pub use random::weighted_choice;
pub use template::{BaseMonster, Element, MonsterTemplate, Rarity, TemplateId};
