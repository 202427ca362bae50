//! # Templates
//!
//! A base monster times a rarity tier yields one template. Templates carry
//! the stats an instance snapshots at mint time; rebalancing a template never
//! touches instances already minted from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Elemental affinity of a monster line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Lightning types.
    Electro,
    /// Water types.
    Water,
    /// Fire types.
    Fire,
    /// Ice types.
    Ice,
    /// Plant types.
    Plant,
    /// Ground types.
    Ground,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Electro => "Electro",
            Self::Water => "Water",
            Self::Fire => "Fire",
            Self::Ice => "Ice",
            Self::Plant => "Plant",
            Self::Ground => "Ground",
        };
        f.write_str(name)
    }
}

/// Rarity tier of a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Baseline variant - ~75% of random grants.
    Common,
    /// Boosted variant - ~20% of random grants.
    Rare,
    /// Top variant - ~5% of random grants.
    Epic,
}

impl Rarity {
    /// Every tier, in ascending order.
    pub const ALL: [Self; 3] = [Self::Common, Self::Rare, Self::Epic];

    /// Multiplier applied to base stats for this tier.
    #[inline]
    #[must_use]
    pub const fn stat_multiplier(self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Rare => 1.2,
            Self::Epic => 1.4,
        }
    }

    /// Selection weight in basis points (10000 = certain).
    #[inline]
    #[must_use]
    pub const fn weight_bp(self) -> u32 {
        match self {
            Self::Common => 7500,
            Self::Rare => 2000,
            Self::Epic => 500,
        }
    }

    /// Lowercase suffix used in template ids (`"frostooth-rare"`).
    #[inline]
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
        };
        f.write_str(name)
    }
}

/// Identifier of one template: `"{slug}-{rarity}"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Wraps an already-formed template id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the id for `slug` at `rarity`.
    #[must_use]
    pub fn compose(slug: &str, rarity: Rarity) -> Self {
        Self(format!("{slug}-{}", rarity.suffix()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line in the roster config: a monster before rarity variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseMonster {
    /// Stable lowercase identifier, unique within the roster.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Elemental affinity.
    pub element: Element,
    /// Base attack stat.
    pub attack: u32,
    /// Base defense stat.
    pub defense: u32,
    /// Base hit points.
    pub hp: u32,
}

/// A resolvable template: base stats scaled by rarity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Template id, `"{slug}-{rarity}"`.
    pub id: TemplateId,
    /// Display name, shared across the line's rarity variants.
    pub name: String,
    /// Elemental affinity.
    pub element: Element,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Attack stat after the rarity multiplier.
    pub attack: u32,
    /// Defense stat after the rarity multiplier.
    pub defense: u32,
    /// Hit points after the rarity multiplier.
    pub hp: u32,
}

impl MonsterTemplate {
    /// Derives the `rarity` variant of a base monster.
    #[must_use]
    pub fn from_base(base: &BaseMonster, rarity: Rarity) -> Self {
        let scale = |stat: u32| -> u32 {
            let scaled = f64::from(stat) * rarity.stat_multiplier();
            // Stats stay comfortably inside u32 range; round half up like
            // the balance sheet does.
            scaled.round() as u32
        };
        Self {
            id: TemplateId::compose(&base.slug, rarity),
            name: base.name.clone(),
            element: base.element,
            rarity,
            attack: scale(base.attack),
            defense: scale(base.defense),
            hp: scale(base.hp),
        }
    }
}
