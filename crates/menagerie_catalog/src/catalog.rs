//! # The Catalog
//!
//! Builds the full template table from a base roster (every base monster gets
//! one variant per rarity tier) and serves resolution plus rarity-weighted
//! random selection behind the [`MonsterProvider`] trait.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::error::CatalogError;
use crate::random::weighted_choice;
use crate::template::{BaseMonster, Element, MonsterTemplate, Rarity, TemplateId};

/// The collaborator contract the reward engine consumes.
///
/// Production wires a [`Catalog`]; tests may wire anything deterministic.
pub trait MonsterProvider: Send + Sync {
    /// Looks up one template by id.
    fn resolve(&self, id: &TemplateId) -> Option<MonsterTemplate>;

    /// Picks a random template: rarity first (weighted), then uniformly
    /// within that rarity's pool.
    fn random_by_weighted_rarity(&self) -> MonsterTemplate;
}

#[derive(Deserialize)]
struct RosterConfig {
    #[serde(rename = "monster")]
    monsters: Vec<BaseMonster>,
}

/// Template table plus selection state.
#[derive(Debug)]
pub struct Catalog {
    templates: HashMap<TemplateId, MonsterTemplate>,
    pools: HashMap<Rarity, Vec<TemplateId>>,
    rng: Mutex<StdRng>,
}

impl Catalog {
    /// Builds a catalog from a base roster with an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// [`CatalogError::EmptyRoster`] for an empty roster,
    /// [`CatalogError::DuplicateSlug`] when two bases share a slug.
    pub fn new(roster: Vec<BaseMonster>) -> Result<Self, CatalogError> {
        Self::build(roster, StdRng::from_entropy())
    }

    /// Builds a catalog whose random selection is reproducible.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Catalog::new`].
    pub fn with_seed(roster: Vec<BaseMonster>, seed: u64) -> Result<Self, CatalogError> {
        Self::build(roster, StdRng::seed_from_u64(seed))
    }

    /// Parses a TOML roster (`[[monster]]` tables) into a catalog.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidConfig`] on parse failure, plus the
    /// [`Catalog::new`] conditions.
    pub fn from_toml_str(config: &str) -> Result<Self, CatalogError> {
        let roster: RosterConfig =
            toml::from_str(config).map_err(|err| CatalogError::InvalidConfig(err.to_string()))?;
        Self::new(roster.monsters)
    }

    /// The built-in roster the live game ships with.
    #[must_use]
    pub fn standard() -> Self {
        // The built-in roster is static and well-formed.
        match Self::new(standard_roster()) {
            Ok(catalog) => catalog,
            Err(_) => unreachable!(),
        }
    }

    fn build(roster: Vec<BaseMonster>, rng: StdRng) -> Result<Self, CatalogError> {
        if roster.is_empty() {
            return Err(CatalogError::EmptyRoster);
        }
        let mut templates = HashMap::new();
        let mut pools: HashMap<Rarity, Vec<TemplateId>> = HashMap::new();
        for base in &roster {
            for rarity in Rarity::ALL {
                let template = MonsterTemplate::from_base(base, rarity);
                if templates.contains_key(&template.id) {
                    return Err(CatalogError::DuplicateSlug(base.slug.clone()));
                }
                pools.entry(rarity).or_default().push(template.id.clone());
                templates.insert(template.id.clone(), template);
            }
        }
        Ok(Self {
            templates,
            pools,
            rng: Mutex::new(rng),
        })
    }

    /// Number of resolvable templates (roster size × rarity tiers).
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }
}

impl MonsterProvider for Catalog {
    fn resolve(&self, id: &TemplateId) -> Option<MonsterTemplate> {
        self.templates.get(id).cloned()
    }

    fn random_by_weighted_rarity(&self) -> MonsterTemplate {
        let mut rng = self.rng.lock();
        let rarity = *weighted_choice(&mut *rng, &Rarity::ALL, |r| r.weight_bp())
            .unwrap_or(&Rarity::Common);
        let pool = &self.pools[&rarity];
        let id = &pool[rng.gen_range(0..pool.len())];
        self.templates[id].clone()
    }
}

/// The six base lines of the live roster.
fn standard_roster() -> Vec<BaseMonster> {
    let base = |slug: &str, name: &str, element: Element, attack: u32, defense: u32, hp: u32| {
        BaseMonster {
            slug: slug.to_string(),
            name: name.to_string(),
            element,
            attack,
            defense,
            hp,
        }
    };
    vec![
        base("voltadillo", "Voltadillo", Element::Electro, 55, 40, 70),
        base("aqualet", "Aqualet", Element::Water, 45, 55, 80),
        base("emberpup", "Emberpup", Element::Fire, 65, 35, 75),
        base("leafup", "Leafup", Element::Plant, 50, 60, 85),
        base("frostooth", "Frostooth", Element::Ice, 40, 65, 80),
        base("pebblit", "Pebblit", Element::Ground, 35, 80, 90),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_resolves_every_variant() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.template_count(), 18);

        let rare = catalog
            .resolve(&TemplateId::new("frostooth-rare"))
            .expect("frostooth-rare should exist");
        assert_eq!(rare.name, "Frostooth");
        assert_eq!(rare.element, Element::Ice);
        assert_eq!(rare.rarity, Rarity::Rare);
        assert_eq!((rare.attack, rare.defense, rare.hp), (48, 78, 96));

        assert!(catalog.resolve(&TemplateId::new("dragon-mythic")).is_none());
    }

    #[test]
    fn toml_roster_round_trips() {
        let config = r#"
            [[monster]]
            slug = "ice"
            name = "Frostooth"
            element = "Ice"
            attack = 40
            defense = 65
            hp = 80
        "#;
        let catalog = Catalog::from_toml_str(config).unwrap();
        assert_eq!(catalog.template_count(), 3);
        let rare = catalog.resolve(&TemplateId::new("ice-rare")).unwrap();
        assert_eq!(rare.attack, 48);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = Catalog::from_toml_str("[[monster]]\nslug = 3").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfig(_)));
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert_eq!(Catalog::new(vec![]).unwrap_err(), CatalogError::EmptyRoster);
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let dup = BaseMonster {
            slug: "twin".to_string(),
            name: "Twin".to_string(),
            element: Element::Fire,
            attack: 1,
            defense: 1,
            hp: 1,
        };
        let err = Catalog::new(vec![dup.clone(), dup]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateSlug("twin".to_string()));
    }

    #[test]
    fn random_selection_tracks_rarity_weights() {
        let catalog = Catalog::with_seed(standard_roster(), 7).unwrap();
        let draws = 10_000;
        let mut by_rarity: HashMap<Rarity, u32> = HashMap::new();
        for _ in 0..draws {
            let template = catalog.random_by_weighted_rarity();
            *by_rarity.entry(template.rarity).or_default() += 1;
        }
        let common = by_rarity[&Rarity::Common];
        let rare = by_rarity[&Rarity::Rare];
        let epic = by_rarity[&Rarity::Epic];
        // Expectations: 7500 / 2000 / 500 per 10k, generous margins.
        assert!(common > 7_000, "common drew {common}");
        assert!((1_600..2_400).contains(&rare), "rare drew {rare}");
        assert!((300..750).contains(&epic), "epic drew {epic}");
    }

    #[test]
    fn seeded_catalogs_draw_identically() {
        let a = Catalog::with_seed(standard_roster(), 99).unwrap();
        let b = Catalog::with_seed(standard_roster(), 99).unwrap();
        for _ in 0..64 {
            assert_eq!(
                a.random_by_weighted_rarity().id,
                b.random_by_weighted_rarity().id
            );
        }
    }
}
