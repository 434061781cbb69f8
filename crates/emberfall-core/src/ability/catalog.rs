//! Static ability information.

use lattice::Tag;
use serde::{Deserialize, Serialize};

use super::spec::AbilityType;

/// Catalog row describing one ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityInfo {
    /// Ability identity.
    pub ability: Tag,
    /// Offensive, passive or utility.
    #[serde(default)]
    pub ability_type: AbilityType,
    /// Character level at which the ability becomes Eligible.
    pub level_requirement: u32,
    /// Input slot used when granted as a startup ability.
    #[serde(default)]
    pub startup_input: Option<Tag>,
    /// Cooldown tag, if the ability has one.
    #[serde(default)]
    pub cooldown: Option<Tag>,
}

/// Read-only lookup of ability information.
pub trait AbilityCatalog {
    /// All rows, in catalog order.
    fn abilities(&self) -> &[AbilityInfo];

    /// Row for exactly `ability`.
    fn find(&self, ability: &Tag) -> Option<&AbilityInfo> {
        self.abilities()
            .iter()
            .find(|info| info.ability.matches_exact(ability))
    }

    /// Returns true if the catalog marks `ability` as passive.
    fn is_passive(&self, ability: &Tag) -> bool {
        self.find(ability)
            .is_some_and(|info| info.ability_type == AbilityType::Passive)
    }
}

/// A catalog backed by a vector, as loaded from game data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticAbilityCatalog {
    abilities: Vec<AbilityInfo>,
}

impl StaticAbilityCatalog {
    /// Creates a catalog from rows.
    #[must_use]
    pub fn new(abilities: Vec<AbilityInfo>) -> Self {
        Self { abilities }
    }

    /// Mutable rows, used when re-interning tags after loading.
    pub(crate) fn abilities_mut(&mut self) -> &mut [AbilityInfo] {
        &mut self.abilities
    }
}

impl AbilityCatalog for StaticAbilityCatalog {
    fn abilities(&self) -> &[AbilityInfo] {
        &self.abilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Tag {
        Tag::parse_detached(name).unwrap()
    }

    #[test]
    fn find_is_exact_and_passive_is_typed() {
        let catalog = StaticAbilityCatalog::new(vec![
            AbilityInfo {
                ability: tag("Abilities.Fire.Firebolt"),
                ability_type: AbilityType::Offensive,
                level_requirement: 1,
                startup_input: None,
                cooldown: None,
            },
            AbilityInfo {
                ability: tag("Abilities.Passive.Halo"),
                ability_type: AbilityType::Passive,
                level_requirement: 2,
                startup_input: None,
                cooldown: None,
            },
        ]);
        assert!(catalog.find(&tag("Abilities.Fire")).is_none());
        assert!(catalog.find(&tag("Abilities.Fire.Firebolt")).is_some());
        assert!(catalog.is_passive(&tag("Abilities.Passive.Halo")));
        assert!(!catalog.is_passive(&tag("Abilities.Fire.Firebolt")));
        assert!(!catalog.is_passive(&tag("Abilities.Unknown")));
    }

    #[test]
    fn optional_fields_default_when_loading() {
        let json = r#"[{"ability": "Abilities.Lightning.Electrocute", "level_requirement": 2}]"#;
        let catalog: StaticAbilityCatalog = serde_json::from_str(json).unwrap();
        let info = &catalog.abilities()[0];
        assert_eq!(info.ability_type, AbilityType::None);
        assert_eq!(info.startup_input, None);
    }
}
