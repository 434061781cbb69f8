//! Static game data: abilities, talent trees, skill defaults, curves and the
//! level-up table.
//!
//! Data is loaded from JSON and then bound to a frozen [`TagRegistry`]:
//! every tag is re-interned against the registry, so a typo in the data is a
//! [`ConfigError`] at load time instead of a silent mismatch in combat.
//!
//! # Example
//!
//! ```
//! use emberfall_core::ability::AbilityCatalog;
//! use emberfall_core::config::GameData;
//! use emberfall_core::tags::NativeTags;
//!
//! let json = r#"{
//!     "abilities": [
//!         { "ability": "Abilities.Fire.Firebolt", "ability_type": "Offensive",
//!           "level_requirement": 1, "startup_input": "InputTag.LMB" }
//!     ],
//!     "curves": {
//!         "ArmorPenetration": [[1, 0.25]],
//!         "EffectiveArmor": [[1, 0.33]],
//!         "CriticalHitResistance": [[1, 0.25]]
//!     }
//! }"#;
//!
//! let (registry, _) = NativeTags::bootstrap(&["Abilities.Fire.Firebolt"]).unwrap();
//! let data = GameData::from_json_str(json).unwrap().bind(&registry).unwrap();
//! assert_eq!(data.abilities.abilities().len(), 1);
//! ```

use lattice::{Tag, TagRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ability::{AbilityCatalog, StaticAbilityCatalog};
use crate::damage::curves::{CurveTable, REQUIRED_CURVES};
use crate::error::ConfigError;
use crate::progression::{LevelUpTable, ProgressionDefaults};
use crate::skills::DamageSkill;
use crate::talent::TalentTree;

/// Everything loaded from content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Ability rows.
    #[serde(default)]
    pub abilities: StaticAbilityCatalog,
    /// Talent trees, one per skill.
    #[serde(default)]
    pub talent_trees: Vec<TalentTree>,
    /// Damage defaults, one per damage skill.
    #[serde(default)]
    pub damage_skills: Vec<DamageSkill>,
    /// Coefficient curves.
    #[serde(default)]
    pub curves: CurveTable,
    /// XP requirements and awards.
    #[serde(default)]
    pub level_up: LevelUpTable,
    /// Starting values for new characters.
    #[serde(default)]
    pub progression_defaults: ProgressionDefaults,
}

impl GameData {
    /// Parses game data.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Malformed`] if the JSON does not match the schema.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Re-interns every tag against `registry` and checks that the curves
    /// the damage pipeline needs exist.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Tag`] for an unregistered tag,
    /// [`ConfigError::MissingCurve`] for a missing curve and
    /// [`ConfigError::UnknownSkill`] for a talent tree whose talents name a
    /// different skill.
    pub fn bind(mut self, registry: &TagRegistry) -> Result<Self, ConfigError> {
        if let Some(missing) = self.curves.missing(&REQUIRED_CURVES).first() {
            return Err(ConfigError::MissingCurve((*missing).to_owned()));
        }

        for info in self.abilities.abilities_mut() {
            intern(registry, &mut info.ability)?;
            intern_opt(registry, &mut info.startup_input)?;
            intern_opt(registry, &mut info.cooldown)?;
        }

        for tree in &mut self.talent_trees {
            intern(registry, &mut tree.skill)?;
            for talent in &mut tree.talents {
                intern(registry, &mut talent.skill)?;
                if !talent.skill.matches_exact(&tree.skill) {
                    return Err(ConfigError::UnknownSkill(talent.skill.clone()));
                }
                intern(registry, &mut talent.talent)?;
                intern_opt(registry, &mut talent.attribute)?;
                intern_opt(registry, &mut talent.effect)?;
                intern_opt(registry, &mut talent.condition.attribute)?;
                intern_opt(registry, &mut talent.condition.tag)?;
            }
        }

        for skill in &mut self.damage_skills {
            intern(registry, &mut skill.skill)?;
            intern(registry, &mut skill.damage_type)?;
        }

        debug!(
            abilities = self.abilities.abilities().len(),
            talent_trees = self.talent_trees.len(),
            damage_skills = self.damage_skills.len(),
            "game data bound"
        );
        Ok(self)
    }

    /// Talent tree of `skill`.
    #[must_use]
    pub fn talent_tree(&self, skill: &Tag) -> Option<&TalentTree> {
        self.talent_trees
            .iter()
            .find(|tree| tree.skill.matches_exact(skill))
    }

    /// Damage defaults of `skill`.
    #[must_use]
    pub fn damage_skill(&self, skill: &Tag) -> Option<&DamageSkill> {
        self.damage_skills
            .iter()
            .find(|defaults| defaults.skill.matches_exact(skill))
    }
}

fn intern(registry: &TagRegistry, tag: &mut Tag) -> Result<(), ConfigError> {
    *tag = registry.canonicalize(tag)?;
    Ok(())
}

fn intern_opt(registry: &TagRegistry, tag: &mut Option<Tag>) -> Result<(), ConfigError> {
    if let Some(tag) = tag {
        intern(registry, tag)?;
    }
    Ok(())
}
