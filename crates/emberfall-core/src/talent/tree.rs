//! Talent definitions and per-skill trees.

use lattice::Tag;
use serde::{Deserialize, Serialize};

/// How a talent changes things.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TalentType {
    /// Adds `magnitude × level` to an attribute.
    AttributeAdditive,
    /// Scales an attribute by `magnitude × level` percent.
    AttributeMultiplicative,
    /// Applies a persistent effect; no direct numeric modifier.
    GameplayEffect,
}

/// When a talent applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Always applies.
    #[default]
    None,
    /// Source attribute is below the threshold.
    PlayerAttributeBelow,
    /// Source attribute is above the threshold.
    PlayerAttributeAbove,
    /// Target attribute is below the threshold.
    TargetAttributeBelow,
    /// Target attribute is above the threshold.
    TargetAttributeAbove,
    /// Source carries the condition tag.
    PlayerHasTag,
    /// Source lacks the condition tag.
    PlayerDontHaveTag,
    /// Target carries the condition tag.
    TargetHasTag,
    /// Target lacks the condition tag.
    TargetDontHaveTag,
    /// Target has just received the condition tag (a debuff).
    TargetReceiveTag,
}

impl ConditionKind {
    /// Threshold kinds compare an attribute value.
    #[must_use]
    pub const fn is_attribute_threshold(self) -> bool {
        matches!(
            self,
            Self::PlayerAttributeBelow
                | Self::PlayerAttributeAbove
                | Self::TargetAttributeBelow
                | Self::TargetAttributeAbove
        )
    }
}

const fn default_true() -> bool {
    true
}

const fn default_level() -> u32 {
    1
}

/// Condition attached to a talent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentCondition {
    /// What is checked.
    #[serde(default)]
    pub kind: ConditionKind,
    /// Attribute for threshold kinds.
    #[serde(default)]
    pub attribute: Option<Tag>,
    /// Threshold for attribute kinds.
    #[serde(default)]
    pub threshold: f32,
    /// Compare the attribute as a percentage of its max attribute.
    #[serde(default = "default_true")]
    pub percent_of_max: bool,
    /// Tag for tag kinds.
    #[serde(default)]
    pub tag: Option<Tag>,
}

impl Default for TalentCondition {
    fn default() -> Self {
        Self {
            kind: ConditionKind::None,
            attribute: None,
            threshold: 0.0,
            percent_of_max: true,
            tag: None,
        }
    }
}

/// One talent as defined in a tree, and as held (with its level) by a
/// character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTalent {
    /// Skill the talent modifies.
    pub skill: Tag,
    /// Talent identity.
    pub talent: Tag,
    /// Current level, `0..=max_level`.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Maximum level.
    #[serde(default = "default_level")]
    pub max_level: u32,
    /// Modifier kind.
    pub talent_type: TalentType,
    /// Per-level magnitude (percent for multiplicative talents).
    #[serde(default)]
    pub magnitude: f32,
    /// Attribute modified, for attribute talents.
    #[serde(default)]
    pub attribute: Option<Tag>,
    /// When the talent applies.
    #[serde(default)]
    pub condition: TalentCondition,
    /// Persistent effect applied while the talent is held, or when its
    /// condition fires.
    #[serde(default)]
    pub effect: Option<Tag>,
}

impl SkillTalent {
    /// Returns true if the talent modifies exactly `attribute`.
    #[must_use]
    pub fn modifies(&self, attribute: &Tag) -> bool {
        self.attribute
            .as_ref()
            .is_some_and(|own| own.matches_exact(attribute))
    }

    /// Returns true if the talent has no condition.
    #[must_use]
    pub fn is_unconditional(&self) -> bool {
        self.condition.kind == ConditionKind::None
    }

    /// `magnitude × level`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled_magnitude(&self) -> f32 {
        self.magnitude * self.level as f32
    }
}

/// The talents available to one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentTree {
    /// The skill.
    pub skill: Tag,
    /// Talent definitions.
    pub talents: Vec<SkillTalent>,
}

impl TalentTree {
    /// Definition of `talent` in this tree.
    #[must_use]
    pub fn get(&self, talent: &Tag) -> Option<&SkillTalent> {
        self.talents.iter().find(|t| t.talent.matches_exact(talent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Tag {
        Tag::parse_detached(name).unwrap()
    }

    #[test]
    fn minimal_json_talent_uses_defaults() {
        let json = r#"{
            "skill": "Abilities.Fire.Firebolt",
            "talent": "Talents.Firebolt.MoreProjectiles",
            "talent_type": "AttributeAdditive",
            "magnitude": 1.0,
            "attribute": "Skills.Attributes.MaxProjectiles"
        }"#;
        let talent: SkillTalent = serde_json::from_str(json).unwrap();
        assert_eq!(talent.level, 1);
        assert_eq!(talent.max_level, 1);
        assert!(talent.is_unconditional());
        assert!(talent.condition.percent_of_max);
        assert!(talent.modifies(&tag("Skills.Attributes.MaxProjectiles")));
        assert!(!talent.modifies(&tag("Skills.Attributes")));
    }

    #[test]
    fn scaled_magnitude_uses_level() {
        let talent = SkillTalent {
            skill: tag("Abilities.Fire.Firebolt"),
            talent: tag("Talents.Firebolt.Heat"),
            level: 3,
            max_level: 5,
            talent_type: TalentType::AttributeMultiplicative,
            magnitude: 10.0,
            attribute: Some(tag("Damage.Fire")),
            condition: TalentCondition::default(),
            effect: None,
        };
        assert!((talent.scaled_magnitude() - 30.0).abs() < 0.0001);
    }

    #[test]
    fn threshold_kinds() {
        assert!(ConditionKind::TargetAttributeBelow.is_attribute_threshold());
        assert!(!ConditionKind::TargetHasTag.is_attribute_threshold());
        assert!(!ConditionKind::None.is_attribute_threshold());
    }
}
