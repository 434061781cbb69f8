//! Per-character ability records.

use std::fmt;

use lattice::Tag;
use serde::{Deserialize, Serialize};

use crate::entity::ActorId;

/// Lifecycle of an ability for one character.
///
/// Transitions only move forward: `Locked → Eligible → Unlocked → Equipped`.
/// Clearing a slot leaves the status untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityStatus {
    /// Not yet available at the character's level.
    Locked,
    /// Level requirement met; a spell point unlocks it.
    Eligible,
    /// Unlocked and upgradable, not bound to a slot.
    Unlocked,
    /// Bound (or previously bound) to an input slot.
    Equipped,
}

impl AbilityStatus {
    /// Unlocked and Equipped abilities can be equipped and activated.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Unlocked | Self::Equipped)
    }
}

impl fmt::Display for AbilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "Locked"),
            Self::Eligible => write!(f, "Eligible"),
            Self::Unlocked => write!(f, "Unlocked"),
            Self::Equipped => write!(f, "Equipped"),
        }
    }
}

/// Ability category from the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityType {
    /// Activated on input.
    Offensive,
    /// Always-on while equipped.
    Passive,
    /// Utility abilities granted at startup (hit react, summons).
    #[default]
    None,
}

/// One character's record for one ability.
///
/// # Invariants
///
/// - `level >= 1`
/// - At most one spec per `(owner, ability)`
/// - `slot` is unique among the owner's specs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySpec {
    /// Ability identity.
    pub ability: Tag,
    /// Upgrade level, starting at 1.
    pub level: u32,
    /// Lifecycle status.
    pub status: AbilityStatus,
    /// Input slot, if bound.
    pub slot: Option<Tag>,
    /// Owning character.
    pub owner: ActorId,
}

impl AbilitySpec {
    /// A level-1 spec with no slot.
    #[must_use]
    pub fn new(owner: ActorId, ability: Tag, status: AbilityStatus) -> Self {
        Self {
            ability,
            level: 1,
            status,
            slot: None,
            owner,
        }
    }

    /// Returns true if bound to exactly `slot`.
    #[must_use]
    pub fn has_slot(&self, slot: &Tag) -> bool {
        self.slot.as_ref().is_some_and(|own| own.matches_exact(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_statuses() {
        assert!(!AbilityStatus::Locked.is_usable());
        assert!(!AbilityStatus::Eligible.is_usable());
        assert!(AbilityStatus::Unlocked.is_usable());
        assert!(AbilityStatus::Equipped.is_usable());
    }

    #[test]
    fn spec_serializes_persistence_fields() {
        let mut spec = AbilitySpec::new(
            ActorId::new(3),
            Tag::parse_detached("Abilities.Fire.Firebolt").unwrap(),
            AbilityStatus::Equipped,
        );
        spec.slot = Some(Tag::parse_detached("InputTag.LMB").unwrap());
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["ability"], "Abilities.Fire.Firebolt");
        assert_eq!(json["level"], 1);
        assert_eq!(json["status"], "Equipped");
        assert_eq!(json["slot"], "InputTag.LMB");
        assert_eq!(json["owner"], 3);
    }
}
