//! Error types for the combat core.
//!
//! Two families are kept apart:
//!
//! - [`ConfigError`]: the static data is wrong (a missing capture definition,
//!   a missing curve). These are programming/content errors and are never
//!   defaulted away.
//! - [`AbilityError`], [`TalentError`], [`ProgressionError`]: a request was
//!   invalid for the current state. The operation is rejected and nothing
//!   changes.
//!
//! [`SessionError`] wraps all of them for the end-to-end [`CombatSession`]
//! API.
//!
//! [`CombatSession`]: crate::session::CombatSession

use lattice::{Tag, TagError};

use crate::ability::AbilityStatus;
use crate::entity::ActorId;

/// Static game data is inconsistent.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A damage type or condition referenced an attribute with no capture
    /// definition.
    #[error("no capture definition for attribute `{0}`")]
    MissingCapture(Tag),

    /// A damage type has no resistance mapping.
    #[error("damage type `{0}` has no resistance mapping")]
    MissingResistance(Tag),

    /// A coefficient curve is absent from the curve table.
    #[error("coefficient curve `{0}` not found")]
    MissingCurve(String),

    /// Game data references a skill that has no damage defaults.
    #[error("no damage defaults for skill `{0}`")]
    UnknownSkill(Tag),

    /// A tag in the data is not registered.
    #[error(transparent)]
    Tag(#[from] TagError),

    /// The data could not be parsed.
    #[error("malformed game data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// An ability request was invalid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbilityError {
    /// The character does not have the ability at all.
    #[error("ability `{0}` has not been granted")]
    NotGranted(Tag),

    /// Equip was requested for an ability that is not Unlocked or Equipped.
    #[error("ability `{ability}` cannot be equipped while {status}")]
    NotEquippable {
        /// The ability.
        ability: Tag,
        /// Its current status.
        status: AbilityStatus,
    },

    /// Activation was requested for an ability that is not usable yet.
    #[error("ability `{ability}` cannot be activated while {status}")]
    NotActivatable {
        /// The ability.
        ability: Tag,
        /// Its current status.
        status: AbilityStatus,
    },

    /// A spell point was spent on a Locked ability.
    #[error("ability `{0}` is locked")]
    NotUnlockable(Tag),

    /// No spell points are available.
    #[error("no spell points available")]
    NoSpellPoints,
}

/// A talent request was invalid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TalentError {
    /// The talent has not been taken.
    #[error("talent `{0}` has not been taken")]
    NotTaken(Tag),

    /// The talent is not part of the skill's tree.
    #[error("talent `{talent}` is not in the tree of `{skill}`")]
    UnknownTalent {
        /// The skill whose tree was searched.
        skill: Tag,
        /// The requested talent.
        talent: Tag,
    },

    /// Raising the level would exceed the maximum.
    #[error("talent `{talent}` is already at max level {max}")]
    AtMaxLevel {
        /// The talent.
        talent: Tag,
        /// Its maximum level.
        max: u32,
    },

    /// Lowering the level would go below zero.
    #[error("talent `{0}` cannot go below level 0")]
    BelowZero(Tag),

    /// Not enough spell points for the change.
    #[error("no spell points available")]
    NoSpellPoints,
}

/// A progression request was invalid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// No attribute points to spend.
    #[error("no attribute points available")]
    NoAttributePoints,

    /// Not enough spell points.
    #[error("needed {needed} spell points, have {available}")]
    NotEnoughSpellPoints {
        /// Points required.
        needed: u32,
        /// Points held.
        available: u32,
    },
}

/// Error from an end-to-end [`CombatSession`](crate::session::CombatSession)
/// operation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// No actor with that id.
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    /// The actor exists but is not a player.
    #[error("actor {0} is not player controlled")]
    NotPlayer(ActorId),

    /// The actor exists but has no ability component.
    #[error("actor {0} has no ability component")]
    NoAbilities(ActorId),

    /// Static data problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Ability request problem.
    #[error(transparent)]
    Ability(#[from] AbilityError),

    /// Talent request problem.
    #[error(transparent)]
    Talent(#[from] TalentError),

    /// Progression request problem.
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}
