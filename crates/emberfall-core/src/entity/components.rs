//! Component structs for actor kinds.
//!
//! Each actor kind stores its state as a concrete struct. Shared pieces
//! ([`TransformState`], [`CombatState`]) are embedded rather than looked up,
//! so capability queries on [`Actor`](super::Actor) are plain field accesses.

use std::collections::BTreeMap;

use glam::Vec3;
use lattice::{Tag, TagContainer};
use serde::{Deserialize, Serialize};

use super::{ActorId, Faction};
use crate::progression::PlayerProgression;

// =============================================================================
// Shared Components
// =============================================================================

/// World placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World-space location (Z up).
    pub location: Vec3,
    /// Accumulated velocity; knockback and death impulses are added here.
    pub velocity: Vec3,
}

impl TransformState {
    /// A stationary transform at `location`.
    #[must_use]
    pub const fn at(location: Vec3) -> Self {
        Self {
            location,
            velocity: Vec3::ZERO,
        }
    }
}

/// Attribute values keyed by attribute tag.
///
/// Missing attributes read as zero, matching an attribute set whose field was
/// never initialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    values: BTreeMap<Tag, f32>,
}

impl AttributeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, attribute: &Tag, value: f32) -> Self {
        self.set(attribute, value);
        self
    }

    /// Returns the value if the attribute is present.
    #[must_use]
    pub fn get(&self, attribute: &Tag) -> Option<f32> {
        self.values.get(attribute).copied()
    }

    /// Returns the value, or zero.
    #[must_use]
    pub fn value(&self, attribute: &Tag) -> f32 {
        self.get(attribute).unwrap_or(0.0)
    }

    /// Sets an attribute.
    pub fn set(&mut self, attribute: &Tag, value: f32) {
        self.values.insert(attribute.clone(), value);
    }

    /// Adds `delta` to an attribute (missing counts as zero).
    pub fn add(&mut self, attribute: &Tag, delta: f32) -> f32 {
        let slot = self.values.entry(attribute.clone()).or_insert(0.0);
        *slot += delta;
        *slot
    }

    /// Iterates attributes in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, f32)> {
        self.values.iter().map(|(tag, value)| (tag, *value))
    }
}

/// State of anything that can be hit, killed and debuffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Combat level used for coefficient lookups.
    pub level: u32,
    /// Attribute values (vitals, secondary stats, resistances).
    pub attributes: AttributeSet,
    /// Owned gameplay tags (active debuffs, statuses).
    pub tags: TagContainer,
    /// Faction flags for hostility checks.
    pub faction: Faction,
    /// Set once health reaches zero.
    pub dead: bool,
    /// The actor that represents this one in the world, if different.
    ///
    /// Targeting deduplicates by avatar, so a controller and its pawn are
    /// never picked twice.
    pub avatar: Option<ActorId>,
}

impl CombatState {
    /// A living level-1 combatant of `faction` with the given attributes.
    #[must_use]
    pub fn new(faction: Faction, attributes: AttributeSet) -> Self {
        Self {
            level: 1,
            attributes,
            tags: TagContainer::new(),
            faction,
            dead: false,
            avatar: None,
        }
    }

    /// Builder-style level setter.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new(Faction::empty(), AttributeSet::new())
    }
}

// =============================================================================
// Per-kind Components
// =============================================================================

/// Components for player-controlled characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerComponents {
    /// World placement.
    pub transform: TransformState,
    /// Combat state.
    pub combat: CombatState,
    /// Level, XP and unspent points.
    pub progression: PlayerProgression,
}

/// Components for hostile AI characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// World placement.
    pub transform: TransformState,
    /// Combat state.
    pub combat: CombatState,
    /// XP granted to the killer.
    pub xp_reward: u32,
}

/// Components for non-combat world objects (pots, torches, pickups).
///
/// Props occupy space and show up in overlap queries but cannot be targeted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PropComponents {
    /// World placement.
    pub transform: TransformState,
}
