//! Actor types for the combat core.
//!
//! - [`ActorId`]: unique identifier for actors
//! - [`ActorKind`]: coarse classification (player, enemy, prop)
//! - [`ActorInner`]: type-safe storage for kind-specific components
//! - [`Actor`]: the complete actor container
//!
//! # Capability Queries
//!
//! Gameplay code never downcasts. It asks an actor whether it supports a
//! capability and receives an `Option`:
//!
//! - [`Actor::as_combatant`]: anything with level, attributes and death state
//! - [`Actor::as_player`]: player-controlled characters with progression
//!
//! [`Actor::capabilities`] summarizes the same answers as [`Capabilities`]
//! flags for filtering.
//!
//! # Example
//!
//! ```
//! use emberfall_core::entity::{Actor, ActorId, ActorInner, ActorKind, Capabilities};
//! use emberfall_core::entity::components::{EnemyComponents, PropComponents};
//!
//! let enemy = Actor::new(ActorId::new(7), ActorInner::Enemy(EnemyComponents::default()));
//! assert_eq!(enemy.kind(), ActorKind::Enemy);
//! assert!(enemy.as_combatant().is_some());
//! assert!(enemy.as_player().is_none());
//!
//! let pot = Actor::new(ActorId::new(8), ActorInner::Prop(PropComponents::default()));
//! assert_eq!(pot.capabilities(), Capabilities::empty());
//! ```

pub mod components;

use std::fmt;

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use components::{
    AttributeSet, CombatState, EnemyComponents, PlayerComponents, PropComponents, TransformState,
};

/// Unique identifier for an actor.
///
/// Ordered by numeric value; every per-actor collection iterates in this
/// order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates an `ActorId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

bitflags! {
    /// Optional interfaces an actor supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        /// Has level, attributes, death state and an avatar.
        const COMBATANT = 1 << 0;
        /// Has progression (XP, spell points) and is driven by a player.
        const PLAYER_CONTROLLABLE = 1 << 1;
    }
}

bitflags! {
    /// Faction markers used by the hostility check.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Faction: u8 {
        /// Carried by player characters and their allies.
        const PLAYER = 1 << 0;
        /// Carried by hostile AI.
        const ENEMY = 1 << 1;
    }
}

/// Coarse actor classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Player-controlled character.
    Player,
    /// Hostile AI character.
    Enemy,
    /// Non-combat world object.
    Prop,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Prop => write!(f, "Prop"),
        }
    }
}

/// Type-safe storage for kind-specific components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorInner {
    /// Player components (transform, combat, progression)
    Player(PlayerComponents),
    /// Enemy components (transform, combat, XP reward)
    Enemy(EnemyComponents),
    /// Prop components (transform only)
    Prop(PropComponents),
}

impl ActorInner {
    /// Returns the kind matching this storage.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        match self {
            Self::Player(_) => ActorKind::Player,
            Self::Enemy(_) => ActorKind::Enemy,
            Self::Prop(_) => ActorKind::Prop,
        }
    }

    /// World placement, present on every kind.
    #[must_use]
    pub const fn transform(&self) -> &TransformState {
        match self {
            Self::Player(c) => &c.transform,
            Self::Enemy(c) => &c.transform,
            Self::Prop(c) => &c.transform,
        }
    }

    /// Mutable world placement.
    #[must_use]
    pub fn transform_mut(&mut self) -> &mut TransformState {
        match self {
            Self::Player(c) => &mut c.transform,
            Self::Enemy(c) => &mut c.transform,
            Self::Prop(c) => &mut c.transform,
        }
    }
}

/// A complete actor.
///
/// # Invariants
///
/// - The `ActorId` is unique within an arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    inner: ActorInner,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: ActorId, inner: ActorInner) -> Self {
        Self { id, inner }
    }

    /// The actor's id.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// The actor's kind.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.inner.kind()
    }

    /// Kind-specific storage.
    #[must_use]
    pub const fn inner(&self) -> &ActorInner {
        &self.inner
    }

    /// Mutable kind-specific storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut ActorInner {
        &mut self.inner
    }

    /// World location.
    #[must_use]
    pub const fn location(&self) -> Vec3 {
        self.inner.transform().location
    }

    /// Supported capabilities.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        match self.inner {
            ActorInner::Player(_) => Capabilities::COMBATANT | Capabilities::PLAYER_CONTROLLABLE,
            ActorInner::Enemy(_) => Capabilities::COMBATANT,
            ActorInner::Prop(_) => Capabilities::empty(),
        }
    }

    /// Combat state, if this actor is a combat participant.
    #[must_use]
    pub const fn as_combatant(&self) -> Option<&CombatState> {
        match &self.inner {
            ActorInner::Player(c) => Some(&c.combat),
            ActorInner::Enemy(c) => Some(&c.combat),
            ActorInner::Prop(_) => None,
        }
    }

    /// Mutable combat state, if this actor is a combat participant.
    #[must_use]
    pub fn as_combatant_mut(&mut self) -> Option<&mut CombatState> {
        match &mut self.inner {
            ActorInner::Player(c) => Some(&mut c.combat),
            ActorInner::Enemy(c) => Some(&mut c.combat),
            ActorInner::Prop(_) => None,
        }
    }

    /// Player components, if player controlled.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerComponents> {
        match &self.inner {
            ActorInner::Player(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable player components, if player controlled.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerComponents> {
        match &mut self.inner {
            ActorInner::Player(c) => Some(c),
            _ => None,
        }
    }

    /// Enemy components, if hostile AI.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        match &self.inner {
            ActorInner::Enemy(c) => Some(c),
            _ => None,
        }
    }

    /// Faction flags; empty for non-combatants.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.as_combatant()
            .map_or(Faction::empty(), |combat| combat.faction)
    }

    /// The actor standing in for this one, or itself.
    #[must_use]
    pub fn avatar(&self) -> ActorId {
        self.as_combatant()
            .and_then(|combat| combat.avatar)
            .unwrap_or(self.id)
    }
}
