//! Arena: storage for every actor taking part in combat.
//!
//! The Arena provides:
//! - Actor storage with deterministic iteration order (`BTreeMap`)
//! - Spatial indexing for sphere overlaps
//! - Actor lifecycle management (spawn/despawn)
//!
//! It is also the world the rest of the crate queries: it implements
//! [`SnapshotProvider`] for attribute capture, and [`SpatialQuery`] plus
//! [`CombatantLookup`] for targeting.
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is NOT updated when a location changes through
//! `get_mut()`. Call `update_spatial(id)` afterwards:
//!
//! ```
//! # use emberfall_core::arena::Arena;
//! # use emberfall_core::entity::{ActorInner, PropComponents};
//! # use glam::Vec3;
//! # let mut arena = Arena::new();
//! # let id = arena.spawn(ActorInner::Prop(PropComponents::default()));
//! if let Some(actor) = arena.get_mut(id) {
//!     actor.inner_mut().transform_mut().location = Vec3::new(500.0, 0.0, 0.0);
//! }
//! arena.update_spatial(id);
//! ```
//!
//! # Example
//!
//! ```
//! use emberfall_core::arena::Arena;
//! use emberfall_core::entity::{ActorInner, EnemyComponents, TransformState};
//! use emberfall_core::targeting::SpatialQuery;
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let goblin = arena.spawn(ActorInner::Enemy(EnemyComponents {
//!     transform: TransformState::at(Vec3::new(100.0, 200.0, 0.0)),
//!     ..EnemyComponents::default()
//! }));
//!
//! let nearby = arena.overlap_sphere(Vec3::new(100.0, 200.0, 0.0), 50.0);
//! assert!(nearby.contains(&goblin));
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::damage::capture::{CombatantSnapshot, SnapshotProvider};
use crate::entity::{Actor, ActorId, ActorInner};
use crate::targeting::{CombatantLookup, CombatantView, SpatialQuery};

// =============================================================================
// Spatial Index
// =============================================================================

/// Location index for sphere queries.
///
/// Lookups are by known id or full scan, and scan results are sorted before
/// they are returned, so the `HashMap` order never leaks out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    locations: HashMap<ActorId, Vec3>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locations: HashMap::new(),
        }
    }

    /// Inserts or updates an actor's location.
    pub fn insert(&mut self, id: ActorId, location: Vec3) {
        self.locations.insert(id, location);
    }

    /// Removes an actor from the index.
    pub fn remove(&mut self, id: ActorId) {
        self.locations.remove(&id);
    }

    /// The indexed location of an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<Vec3> {
        self.locations.get(&id).copied()
    }

    /// Actors within `radius` of `center` (boundary inclusive), sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        let radius_sq = radius * radius;
        let mut results: Vec<ActorId> = self
            .locations
            .iter()
            .filter(|(_, location)| center.distance_squared(**location) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();
        results.sort();
        results
    }

    /// Number of indexed actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Every actor in one combat session.
///
/// Ids are assigned monotonically and never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    actors: BTreeMap<ActorId, Actor>,
    spatial: SpatialIndex,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor and indexes its location.
    pub fn spawn(&mut self, inner: ActorInner) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.spatial.insert(id, inner.transform().location);
        self.actors.insert(id, Actor::new(id, inner));
        id
    }

    /// Removes an actor from storage and the index.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        self.spatial.remove(id);
        self.actors.remove(&id)
    }

    /// Looks up an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Looks up an actor for mutation.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Actor ids in ascending order.
    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Actors in ascending id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if the arena has no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// The spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Re-indexes an actor after its location changed.
    pub fn update_spatial(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get(&id) {
            self.spatial.insert(id, actor.location());
        }
    }
}

impl SnapshotProvider for Arena {
    fn snapshot(&self, actor: ActorId) -> Option<CombatantSnapshot> {
        let actor = self.get(actor)?;
        Some(match actor.as_combatant() {
            Some(combat) => CombatantSnapshot {
                level: Some(combat.level),
                attributes: combat.attributes.clone(),
                tags: combat.tags.clone(),
            },
            None => CombatantSnapshot::default(),
        })
    }
}

impl SpatialQuery for Arena {
    fn overlap_sphere(&self, origin: Vec3, radius: f32) -> Vec<ActorId> {
        self.spatial.query_radius(origin, radius)
    }
}

impl CombatantLookup for Arena {
    fn combatant(&self, actor: ActorId) -> Option<CombatantView> {
        let actor = self.get(actor)?;
        let combat = actor.as_combatant()?;
        let avatar = actor.avatar();
        let location = self.get(avatar).map_or(actor.location(), Actor::location);
        Some(CombatantView {
            avatar,
            location,
            faction: combat.faction,
            dead: combat.dead,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{
        AttributeSet, CombatState, EnemyComponents, Faction, PlayerComponents, PropComponents,
        TransformState,
    };
    use lattice::Tag;

    fn enemy_at(x: f32) -> ActorInner {
        ActorInner::Enemy(EnemyComponents {
            transform: TransformState::at(Vec3::new(x, 0.0, 0.0)),
            combat: CombatState::new(Faction::ENEMY, AttributeSet::new()),
            xp_reward: 10,
        })
    }

    mod spatial_index_tests {
        use super::*;

        #[test]
        fn query_radius_is_sorted_and_inclusive() {
            let mut index = SpatialIndex::new();
            index.insert(ActorId::new(5), Vec3::new(10.0, 0.0, 0.0));
            index.insert(ActorId::new(2), Vec3::new(0.0, 20.0, 0.0));
            index.insert(ActorId::new(8), Vec3::new(0.0, 0.0, 100.0));
            index.insert(ActorId::new(9), Vec3::new(0.0, 0.0, 101.0));

            let results = index.query_radius(Vec3::ZERO, 100.0);
            assert_eq!(results, vec![ActorId::new(2), ActorId::new(5), ActorId::new(8)]);
        }

        #[test]
        fn remove_deletes_entry() {
            let mut index = SpatialIndex::new();
            index.insert(ActorId::new(1), Vec3::ONE);
            index.remove(ActorId::new(1));
            assert!(index.get(ActorId::new(1)).is_none());
            assert!(index.is_empty());
        }
    }

    mod arena_tests {
        use super::*;

        #[test]
        fn spawn_assigns_monotonic_ids() {
            let mut arena = Arena::new();
            let a = arena.spawn(enemy_at(0.0));
            let b = arena.spawn(ActorInner::Prop(PropComponents::default()));
            assert!(a < b);
            assert_eq!(arena.actor_ids().collect::<Vec<_>>(), vec![a, b]);
            assert_eq!(arena.len(), 2);
        }

        #[test]
        fn despawn_removes_from_index() {
            let mut arena = Arena::new();
            let id = arena.spawn(enemy_at(0.0));
            assert!(arena.despawn(id).is_some());
            assert!(arena.overlap_sphere(Vec3::ZERO, 10.0).is_empty());
            assert!(arena.is_empty());
        }

        #[test]
        fn update_spatial_follows_moves() {
            let mut arena = Arena::new();
            let id = arena.spawn(enemy_at(0.0));
            if let Some(actor) = arena.get_mut(id) {
                actor.inner_mut().transform_mut().location = Vec3::new(500.0, 0.0, 0.0);
            }
            assert!(arena.overlap_sphere(Vec3::ZERO, 10.0).contains(&id));
            arena.update_spatial(id);
            assert!(arena.overlap_sphere(Vec3::ZERO, 10.0).is_empty());
            assert_eq!(arena.spatial().get(id), Some(Vec3::new(500.0, 0.0, 0.0)));
        }

        #[test]
        fn snapshot_copies_combat_state() {
            let mut arena = Arena::new();
            let armor = Tag::parse_detached("Attributes.Secondary.Armor").unwrap();
            let id = arena.spawn(ActorInner::Player(PlayerComponents {
                combat: CombatState::new(Faction::PLAYER, AttributeSet::new().with(&armor, 12.0))
                    .with_level(4),
                ..PlayerComponents::default()
            }));
            let snapshot = arena.snapshot(id).unwrap();
            assert_eq!(snapshot.level, Some(4));
            assert!((snapshot.attributes.value(&armor) - 12.0).abs() < 0.0001);

            let prop = arena.spawn(ActorInner::Prop(PropComponents::default()));
            assert_eq!(arena.snapshot(prop).unwrap().combat_level(), 1);
            assert!(arena.snapshot(ActorId::new(99)).is_none());
        }

        #[test]
        fn combatant_view_resolves_avatar() {
            let mut arena = Arena::new();
            let body = arena.spawn(enemy_at(30.0));
            let mut shell = enemy_at(0.0);
            if let ActorInner::Enemy(enemy) = &mut shell {
                enemy.combat.avatar = Some(body);
            }
            let shell = arena.spawn(shell);

            let view = arena.combatant(shell).unwrap();
            assert_eq!(view.avatar, body);
            assert!((view.location.x - 30.0).abs() < 0.0001);

            let prop = arena.spawn(ActorInner::Prop(PropComponents::default()));
            assert!(arena.combatant(prop).is_none());
        }
    }
}
