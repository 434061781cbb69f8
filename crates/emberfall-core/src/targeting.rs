//! Stateless spatial helpers used by skills to pick directions and targets.
//!
//! # Architecture
//!
//! Everything here is a pure function over plain values or over the two
//! world traits:
//!
//! - [`SpatialQuery`]: which actors overlap a sphere
//! - [`CombatantLookup`]: the combat view of one actor
//!
//! [`crate::arena::Arena`] implements both; tests use small in-memory worlds.
//!
//! # Example
//!
//! ```
//! use emberfall_core::targeting::{evenly_spaced_directions, nearest_k_targets};
//! use glam::Vec3;
//!
//! let fan = evenly_spaced_directions(Vec3::X, Vec3::Z, 90.0, 3);
//! assert_eq!(fan.len(), 3);
//! assert!((fan[1] - Vec3::X).length() < 0.0001);
//!
//! let points = [Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)];
//! let nearest = nearest_k_targets(&points, Vec3::ZERO, 2);
//! assert_eq!(nearest, vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)]);
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::entity::{ActorId, Faction};

// =============================================================================
// Directions
// =============================================================================

fn rotate_about(vector: Vec3, degrees: f32, axis: Vec3) -> Vec3 {
    let axis = axis.try_normalize().unwrap_or(Vec3::Z);
    Quat::from_axis_angle(axis, degrees.to_radians()) * vector
}

/// `count` directions fanned evenly across `spread_degrees`, centred on
/// `forward`.
///
/// The fan starts at `forward` rotated by `-spread/2` about `axis` and steps
/// by `spread / (count - 1)` about the world up axis. A `count` of 0 or 1
/// yields `[forward]`.
#[must_use]
pub fn evenly_spaced_directions(
    forward: Vec3,
    axis: Vec3,
    spread_degrees: f32,
    count: usize,
) -> Vec<Vec3> {
    if count <= 1 {
        return vec![forward];
    }
    let left_of_spread = rotate_about(forward, -spread_degrees / 2.0, axis);
    #[allow(clippy::cast_precision_loss)]
    let delta = spread_degrees / (count - 1) as f32;
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = delta * i as f32;
            rotate_about(left_of_spread, angle, Vec3::Z)
        })
        .collect()
}

/// Orientation looking along `direction`, built from yaw and pitch only.
#[must_use]
pub fn look_rotation(direction: Vec3) -> Quat {
    let yaw = direction.y.atan2(direction.x);
    let pitch = direction.z.atan2(direction.x.hypot(direction.y));
    Quat::from_rotation_z(yaw) * Quat::from_rotation_y(-pitch)
}

/// Same fan as [`evenly_spaced_directions`], as orientations.
#[must_use]
pub fn evenly_spaced_rotations(
    forward: Vec3,
    axis: Vec3,
    spread_degrees: f32,
    count: usize,
) -> Vec<Quat> {
    evenly_spaced_directions(forward, axis, spread_degrees, count)
        .into_iter()
        .map(look_rotation)
        .collect()
}

/// Direction from `from` to `to`, optionally forced to a fixed pitch in
/// degrees. Zero when the points coincide.
#[must_use]
pub fn aim_direction(from: Vec3, to: Vec3, pitch_override: Option<f32>) -> Vec3 {
    let delta = to - from;
    match pitch_override {
        None => delta.normalize_or_zero(),
        Some(pitch) => {
            if delta.x == 0.0 && delta.y == 0.0 {
                return Vec3::ZERO;
            }
            let yaw = delta.y.atan2(delta.x);
            let pitch = pitch.to_radians();
            Vec3::new(pitch.cos() * yaw.cos(), pitch.cos() * yaw.sin(), pitch.sin())
        }
    }
}

// =============================================================================
// Target Selection
// =============================================================================

/// Anything with a world location.
pub trait Locatable {
    /// World location.
    fn location(&self) -> Vec3;
}

impl Locatable for Vec3 {
    fn location(&self) -> Vec3 {
        *self
    }
}

/// A live actor that may be targeted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetCandidate {
    /// The actor (already resolved to its avatar).
    pub actor: ActorId,
    /// Where it stands.
    pub location: Vec3,
    /// Its faction flags.
    pub faction: Faction,
}

impl Locatable for TargetCandidate {
    fn location(&self) -> Vec3 {
        self.location
    }
}

/// The `k` candidates closest to `origin`, nearest first.
///
/// If there are at most `k` candidates all of them are returned in input
/// order. Ties go to the candidate seen first.
#[must_use]
pub fn nearest_k_targets<T: Locatable + Clone>(candidates: &[T], origin: Vec3, k: usize) -> Vec<T> {
    if candidates.len() <= k {
        return candidates.to_vec();
    }
    let mut remaining = candidates.to_vec();
    let mut picked = Vec::with_capacity(k);
    while picked.len() < k {
        let Some(index) = closest_index(&remaining, origin) else {
            break;
        };
        picked.push(remaining.remove(index));
    }
    picked
}

/// The candidate closest to `origin`; ties go to the first seen.
#[must_use]
pub fn nearest_target<T: Locatable + Clone>(candidates: &[T], origin: Vec3) -> Option<T> {
    closest_index(candidates, origin).map(|index| candidates[index].clone())
}

fn closest_index<T: Locatable>(candidates: &[T], origin: Vec3) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let distance = candidate.location().distance(origin);
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Returns true unless both factions are players or both are enemies.
#[must_use]
pub fn is_hostile(a: Faction, b: Faction) -> bool {
    let both_players = a.contains(Faction::PLAYER) && b.contains(Faction::PLAYER);
    let both_enemies = a.contains(Faction::ENEMY) && b.contains(Faction::ENEMY);
    !(both_players || both_enemies)
}

// =============================================================================
// World Queries
// =============================================================================

/// Sphere overlap against the world.
pub trait SpatialQuery {
    /// Actors whose location lies within `radius` of `origin`, in id order.
    fn overlap_sphere(&self, origin: Vec3, radius: f32) -> Vec<ActorId>;
}

/// The combat-relevant view of an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatantView {
    /// Actor that stands in for this one.
    pub avatar: ActorId,
    /// Location of the avatar.
    pub location: Vec3,
    /// Faction flags.
    pub faction: Faction,
    /// Death state.
    pub dead: bool,
}

/// Resolves actors to their combat view.
pub trait CombatantLookup {
    /// `None` for unknown actors and actors without the combat capability.
    fn combatant(&self, actor: ActorId) -> Option<CombatantView>;
}

/// Every live combatant within `radius` of `origin`, by avatar.
///
/// Actors in `ignore`, non-combatants and dead combatants are skipped.
/// Each avatar appears once.
pub fn live_actors_within_radius<W>(
    world: &W,
    origin: Vec3,
    radius: f32,
    ignore: &[ActorId],
) -> Vec<TargetCandidate>
where
    W: SpatialQuery + CombatantLookup + ?Sized,
{
    let mut found: Vec<TargetCandidate> = Vec::new();
    for actor in world.overlap_sphere(origin, radius) {
        if ignore.contains(&actor) {
            continue;
        }
        let Some(view) = world.combatant(actor) else {
            continue;
        };
        if view.dead || found.iter().any(|c| c.actor == view.avatar) {
            continue;
        }
        found.push(TargetCandidate {
            actor: view.avatar,
            location: view.location,
            faction: view.faction,
        });
    }
    found
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 0.0001
    }

    mod direction_tests {
        use super::*;

        #[test]
        fn fan_of_three_over_ninety_degrees() {
            let fan = evenly_spaced_directions(Vec3::X, Vec3::Z, 90.0, 3);
            let diagonal = std::f32::consts::FRAC_1_SQRT_2;
            assert!(close(fan[0], Vec3::new(diagonal, -diagonal, 0.0)));
            assert!(close(fan[1], Vec3::X));
            assert!(close(fan[2], Vec3::new(diagonal, diagonal, 0.0)));
        }

        #[test]
        fn single_or_zero_count_returns_forward() {
            let forward = Vec3::new(0.0, 1.0, 0.0);
            assert_eq!(evenly_spaced_directions(forward, Vec3::Z, 45.0, 1), vec![forward]);
            assert_eq!(evenly_spaced_directions(forward, Vec3::Z, 45.0, 0), vec![forward]);
        }

        #[test]
        fn rotations_look_along_directions() {
            let rotations = evenly_spaced_rotations(Vec3::X, Vec3::Z, 60.0, 4);
            let directions = evenly_spaced_directions(Vec3::X, Vec3::Z, 60.0, 4);
            for (rotation, direction) in rotations.iter().zip(&directions) {
                assert!(close(*rotation * Vec3::X, direction.normalize()));
            }
        }

        #[test]
        fn look_rotation_handles_pitch() {
            let direction = Vec3::new(1.0, 1.0, 1.0).normalize();
            assert!(close(look_rotation(direction) * Vec3::X, direction));
        }

        #[test]
        fn aim_with_pitch_override() {
            let flat = aim_direction(Vec3::ZERO, Vec3::new(10.0, 0.0, 5.0), Some(0.0));
            assert!(close(flat, Vec3::X));
            let raised = aim_direction(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), Some(90.0));
            assert!(close(raised, Vec3::Z));
            assert_eq!(aim_direction(Vec3::ONE, Vec3::ONE, None), Vec3::ZERO);
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn returns_everything_when_k_covers_all() {
            let points = [Vec3::new(9.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
            assert_eq!(nearest_k_targets(&points, Vec3::ZERO, 2), points.to_vec());
            assert_eq!(nearest_k_targets(&points, Vec3::ZERO, 5), points.to_vec());
        }

        #[test]
        fn ties_go_to_first_seen() {
            let a = TargetCandidate {
                actor: ActorId::new(1),
                location: Vec3::new(2.0, 0.0, 0.0),
                faction: Faction::ENEMY,
            };
            let b = TargetCandidate { actor: ActorId::new(2), location: Vec3::new(-2.0, 0.0, 0.0), ..a };
            let c = TargetCandidate { actor: ActorId::new(3), location: Vec3::new(7.0, 0.0, 0.0), ..a };
            let picked = nearest_k_targets(&[c, a, b], Vec3::ZERO, 1);
            assert_eq!(picked[0].actor, ActorId::new(1));
            assert_eq!(nearest_target(&[b, a], Vec3::ZERO).map(|t| t.actor), Some(ActorId::new(2)));
        }

        #[test]
        fn nearest_of_empty_is_none() {
            let empty: [Vec3; 0] = [];
            assert!(nearest_target(&empty, Vec3::ZERO).is_none());
            assert!(nearest_k_targets(&empty, Vec3::ZERO, 0).is_empty());
        }

        #[test]
        fn hostility_table() {
            assert!(!is_hostile(Faction::PLAYER, Faction::PLAYER));
            assert!(!is_hostile(Faction::ENEMY, Faction::ENEMY));
            assert!(is_hostile(Faction::PLAYER, Faction::ENEMY));
            assert!(is_hostile(Faction::empty(), Faction::empty()));
        }
    }

    mod world_tests {
        use super::*;

        struct TinyWorld(BTreeMap<ActorId, CombatantView>);

        impl SpatialQuery for TinyWorld {
            fn overlap_sphere(&self, origin: Vec3, radius: f32) -> Vec<ActorId> {
                self.0
                    .iter()
                    .filter(|(_, view)| view.location.distance(origin) <= radius)
                    .map(|(id, _)| *id)
                    .collect()
            }
        }

        impl CombatantLookup for TinyWorld {
            fn combatant(&self, actor: ActorId) -> Option<CombatantView> {
                self.0.get(&actor).copied()
            }
        }

        fn view(avatar: u64, x: f32, dead: bool) -> CombatantView {
            CombatantView {
                avatar: ActorId::new(avatar),
                location: Vec3::new(x, 0.0, 0.0),
                faction: Faction::ENEMY,
                dead,
            }
        }

        #[test]
        fn skips_dead_ignored_and_duplicate_avatars() {
            let mut actors = BTreeMap::new();
            actors.insert(ActorId::new(1), view(1, 1.0, false));
            actors.insert(ActorId::new(2), view(2, 2.0, true));
            actors.insert(ActorId::new(3), view(3, 3.0, false));
            actors.insert(ActorId::new(4), view(1, 1.0, false));
            actors.insert(ActorId::new(5), view(5, 50.0, false));
            let world = TinyWorld(actors);

            let found = live_actors_within_radius(&world, Vec3::ZERO, 10.0, &[ActorId::new(3)]);
            let ids: Vec<_> = found.iter().map(|c| c.actor).collect();
            assert_eq!(ids, vec![ActorId::new(1)]);
        }
    }
}
