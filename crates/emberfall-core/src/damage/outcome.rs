//! What the pipeline reports after resolving a hit.

use glam::Vec3;
use lattice::Tag;
use serde::{Deserialize, Serialize};

use crate::entity::ActorId;

/// A debuff that landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebuffOutcome {
    /// Damage type that carried it.
    pub damage_type: Tag,
    /// The debuff tag (e.g. `Debuff.Burn`).
    pub debuff: Tag,
    /// Damage per tick.
    pub damage: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Seconds between ticks.
    pub frequency: f32,
}

/// Result of one resolved hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitOutcome {
    /// Attacker.
    pub source: Option<ActorId>,
    /// Receiver.
    pub target: Option<ActorId>,
    /// Final incoming damage.
    pub damage: f32,
    /// Whether the hit was blocked (damage halved).
    pub blocked: bool,
    /// Whether the hit was critical.
    pub critical: bool,
    /// The debuff that landed, if any.
    pub debuff: Option<DebuffOutcome>,
    /// Per-type damage after resistances, talents and radial falloff.
    pub damage_by_type: Vec<(Tag, f32)>,
    /// Knockback to apply if the receiver survives.
    pub knockback_force: Vec3,
    /// Impulse to apply if the receiver dies.
    pub death_impulse: Vec3,
    /// Whether the hit was area damage.
    pub radial: bool,
}

impl HitOutcome {
    /// Returns true if any damage remains.
    #[must_use]
    pub fn dealt_damage(&self) -> bool {
        self.damage > 0.0
    }
}

/// One damage type's share of an area hit, handed to the world to apply
/// falloff against the receiver's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialDamageRequest {
    /// Attacker.
    pub source: Option<ActorId>,
    /// Damage type.
    pub damage_type: Tag,
    /// Damage before falloff.
    pub base_damage: f32,
    /// Centre of the sphere.
    pub origin: Vec3,
    /// Full damage inside this radius.
    pub inner_radius: f32,
    /// No damage beyond this radius.
    pub outer_radius: f32,
}

impl RadialDamageRequest {
    /// Damage at `distance` from the origin: full inside the inner radius,
    /// linear falloff to zero at the outer radius, `None` beyond it.
    #[must_use]
    pub fn damage_at(&self, distance: f32) -> Option<f32> {
        if distance > self.outer_radius {
            return None;
        }
        if distance <= self.inner_radius {
            return Some(self.base_damage);
        }
        let span = self.outer_radius - self.inner_radius;
        if span <= 0.0 {
            return Some(self.base_damage);
        }
        let scale = 1.0 - (distance - self.inner_radius) / span;
        Some(self.base_damage * scale.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RadialDamageRequest {
        RadialDamageRequest {
            source: None,
            damage_type: Tag::parse_detached("Damage.Arcane").unwrap(),
            base_damage: 40.0,
            origin: Vec3::ZERO,
            inner_radius: 50.0,
            outer_radius: 250.0,
        }
    }

    #[test]
    fn falloff_is_linear_between_radii() {
        let request = request();
        assert_eq!(request.damage_at(10.0), Some(40.0));
        assert!((request.damage_at(150.0).unwrap() - 20.0).abs() < 0.0001);
        assert!(request.damage_at(250.0).unwrap().abs() < 0.0001);
        assert_eq!(request.damage_at(251.0), None);
    }
}
