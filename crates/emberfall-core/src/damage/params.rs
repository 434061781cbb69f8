//! The parameter bundle describing one damage application.

use glam::Vec3;
use lattice::Tag;
use serde::{Deserialize, Serialize};

use crate::entity::ActorId;

use super::roll::{roll_succeeds, RollSource};

/// Falloff sphere for area damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialDamage {
    /// Full damage inside this radius.
    pub inner_radius: f32,
    /// No damage beyond this radius.
    pub outer_radius: f32,
    /// Centre of the sphere.
    pub origin: Vec3,
}

/// Everything a skill hands to the damage pipeline for one hit.
///
/// Base magnitudes per damage type and the `skill_*` overrides have already
/// been through the skill's unconditional talents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEffectParams {
    /// Attacker.
    pub source: Option<ActorId>,
    /// Receiver.
    pub target: Option<ActorId>,
    /// Skill that produced the hit; its talents apply.
    pub skill: Option<Tag>,
    /// Base magnitude per damage type, in insertion order.
    pub damage: Vec<(Tag, f32)>,
    /// Level of the ability.
    pub ability_level: u32,
    /// Percent chance to apply the damage type's debuff.
    pub debuff_chance: f32,
    /// Damage per debuff tick.
    pub debuff_damage: f32,
    /// Debuff duration in seconds.
    pub debuff_duration: f32,
    /// Seconds between debuff ticks.
    pub debuff_frequency: f32,
    /// Strength of the impulse on a killing blow.
    pub death_impulse_magnitude: f32,
    /// Impulse applied on a killing blow.
    pub death_impulse: Vec3,
    /// Strength of a knockback.
    pub knockback_force_magnitude: f32,
    /// Percent chance to knock back.
    pub knockback_chance: f32,
    /// Knockback applied on a surviving hit; zero when the roll failed.
    pub knockback_force: Vec3,
    /// Area damage, if any.
    pub radial: Option<RadialDamage>,
    /// Added to the attacker's critical hit chance.
    pub skill_critical_hit_chance: f32,
    /// Added to the attacker's critical hit damage.
    pub skill_critical_hit_damage: f32,
    /// Added to the attacker's armor penetration.
    pub skill_armor_penetration: f32,
}

impl DamageEffectParams {
    /// An empty level-1 hit from `source` to `target`.
    #[must_use]
    pub fn new(source: Option<ActorId>, target: Option<ActorId>) -> Self {
        Self {
            source,
            target,
            skill: None,
            damage: Vec::new(),
            ability_level: 1,
            debuff_chance: 0.0,
            debuff_damage: 0.0,
            debuff_duration: 0.0,
            debuff_frequency: 0.0,
            death_impulse_magnitude: 0.0,
            death_impulse: Vec3::ZERO,
            knockback_force_magnitude: 0.0,
            knockback_chance: 0.0,
            knockback_force: Vec3::ZERO,
            radial: None,
            skill_critical_hit_chance: 0.0,
            skill_critical_hit_damage: 0.0,
            skill_armor_penetration: 0.0,
        }
    }

    /// Builder-style [`set_damage`](Self::set_damage).
    #[must_use]
    pub fn with_damage(mut self, damage_type: &Tag, magnitude: f32) -> Self {
        self.set_damage(damage_type, magnitude);
        self
    }

    /// Builder-style skill setter.
    #[must_use]
    pub fn with_skill(mut self, skill: &Tag) -> Self {
        self.skill = Some(skill.clone());
        self
    }

    /// Sets the magnitude for one damage type, replacing any earlier value.
    pub fn set_damage(&mut self, damage_type: &Tag, magnitude: f32) {
        match self.damage.iter_mut().find(|(tag, _)| tag == damage_type) {
            Some(entry) => entry.1 = magnitude,
            None => self.damage.push((damage_type.clone(), magnitude)),
        }
    }

    /// Magnitude set for `damage_type`, if any.
    #[must_use]
    pub fn damage_for(&self, damage_type: &Tag) -> Option<f32> {
        self.damage
            .iter()
            .find(|(tag, _)| tag == damage_type)
            .map(|(_, magnitude)| *magnitude)
    }

    /// Rolls the knockback chance and, on success, points the knockback
    /// along `direction`. Consumes one percent roll.
    pub fn roll_knockback<R: RollSource + ?Sized>(&mut self, rolls: &mut R, direction: Vec3) -> bool {
        let knocked = roll_succeeds(rolls.roll_percent(), self.knockback_chance);
        self.knockback_force = if knocked {
            direction.normalize_or_zero() * self.knockback_force_magnitude
        } else {
            Vec3::ZERO
        };
        knocked
    }
}
