//! Per-skill damage defaults and the params builder.

use glam::Vec3;
use lattice::Tag;
use serde::{Deserialize, Serialize};

use crate::damage::curves::CoefficientCurve;
use crate::damage::params::{DamageEffectParams, RadialDamage};
use crate::damage::roll::RollSource;
use crate::entity::ActorId;
use crate::tags::NativeTags;
use crate::talent::SkillTalents;
use crate::targeting::aim_direction;

use super::chain::BeamChain;
use super::volley::ProjectileVolley;

/// Area settings for a skill that explodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialDamageConfig {
    /// Full damage inside this radius.
    pub inner_radius: f32,
    /// No damage beyond this radius.
    pub outer_radius: f32,
}

/// Static damage configuration of one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageSkill {
    /// Skill (ability) tag.
    pub skill: Tag,
    /// Damage type dealt.
    pub damage_type: Tag,
    /// Base damage by ability level.
    pub damage: CoefficientCurve,
    /// Percent chance to apply the damage type's debuff.
    #[serde(default)]
    pub debuff_chance: f32,
    /// Damage per debuff tick.
    #[serde(default)]
    pub debuff_damage: f32,
    /// Debuff duration in seconds.
    #[serde(default)]
    pub debuff_duration: f32,
    /// Seconds between debuff ticks.
    #[serde(default)]
    pub debuff_frequency: f32,
    /// Strength of the impulse on a killing blow.
    #[serde(default)]
    pub death_impulse_magnitude: f32,
    /// Strength of a knockback.
    #[serde(default)]
    pub knockback_force_magnitude: f32,
    /// Percent chance to knock back.
    #[serde(default)]
    pub knockback_chance: f32,
    /// Fixed pitch in degrees for the hit direction.
    #[serde(default)]
    pub pitch_override: Option<f32>,
    /// Area damage, if the skill explodes.
    #[serde(default)]
    pub radial: Option<RadialDamageConfig>,
    /// Set for projectile skills.
    #[serde(default)]
    pub volley: Option<ProjectileVolley>,
    /// Set for chaining beam skills.
    #[serde(default)]
    pub beam: Option<BeamChain>,
}

/// Where and at whom a skill is being used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillUse {
    /// Attacker.
    pub source: Option<ActorId>,
    /// Attacker location.
    pub source_location: Vec3,
    /// Receiver.
    pub target: Option<ActorId>,
    /// Receiver location, if there is one.
    pub target_location: Option<Vec3>,
    /// Level of the ability.
    pub ability_level: u32,
    /// Centre for area damage; defaults to the receiver, then the attacker.
    pub radial_origin: Option<Vec3>,
}

impl DamageSkill {
    /// Builds the params for one use of the skill.
    ///
    /// Every base value goes through the attacker's unconditional talents
    /// for this skill. The skill-level crit chance, crit damage and armor
    /// penetration overrides start from zero. When there is a receiver the
    /// death impulse points at it and one percent roll decides knockback.
    pub fn make_params<R: RollSource + ?Sized>(
        &self,
        skill_use: &SkillUse,
        talents: SkillTalents<'_>,
        tags: &NativeTags,
        rolls: &mut R,
    ) -> DamageEffectParams {
        let modified = |base: f32, attribute: &Tag| talents.compute_modifier(base, attribute);

        let mut params = DamageEffectParams::new(skill_use.source, skill_use.target)
            .with_skill(&self.skill);
        params.ability_level = skill_use.ability_level;
        params.set_damage(
            &self.damage_type,
            modified(self.damage.at_level(skill_use.ability_level), &self.damage_type),
        );

        params.debuff_chance = modified(self.debuff_chance, &tags.debuff_chance);
        params.debuff_damage = modified(self.debuff_damage, &tags.debuff_damage);
        params.debuff_duration = modified(self.debuff_duration, &tags.debuff_duration);
        params.debuff_frequency = modified(self.debuff_frequency, &tags.debuff_frequency);

        params.knockback_chance = modified(self.knockback_chance, &tags.skill_knockback_chance);
        params.knockback_force_magnitude =
            modified(self.knockback_force_magnitude, &tags.skill_knockback_force);

        params.skill_critical_hit_chance = modified(0.0, &tags.skill_critical_hit_chance);
        params.skill_critical_hit_damage = modified(0.0, &tags.skill_critical_hit_damage);
        params.skill_armor_penetration = modified(0.0, &tags.skill_armor_penetration);

        params.death_impulse_magnitude = self.death_impulse_magnitude;
        if let Some(target_location) = skill_use.target_location {
            let direction =
                aim_direction(skill_use.source_location, target_location, self.pitch_override);
            params.death_impulse = direction * self.death_impulse_magnitude;
            params.roll_knockback(rolls, direction);
        }

        if let Some(radial) = self.radial {
            params.radial = Some(RadialDamage {
                inner_radius: radial.inner_radius,
                outer_radius: radial.outer_radius,
                origin: skill_use
                    .radial_origin
                    .or(skill_use.target_location)
                    .unwrap_or(skill_use.source_location),
            });
        }
        params
    }
}
