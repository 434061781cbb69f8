//! Projectile volleys: how many bolts a skill fires and where they go.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::damage::roll::RollSource;
use crate::entity::ActorId;
use crate::tags::NativeTags;
use crate::talent::SkillTalents;
use crate::targeting::{aim_direction, evenly_spaced_directions, look_rotation};

/// What a projectile steers toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HomingTarget {
    /// Follows a combatant.
    Actor(ActorId),
    /// Flies to a fixed point.
    Location(Vec3),
}

/// One projectile to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    /// Spawn location.
    pub origin: Vec3,
    /// Flight direction.
    pub direction: Vec3,
    /// Spawn orientation.
    pub rotation: Quat,
    /// Steering target.
    pub homing: HomingTarget,
    /// Whether the projectile steers at all.
    pub is_homing: bool,
    /// Steering acceleration.
    pub homing_acceleration: f32,
}

/// Volley settings of a projectile skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileVolley {
    /// Upper bound on projectiles per cast.
    pub max_projectiles: u32,
    /// Fan width in degrees.
    pub spread_degrees: f32,
    /// Whether projectiles steer toward their target.
    #[serde(default)]
    pub homing: bool,
    /// Lower bound of the random steering acceleration.
    #[serde(default)]
    pub homing_acceleration_min: f32,
    /// Upper bound of the random steering acceleration.
    #[serde(default)]
    pub homing_acceleration_max: f32,
    /// Fixed pitch in degrees for the volley's centre line.
    #[serde(default)]
    pub pitch_override: Option<f32>,
}

impl ProjectileVolley {
    /// Projectiles per cast: one plus talents on `Skills.Attributes.MaxProjectiles`,
    /// capped at `max_projectiles`.
    #[must_use]
    pub fn projectile_count(&self, talents: SkillTalents<'_>, tags: &NativeTags) -> u32 {
        let from_talents = talents.compute_modifier(1.0, &tags.skill_max_projectiles);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let from_talents = from_talents.max(0.0) as u32;
        from_talents.min(self.max_projectiles)
    }

    /// Plans a volley from `origin` toward `target_location`.
    ///
    /// Projectiles home on `homing_target` when given, otherwise on the
    /// target location. One range roll per projectile picks its steering
    /// acceleration.
    pub fn plan<R: RollSource + ?Sized>(
        &self,
        origin: Vec3,
        target_location: Vec3,
        homing_target: Option<ActorId>,
        count: u32,
        rolls: &mut R,
    ) -> Vec<ProjectileLaunch> {
        let forward = aim_direction(origin, target_location, self.pitch_override);
        let homing = homing_target.map_or(HomingTarget::Location(target_location), HomingTarget::Actor);
        evenly_spaced_directions(forward, Vec3::Z, self.spread_degrees, count as usize)
            .into_iter()
            .take(count as usize)
            .map(|direction| ProjectileLaunch {
                origin,
                direction,
                rotation: look_rotation(direction),
                homing,
                is_homing: self.homing,
                homing_acceleration: rolls
                    .roll_range(self.homing_acceleration_min, self.homing_acceleration_max),
            })
            .collect()
    }
}
