//! Combat resolver: applies resolved hits to actors in an arena.
//!
//! The `CombatResolver` handles:
//! - Talent effects: the effect tag is granted to the receiver
//! - Radial falloff: measured from the receiver's location
//! - Hits: health loss, knockback, death impulse and debuff tags
//!
//! # Death Handling
//!
//! When health reaches 0 or below it is clamped to 0, the `dead` flag is
//! set and the death impulse replaces the knockback. Dead actors stay in the
//! arena and ignore further hits.

use tracing::debug;

use crate::arena::Arena;
use crate::damage::{HitOutcome, RadialDamageRequest};
use crate::entity::ActorId;
use crate::tags::NativeTags;
use crate::talent::SkillTalent;

use super::EffectSink;

/// Applies outcomes to an [`Arena`].
///
/// # Example
///
/// ```
/// use emberfall_core::arena::Arena;
/// use emberfall_core::resolver::CombatResolver;
/// use emberfall_core::tags::NativeTags;
///
/// let (_, tags) = NativeTags::bootstrap(&[]).unwrap();
/// let mut arena = Arena::new();
/// let resolver = CombatResolver::new(&mut arena, &tags);
/// assert!(resolver.kills().is_empty());
/// ```
#[derive(Debug)]
pub struct CombatResolver<'a> {
    arena: &'a mut Arena,
    tags: &'a NativeTags,
    kills: Vec<ActorId>,
}

impl<'a> CombatResolver<'a> {
    /// Creates a resolver writing into `arena`.
    #[must_use]
    pub fn new(arena: &'a mut Arena, tags: &'a NativeTags) -> Self {
        Self {
            arena,
            tags,
            kills: Vec::new(),
        }
    }

    /// Actors killed through this resolver, in order.
    #[must_use]
    pub fn kills(&self) -> &[ActorId] {
        &self.kills
    }

    fn live_target_location(&self, target: Option<ActorId>) -> Option<glam::Vec3> {
        let actor = self.arena.get(target?)?;
        let combat = actor.as_combatant()?;
        (!combat.dead).then(|| actor.location())
    }
}

impl EffectSink for CombatResolver<'_> {
    fn apply_talent_effect(&mut self, target: Option<ActorId>, talent: &SkillTalent) {
        let Some(effect) = &talent.effect else {
            return;
        };
        let Some(combat) = target
            .and_then(|id| self.arena.get_mut(id))
            .and_then(|actor| actor.as_combatant_mut())
        else {
            return;
        };
        combat.tags.add(effect.clone());
        debug!(target = ?target, %effect, talent = %talent.talent, "talent effect applied");
    }

    fn apply_radial_damage(
        &mut self,
        target: Option<ActorId>,
        request: &RadialDamageRequest,
    ) -> Option<f32> {
        let location = self.live_target_location(target)?;
        request.damage_at(location.distance(request.origin))
    }

    fn apply_hit(&mut self, outcome: &HitOutcome) {
        let health = &self.tags.health;
        let Some(actor) = outcome.target.and_then(|id| self.arena.get_mut(id)) else {
            return;
        };
        let id = actor.id();
        let Some(combat) = actor.as_combatant_mut() else {
            return;
        };
        if combat.dead {
            return;
        }

        let remaining = combat.attributes.add(health, -outcome.damage);
        let killed = remaining <= 0.0;
        if killed {
            combat.attributes.set(health, 0.0);
            combat.dead = true;
        }
        if let Some(debuff) = &outcome.debuff {
            if !killed {
                combat.tags.add(debuff.debuff.clone());
            }
        }

        let transform = actor.inner_mut().transform_mut();
        if killed {
            transform.velocity += outcome.death_impulse;
            self.kills.push(id);
            debug!(%id, "actor killed");
        } else {
            transform.velocity += outcome.knockback_force;
        }
    }
}
