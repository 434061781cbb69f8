//! Resolvers apply what the damage pipeline decides to the world.
//!
//! The pipeline itself never mutates actors. Whenever a hit needs a world
//! side effect it calls out through [`EffectSink`]:
//!
//! 1. Talent effects triggered by a landed debuff
//! 2. Radial falloff, which needs the receiver's location
//! 3. The finished [`HitOutcome`]
//!
//! # Invariants
//!
//! - Sinks must not change the captured snapshot of the hit being resolved
//! - Sinks must be deterministic given the same calls in the same order
//!
//! # Available Resolvers
//!
//! - [`CombatResolver`]: applies outcomes to actors in an [`Arena`](crate::arena::Arena)

mod combat;

pub use combat::CombatResolver;

use crate::damage::{HitOutcome, RadialDamageRequest};
use crate::entity::ActorId;
use crate::talent::SkillTalent;

/// Receives the side effects of one resolved hit.
///
/// # Example
///
/// ```
/// use emberfall_core::damage::{HitOutcome, RadialDamageRequest};
/// use emberfall_core::entity::ActorId;
/// use emberfall_core::resolver::EffectSink;
/// use emberfall_core::talent::SkillTalent;
///
/// #[derive(Default)]
/// struct Tally(f32);
///
/// impl EffectSink for Tally {
///     fn apply_talent_effect(&mut self, _target: Option<ActorId>, _talent: &SkillTalent) {}
///
///     fn apply_radial_damage(
///         &mut self,
///         _target: Option<ActorId>,
///         _request: &RadialDamageRequest,
///     ) -> Option<f32> {
///         None
///     }
///
///     fn apply_hit(&mut self, outcome: &HitOutcome) {
///         self.0 += outcome.damage;
///     }
/// }
/// ```
pub trait EffectSink {
    /// Applies the gameplay effect of `talent` to `target`.
    fn apply_talent_effect(&mut self, target: Option<ActorId>, talent: &SkillTalent);

    /// Applies falloff for one damage type of an area hit.
    ///
    /// Returns the damage the receiver actually takes, or `None` if the
    /// receiver was not hit (the value is then left unchanged).
    fn apply_radial_damage(
        &mut self,
        target: Option<ActorId>,
        request: &RadialDamageRequest,
    ) -> Option<f32>;

    /// Applies the final outcome of the hit.
    fn apply_hit(&mut self, outcome: &HitOutcome);
}

/// Discards every effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EffectSink for NullSink {
    fn apply_talent_effect(&mut self, _target: Option<ActorId>, _talent: &SkillTalent) {}

    fn apply_radial_damage(
        &mut self,
        _target: Option<ActorId>,
        _request: &RadialDamageRequest,
    ) -> Option<f32> {
        None
    }

    fn apply_hit(&mut self, _outcome: &HitOutcome) {}
}
