//! Talent trees and the talents a character has taken.
//!
//! # Architecture
//!
//! - [`TalentTree`]: static per-skill definitions
//! - [`TalentState`]: per-character held talents with their levels
//! - [`TalentModifier`]: the additive-then-multiplicative aggregation rule
//! - [`ConditionContext`]: evaluation of conditional talents during a hit
//!
//! Unconditional talents are folded into [`DamageEffectParams`] when an
//! ability builds them; conditional talents are evaluated per hit by the
//! damage pipeline.
//!
//! [`DamageEffectParams`]: crate::damage::DamageEffectParams

pub mod condition;
pub mod modifier;
pub mod state;
pub mod tree;

pub use condition::ConditionContext;
pub use modifier::{compute_modifier, TalentModifier};
pub use state::{SkillTalents, TalentEvent, TalentState};
pub use tree::{ConditionKind, SkillTalent, TalentCondition, TalentTree, TalentType};
