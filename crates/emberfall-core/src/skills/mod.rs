//! Skill behaviour layered on top of the damage pipeline.
//!
//! - [`DamageSkill`]: per-skill defaults and the params builder
//! - [`ProjectileVolley`]: projectile count and fan layout
//! - [`BeamChain`]: chaining a beam across nearby enemies

pub mod chain;
pub mod damage_skill;
pub mod volley;

pub use chain::BeamChain;
pub use damage_skill::{DamageSkill, RadialDamageConfig, SkillUse};
pub use volley::{HomingTarget, ProjectileLaunch, ProjectileVolley};
