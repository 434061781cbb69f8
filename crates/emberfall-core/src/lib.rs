//! # Emberfall Core
//!
//! Ability, talent and damage-resolution core for the Emberfall action RPG.
//!
//! This crate owns the server-authoritative rules of combat: which abilities a
//! character holds and in which state, which talents modify which skill, and
//! how one hit turns into health loss, debuffs and impulses.
//!
//! ## Architecture
//!
//! - **Tags**: hierarchical identifiers from the [`lattice`] crate, resolved
//!   once into [`NativeTags`]
//! - **Abilities**: per-character [`AbilityRegistry`] over a static catalog
//! - **Talents**: per-skill [`TalentTree`]s and per-character [`TalentState`]
//! - **Damage**: [`DamageEffectParams`] in, [`HitOutcome`] out, through the
//!   ordered [`DamageResolver`] pipeline
//! - **Resolvers**: [`EffectSink`] implementations that apply outcomes
//! - **Session**: [`CombatSession`] wires all of it to an [`Arena`]
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use emberfall_core::{CombatSession, GameData, NativeTags};
//!
//! let (registry, tags) = NativeTags::bootstrap(&["Abilities.Fire.Firebolt"]).unwrap();
//! let json = r#"{ "curves": {
//!     "ArmorPenetration": [[1, 0.25]],
//!     "EffectiveArmor": [[1, 0.33]],
//!     "CriticalHitResistance": [[1, 0.25]]
//! } }"#;
//! let data = GameData::from_json_str(json).unwrap().bind(&registry).unwrap();
//! let session = CombatSession::new(42, Arc::new(registry), Arc::new(tags), Arc::new(data)).unwrap();
//! assert!(session.arena().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ability;
pub mod arena;
pub mod config;
pub mod damage;
pub mod entity;
pub mod error;
pub mod events;
pub mod progression;
pub mod resolver;
pub mod session;
pub mod skills;
pub mod tags;
pub mod talent;
pub mod targeting;

#[cfg(test)]
mod tests;

pub use ability::{AbilityRegistry, AbilitySpec, AbilityStatus, AbilityType};
pub use arena::Arena;
pub use config::GameData;
pub use damage::{DamageEffectParams, DamageResolver, HitOutcome};
pub use entity::{Actor, ActorId, ActorKind, Faction};
pub use error::{AbilityError, ConfigError, ProgressionError, SessionError, TalentError};
pub use progression::PlayerProgression;
pub use resolver::{CombatResolver, EffectSink};
pub use session::CombatSession;
pub use tags::NativeTags;
pub use talent::{SkillTalent, TalentState, TalentTree};
