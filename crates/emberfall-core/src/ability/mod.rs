//! Abilities: catalog data, per-character specs, and the registry that owns
//! them.
//!
//! # Architecture
//!
//! - [`AbilityCatalog`]: static rows (type, level requirement, default input)
//! - [`AbilitySpec`]: one character's record for one ability
//! - [`AbilityRegistry`]: the character's specs plus the lifecycle operations
//!   (grant, eligibility, spell points, equip)

pub mod catalog;
pub mod registry;
pub mod spec;

pub use catalog::{AbilityCatalog, AbilityInfo, StaticAbilityCatalog};
pub use registry::{AbilityEvent, AbilityRegistry, EquipOutcome};
pub use spec::{AbilitySpec, AbilityStatus, AbilityType};
