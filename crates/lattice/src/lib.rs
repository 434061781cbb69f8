//! # Lattice
//!
//! Hierarchical gameplay tags for the Emberfall combat core.
//!
//! A tag is a dotted identifier such as `Abilities.Fire.Firebolt`. Tags form a
//! tree by prefix: `Abilities.Fire.Firebolt` is a descendant of
//! `Abilities.Fire`, which is a descendant of `Abilities`. Gameplay code never
//! compares raw strings; it asks whether a tag *matches* a parent, or whether a
//! container *has* a tag.
//!
//! - **Explicit registry**: [`TagRegistry`] is built once through
//!   [`TagRegistryBuilder`] and then shared read-only. There is no process-wide
//!   singleton; whoever needs tags receives the registry by reference.
//! - **Interning**: every registered name is stored once, so tags handed out by
//!   the same registry share their backing allocation.
//! - **Containers**: [`TagContainer`] is the ordered set of tags an actor owns,
//!   with hierarchical and exact membership checks.
//!
//! ## Quick Start
//!
//! ```
//! use lattice::{TagContainer, TagRegistry};
//!
//! let mut builder = TagRegistry::builder();
//! builder.register("Debuff.Burn").unwrap();
//! builder.register("Debuff.Stun").unwrap();
//! let registry = builder.build();
//!
//! let burn = registry.request("Debuff.Burn").unwrap();
//! let debuff = registry.request("Debuff").unwrap(); // parents are implicit
//! assert!(burn.matches(&debuff));
//!
//! let mut owned = TagContainer::new();
//! owned.add(burn);
//! assert!(owned.has_tag(&debuff));
//! assert!(!owned.has_tag_exact(&debuff));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod error;
pub mod registry;
pub mod tag;

// Re-exports for convenience
pub use container::TagContainer;
pub use error::TagError;
pub use registry::{TagRegistry, TagRegistryBuilder};
pub use tag::Tag;
