//! The explicit tag registry.
//!
//! # Lifecycle
//!
//! 1. Collect names in a [`TagRegistryBuilder`]. Parents are registered
//!    implicitly, so registering `Abilities.Fire.Firebolt` also makes
//!    `Abilities.Fire` and `Abilities` requestable.
//! 2. [`TagRegistryBuilder::build`] freezes the set.
//! 3. Share the [`TagRegistry`] by reference (or `Arc`) with every consumer.
//!
//! The registry is never mutated after construction, so concurrent readers
//! need no synchronization.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::TagError;
use crate::tag::{ancestor_names, validate_name, Tag};

// =============================================================================
// Builder
// =============================================================================

/// Collects tag names before the registry is frozen.
#[derive(Debug, Clone, Default)]
pub struct TagRegistryBuilder {
    names: BTreeSet<String>,
}

impl TagRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one name (and, implicitly, all of its ancestors).
    ///
    /// Registering the same name twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidName`] if the name is malformed.
    pub fn register(&mut self, name: &str) -> Result<&mut Self, TagError> {
        validate_name(name)?;
        for ancestor in ancestor_names(name) {
            self.names.insert(ancestor.to_string());
        }
        self.names.insert(name.to_string());
        Ok(self)
    }

    /// Registers every name in `names`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first malformed name.
    pub fn register_all<'a, I>(&mut self, names: I) -> Result<&mut Self, TagError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.register(name)?;
        }
        Ok(self)
    }

    /// Freezes the collected names into a registry.
    #[must_use]
    pub fn build(self) -> TagRegistry {
        let tags: BTreeMap<Arc<str>, Tag> = self
            .names
            .into_iter()
            .map(|name| {
                let interned: Arc<str> = Arc::from(name);
                (Arc::clone(&interned), Tag::from_interned(interned))
            })
            .collect();
        debug!(count = tags.len(), "tag registry built");
        TagRegistry { tags }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable set of known tags.
///
/// Iteration is in lexical name order, which keeps every consumer
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: BTreeMap<Arc<str>, Tag>,
}

impl TagRegistry {
    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> TagRegistryBuilder {
        TagRegistryBuilder::new()
    }

    /// Returns the canonical handle for `name`.
    ///
    /// # Errors
    ///
    /// - [`TagError::InvalidName`] if the name is malformed
    /// - [`TagError::NotRegistered`] if the name was never registered
    pub fn request(&self, name: &str) -> Result<Tag, TagError> {
        validate_name(name)?;
        self.tags
            .get(name)
            .cloned()
            .ok_or_else(|| TagError::NotRegistered(name.to_string()))
    }

    /// Returns the canonical handle for `name`, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Re-interns a detached tag (for example one read from saved data).
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NotRegistered`] if the registry does not know the
    /// tag's name.
    pub fn canonicalize(&self, tag: &Tag) -> Result<Tag, TagError> {
        self.request(tag.name())
    }

    /// Direct children of `parent`, in name order.
    pub fn children_of<'a>(&'a self, parent: &'a Tag) -> impl Iterator<Item = &'a Tag> + 'a {
        let depth = parent.depth() + 1;
        self.descendants_of(parent)
            .filter(move |tag| tag.depth() == depth)
    }

    /// All strict descendants of `parent`, in name order.
    pub fn descendants_of<'a>(&'a self, parent: &'a Tag) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags
            .values()
            .filter(move |tag| tag.is_descendant_of(parent))
    }

    /// Iterates all registered tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// Number of registered tags, implicit parents included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
