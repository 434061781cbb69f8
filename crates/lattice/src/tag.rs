//! The [`Tag`] handle and its hierarchy queries.
//!
//! # Hierarchy
//!
//! Hierarchy is purely lexical: `A.B.C` descends from `A.B` and `A`. A prefix
//! only counts at a segment boundary, so `Debuff.Burning` does NOT descend from
//! `Debuff.Burn`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TagError;

/// Segment separator in tag names.
pub const SEPARATOR: char = '.';

// =============================================================================
// Tag
// =============================================================================

/// An immutable, cheaply cloned hierarchical identifier.
///
/// Tags obtained from a [`TagRegistry`](crate::TagRegistry) share one
/// allocation per name. Tags produced by deserialization are detached until
/// passed through [`TagRegistry::canonicalize`](crate::TagRegistry::canonicalize);
/// equality is by name either way.
#[derive(Clone)]
pub struct Tag(Arc<str>);

impl Tag {
    /// Wraps an already-interned name.
    pub(crate) fn from_interned(name: Arc<str>) -> Self {
        Self(name)
    }

    /// Parses a name without consulting a registry.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidName`] if the name is malformed.
    pub fn parse_detached(name: &str) -> Result<Self, TagError> {
        validate_name(name)?;
        Ok(Self(Arc::from(name)))
    }

    /// Returns the full dotted name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns true if `self` equals `other` or descends from it.
    ///
    /// This is the check used for every gameplay query ("is this a fire
    /// damage tag", "does the actor carry any debuff").
    #[must_use]
    pub fn matches(&self, other: &Tag) -> bool {
        self == other || self.is_descendant_of(other)
    }

    /// Returns true only if both tags name the same node.
    #[must_use]
    pub fn matches_exact(&self, other: &Tag) -> bool {
        self == other
    }

    /// Returns true if `self` is a strict descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Tag) -> bool {
        let name = self.name();
        let prefix = ancestor.name();
        name.len() > prefix.len()
            && name.starts_with(prefix)
            && name[prefix.len()..].starts_with(SEPARATOR)
    }

    /// Returns the name of the direct parent, if any.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.0.rfind(SEPARATOR).map(|idx| &self.0[..idx])
    }

    /// Returns the last segment of the name.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.0
            .rfind(SEPARATOR)
            .map_or(self.name(), |idx| &self.0[idx + 1..])
    }

    /// Number of segments (`Abilities.Fire` has depth 2).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.split(SEPARATOR).count()
    }

    /// Returns true if both handles share the same interned allocation.
    #[must_use]
    pub fn is_same_instance(&self, other: &Tag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Checks that a name is a non-empty dotted path without whitespace.
pub(crate) fn validate_name(name: &str) -> Result<(), TagError> {
    let well_formed = !name.is_empty()
        && name
            .split(SEPARATOR)
            .all(|segment| !segment.is_empty() && !segment.chars().any(char::is_whitespace));
    if well_formed {
        Ok(())
    } else {
        Err(TagError::InvalidName(name.to_string()))
    }
}

/// Yields every proper ancestor name of `name`, nearest first.
pub(crate) fn ancestor_names(name: &str) -> impl Iterator<Item = &str> {
    name.match_indices(SEPARATOR)
        .map(move |(idx, _)| &name[..idx])
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Tag::parse_detached(&name).map_err(serde::de::Error::custom)
    }
}
