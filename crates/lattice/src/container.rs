//! Ordered tag sets owned by actors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::tag::Tag;

/// An ordered set of tags with hierarchical membership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagContainer {
    tags: BTreeSet<Tag>,
}

impl TagContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns false if it was already present.
    pub fn add(&mut self, tag: Tag) -> bool {
        self.tags.insert(tag)
    }

    /// Removes a tag. Returns false if it was absent.
    pub fn remove(&mut self, tag: &Tag) -> bool {
        self.tags.remove(tag)
    }

    /// Returns true if any owned tag equals `tag` or descends from it.
    ///
    /// A container holding `Debuff.Burn` has `Debuff`.
    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.iter().any(|owned| owned.matches(tag))
    }

    /// Returns true only if `tag` itself is owned.
    #[must_use]
    pub fn has_tag_exact(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Returns true if any of `tags` is matched.
    #[must_use]
    pub fn has_any(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|t| self.has_tag(t))
    }

    /// Returns true if all of `tags` are matched.
    #[must_use]
    pub fn has_all(&self, tags: &[Tag]) -> bool {
        tags.iter().all(|t| self.has_tag(t))
    }

    /// First owned tag (in name order) that matches `parent`.
    #[must_use]
    pub fn first_matching(&self, parent: &Tag) -> Option<&Tag> {
        self.tags.iter().find(|owned| owned.matches(parent))
    }

    /// Iterates owned tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Number of owned tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if nothing is owned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<Tag> for TagContainer {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl Extend<Tag> for TagContainer {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        self.tags.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Tag {
        Tag::parse_detached(name).unwrap()
    }

    #[test]
    fn hierarchical_and_exact_membership() {
        let owned: TagContainer = [tag("Debuff.Burn"), tag("Player")].into_iter().collect();
        assert!(owned.has_tag(&tag("Debuff")));
        assert!(owned.has_tag(&tag("Debuff.Burn")));
        assert!(!owned.has_tag_exact(&tag("Debuff")));
        assert!(!owned.has_tag(&tag("Debuff.Stun")));
    }

    #[test]
    fn any_all_and_first_matching() {
        let owned: TagContainer = [tag("Debuff.Stun"), tag("Debuff.Burn")].into_iter().collect();
        assert!(owned.has_any(&[tag("Enemy"), tag("Debuff.Stun")]));
        assert!(!owned.has_all(&[tag("Enemy"), tag("Debuff.Stun")]));
        assert_eq!(owned.first_matching(&tag("Debuff")), Some(&tag("Debuff.Burn")));
    }

    #[test]
    fn add_and_remove_report_changes() {
        let mut owned = TagContainer::new();
        assert!(owned.add(tag("Enemy")));
        assert!(!owned.add(tag("Enemy")));
        assert_eq!(owned.len(), 1);
        assert!(owned.remove(&tag("Enemy")));
        assert!(!owned.remove(&tag("Enemy")));
        assert!(owned.is_empty());
    }

    #[test]
    fn serializes_as_sorted_list() {
        let owned: TagContainer = [tag("B.Two"), tag("A.One")].into_iter().collect();
        let json = serde_json::to_string(&owned).unwrap();
        assert_eq!(json, r#"["A.One","B.Two"]"#);
    }
}
