//! Attribute capture: the read-only snapshot the damage pipeline works from.
//!
//! Both participants are snapshotted once, before the pipeline starts, so
//! effects applied mid-resolution (talent effects, radial damage) never feed
//! back into the numbers of the same hit.
//!
//! [`CaptureDefinitions`] declares which attributes the pipeline may read and
//! from which side. Reading an attribute without a definition is a
//! configuration error, never a silent zero.

use lattice::{Tag, TagContainer};

use crate::entity::{ActorId, AttributeSet};
use crate::error::ConfigError;
use crate::tags::NativeTags;

/// Which participant an attribute is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureSource {
    /// The attacker.
    Source,
    /// The receiver.
    Target,
}

/// Declares that `attribute` is captured from `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDefinition {
    /// Captured attribute.
    pub attribute: Tag,
    /// Side it is read from.
    pub source: CaptureSource,
}

/// The set of attributes the pipeline may read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDefinitions {
    definitions: Vec<CaptureDefinition>,
    current_to_max: Vec<(Tag, Tag)>,
}

impl CaptureDefinitions {
    /// Definitions for every attribute the damage pipeline reads.
    #[must_use]
    pub fn standard(tags: &NativeTags) -> Self {
        let target = |attribute: &Tag| CaptureDefinition {
            attribute: attribute.clone(),
            source: CaptureSource::Target,
        };
        let source = |attribute: &Tag| CaptureDefinition {
            attribute: attribute.clone(),
            source: CaptureSource::Source,
        };
        Self {
            definitions: vec![
                target(&tags.armor),
                target(&tags.block_chance),
                target(&tags.critical_hit_resistance),
                target(&tags.resistance_arcane),
                target(&tags.resistance_fire),
                target(&tags.resistance_lightning),
                target(&tags.resistance_physical),
                target(&tags.health),
                target(&tags.max_health),
                source(&tags.armor_penetration),
                source(&tags.critical_hit_chance),
                source(&tags.critical_hit_damage),
            ],
            current_to_max: tags.current_to_max(),
        }
    }

    /// Adds or replaces a definition.
    #[must_use]
    pub fn with(mut self, definition: CaptureDefinition) -> Self {
        self.definitions
            .retain(|existing| existing.attribute != definition.attribute);
        self.definitions.push(definition);
        self
    }

    /// Removes the definition for `attribute`.
    #[must_use]
    pub fn without(mut self, attribute: &Tag) -> Self {
        self.definitions
            .retain(|existing| &existing.attribute != attribute);
        self
    }

    /// Definition for `attribute`.
    #[must_use]
    pub fn get(&self, attribute: &Tag) -> Option<&CaptureDefinition> {
        self.definitions
            .iter()
            .find(|definition| &definition.attribute == attribute)
    }

    /// Returns true if `attribute` may be captured.
    #[must_use]
    pub fn contains(&self, attribute: &Tag) -> bool {
        self.get(attribute).is_some()
    }

    /// Max-value attribute paired with a current-value attribute.
    #[must_use]
    pub fn max_for(&self, current: &Tag) -> Option<&Tag> {
        self.current_to_max
            .iter()
            .find(|(attribute, _)| attribute == current)
            .map(|(_, max)| max)
    }
}

/// What the pipeline knows about one participant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatantSnapshot {
    /// Combat level, if the actor supports the combat capability.
    pub level: Option<u32>,
    /// Attribute values.
    pub attributes: AttributeSet,
    /// Owned tags.
    pub tags: TagContainer,
}

impl CombatantSnapshot {
    /// Level for coefficient lookups; 1 for actors without combat state.
    #[must_use]
    pub fn combat_level(&self) -> u32 {
        self.level.unwrap_or(1)
    }
}

/// Provides per-actor snapshots.
pub trait SnapshotProvider {
    /// Snapshot of `actor`, or `None` if it does not exist.
    fn snapshot(&self, actor: ActorId) -> Option<CombatantSnapshot>;
}

/// Both sides of one hit, captured once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeCapture {
    /// The attacker.
    pub source: CombatantSnapshot,
    /// The receiver.
    pub target: CombatantSnapshot,
}

impl AttributeCapture {
    /// Captures both participants. Missing actors become empty level-1
    /// snapshots.
    pub fn capture_from<P: SnapshotProvider + ?Sized>(
        provider: &P,
        source: Option<ActorId>,
        target: Option<ActorId>,
    ) -> Self {
        let take = |actor: Option<ActorId>| {
            actor
                .and_then(|id| provider.snapshot(id))
                .unwrap_or_default()
        };
        Self {
            source: take(source),
            target: take(target),
        }
    }

    /// The snapshot for one side.
    #[must_use]
    pub const fn side(&self, source: CaptureSource) -> &CombatantSnapshot {
        match source {
            CaptureSource::Source => &self.source,
            CaptureSource::Target => &self.target,
        }
    }

    /// Reads `attribute` through its capture definition.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingCapture`] if `definitions` has no entry for the
    /// attribute.
    pub fn captured(
        &self,
        definitions: &CaptureDefinitions,
        attribute: &Tag,
    ) -> Result<f32, ConfigError> {
        let definition = definitions
            .get(attribute)
            .ok_or_else(|| ConfigError::MissingCapture(attribute.clone()))?;
        Ok(self.side(definition.source).attributes.value(attribute))
    }
}
