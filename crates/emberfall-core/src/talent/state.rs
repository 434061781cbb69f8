//! The talents one character has taken.
//!
//! Every change is a single transaction: the level change, the effect
//! notification and the spell-point adjustment either all happen or none do.

use lattice::Tag;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::modifier::{compute_modifier, TalentModifier};
use super::tree::{SkillTalent, TalentTree};
use crate::error::TalentError;
use crate::events::{EventBus, SubscriptionId};
use crate::progression::PlayerProgression;

/// Notification published by a [`TalentState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalentEvent {
    /// A talent's level changed (1 when first taken, 0 when dropped).
    LevelChanged {
        /// The talent.
        talent: Tag,
        /// Its new level.
        level: u32,
    },
    /// The talent's persistent effect must be applied at `level`.
    EffectApplied {
        /// The talent.
        talent: Tag,
        /// Its effect.
        effect: Tag,
        /// Effect level.
        level: u32,
    },
    /// The talent's persistent effect changed level.
    EffectLevelChanged {
        /// The talent.
        talent: Tag,
        /// Its effect.
        effect: Tag,
        /// New effect level.
        level: u32,
    },
    /// The talent's persistent effect must be removed.
    EffectRemoved {
        /// The talent.
        talent: Tag,
        /// Its effect.
        effect: Tag,
    },
}

/// Taken talents of one character.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TalentState {
    talents: Vec<SkillTalent>,
    #[serde(skip)]
    events: EventBus<TalentEvent>,
}

impl TalentState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to talent notifications.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&TalentEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Removes a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn index_of(&self, talent: &Tag) -> Option<usize> {
        self.talents
            .iter()
            .position(|held| held.talent.matches_exact(talent))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Takes `talent` from `tree` at level 1, spending one spell point.
    ///
    /// Returns `Ok(false)` without changing anything if the talent is already
    /// held.
    ///
    /// # Errors
    ///
    /// - [`TalentError::UnknownTalent`] if the tree has no such talent
    /// - [`TalentError::NoSpellPoints`] if no spell point is available
    pub fn add_new_talent(
        &mut self,
        talent: &Tag,
        tree: &TalentTree,
        progression: &mut PlayerProgression,
    ) -> Result<bool, TalentError> {
        if self.has_talent(talent) {
            return Ok(false);
        }
        let definition = tree.get(talent).ok_or_else(|| TalentError::UnknownTalent {
            skill: tree.skill.clone(),
            talent: talent.clone(),
        })?;
        progression
            .spend_spell_points(1)
            .map_err(|_| TalentError::NoSpellPoints)?;

        let mut held = definition.clone();
        held.level = 1;

        let mut pending = vec![TalentEvent::LevelChanged {
            talent: held.talent.clone(),
            level: 1,
        }];
        if let Some(effect) = &held.effect {
            pending.push(TalentEvent::EffectApplied {
                talent: held.talent.clone(),
                effect: effect.clone(),
                level: 1,
            });
        }
        debug!(talent = %held.talent, skill = %held.skill, "talent taken");
        self.talents.push(held);
        self.events.publish_all(&pending);
        Ok(true)
    }

    /// Changes a held talent's level by `delta`, adjusting spell points by
    /// `-delta`. A talent dropping to level 0 is removed and its effect
    /// removed. Returns the new level.
    ///
    /// # Errors
    ///
    /// - [`TalentError::NotTaken`] if the talent is not held
    /// - [`TalentError::AtMaxLevel`] if the new level would exceed the max
    /// - [`TalentError::BelowZero`] if the new level would be negative
    /// - [`TalentError::NoSpellPoints`] if a raise cannot be paid for
    pub fn change_talent_level(
        &mut self,
        talent: &Tag,
        delta: i32,
        progression: &mut PlayerProgression,
    ) -> Result<u32, TalentError> {
        let index = self
            .index_of(talent)
            .ok_or_else(|| TalentError::NotTaken(talent.clone()))?;
        let held = &self.talents[index];
        let current = i64::from(held.level);
        let next = current + i64::from(delta);

        if delta > 0 && next > i64::from(held.max_level) {
            return Err(TalentError::AtMaxLevel {
                talent: held.talent.clone(),
                max: held.max_level,
            });
        }
        if next < 0 {
            return Err(TalentError::BelowZero(held.talent.clone()));
        }
        if delta == 0 {
            return Ok(held.level);
        }
        if delta > 0 {
            progression
                .spend_spell_points(delta.unsigned_abs())
                .map_err(|_| TalentError::NoSpellPoints)?;
        } else {
            progression.add_to_spell_points(-delta);
        }

        let new_level = u32::try_from(next).unwrap_or(0);
        let held = &mut self.talents[index];
        held.level = new_level;

        let mut pending = vec![TalentEvent::LevelChanged {
            talent: held.talent.clone(),
            level: new_level,
        }];
        if new_level == 0 {
            let removed = self.talents.remove(index);
            if let Some(effect) = removed.effect {
                pending.push(TalentEvent::EffectRemoved {
                    talent: removed.talent.clone(),
                    effect,
                });
            }
            debug!(talent = %removed.talent, "talent dropped");
        } else if let Some(effect) = &held.effect {
            pending.push(TalentEvent::EffectLevelChanged {
                talent: held.talent.clone(),
                effect: effect.clone(),
                level: new_level,
            });
        }
        debug!(%talent, delta, new_level, "talent level changed");
        self.events.publish_all(&pending);
        Ok(new_level)
    }

    /// Invests (or, in respec mode, refunds) one point in `talent`.
    ///
    /// Investing takes the talent if it is not held yet and raises it
    /// otherwise. Refunding lowers a held talent. Returns the new level.
    ///
    /// # Errors
    ///
    /// Whatever [`add_new_talent`](Self::add_new_talent) or
    /// [`change_talent_level`](Self::change_talent_level) reports; refunding
    /// a talent that is not held is [`TalentError::NotTaken`].
    pub fn spend_talent_point(
        &mut self,
        tree: &TalentTree,
        talent: &Tag,
        respec: bool,
        progression: &mut PlayerProgression,
    ) -> Result<u32, TalentError> {
        let delta = if respec { -1 } else { 1 };
        if self.has_talent(talent) {
            self.change_talent_level(talent, delta, progression)
        } else if respec {
            Err(TalentError::NotTaken(talent.clone()))
        } else {
            self.add_new_talent(talent, tree, progression)?;
            Ok(1)
        }
    }

    /// Returns true if [`spend_talent_point`](Self::spend_talent_point) would
    /// succeed.
    #[must_use]
    pub fn can_spend_talent_point(
        &self,
        tree: &TalentTree,
        talent: &Tag,
        respec: bool,
        progression: &PlayerProgression,
    ) -> bool {
        let level = self.talent_level(talent);
        if respec {
            return level > 0;
        }
        let Some(definition) = tree.get(talent) else {
            return false;
        };
        progression.spell_points() >= 1 && level < definition.max_level
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All held talents, in the order taken.
    #[must_use]
    pub fn talents(&self) -> &[SkillTalent] {
        &self.talents
    }

    /// Held talent record.
    #[must_use]
    pub fn talent(&self, talent: &Tag) -> Option<&SkillTalent> {
        self.index_of(talent).map(|index| &self.talents[index])
    }

    /// Returns true if `talent` is held.
    #[must_use]
    pub fn has_talent(&self, talent: &Tag) -> bool {
        self.index_of(talent).is_some()
    }

    /// Level of `talent`, 0 if not held.
    #[must_use]
    pub fn talent_level(&self, talent: &Tag) -> u32 {
        self.talent(talent).map_or(0, |held| held.level)
    }

    /// Held talents of one skill.
    #[must_use]
    pub fn talents_for_skill<'a>(&'a self, skill: &'a Tag) -> SkillTalents<'a> {
        SkillTalents::for_skill(skill, &self.talents)
    }

    /// Held talents, across all skills, that modify exactly `attribute`.
    #[must_use]
    pub fn find_talents_for_attribute(&self, attribute: &Tag) -> Vec<&SkillTalent> {
        self.talents
            .iter()
            .filter(|held| held.modifies(attribute))
            .collect()
    }
}

/// A borrowed view of the talents that apply to one skill.
#[derive(Debug, Clone, Copy)]
pub struct SkillTalents<'a> {
    skill: Option<&'a Tag>,
    talents: &'a [SkillTalent],
}

impl<'a> SkillTalents<'a> {
    /// Talents in `talents` belonging to `skill`.
    #[must_use]
    pub const fn for_skill(skill: &'a Tag, talents: &'a [SkillTalent]) -> Self {
        Self {
            skill: Some(skill),
            talents,
        }
    }

    /// Every talent in `talents`, whatever its skill.
    #[must_use]
    pub const fn all(talents: &'a [SkillTalent]) -> Self {
        Self {
            skill: None,
            talents,
        }
    }

    /// A view with no talents.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            skill: None,
            talents: &[],
        }
    }

    /// Iterates the talents in the view.
    pub fn iter(&self) -> impl Iterator<Item = &'a SkillTalent> + 'a {
        let skill = self.skill;
        self.talents
            .iter()
            .filter(move |talent| skill.map_or(true, |s| talent.skill.matches_exact(s)))
    }

    /// Returns true if the view holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Talents in the view modifying exactly `attribute`, conditions ignored.
    #[must_use]
    pub fn find_for_attribute(&self, attribute: &Tag) -> Vec<&'a SkillTalent> {
        self.iter().filter(|talent| talent.modifies(attribute)).collect()
    }

    /// `base` after every unconditional talent on `attribute`.
    #[must_use]
    pub fn compute_modifier(&self, base: f32, attribute: &Tag) -> f32 {
        compute_modifier(base, attribute, self.iter())
    }

    /// Summed unconditional contributions on `attribute`.
    #[must_use]
    pub fn modifier_for(&self, attribute: &Tag) -> TalentModifier {
        TalentModifier::from_talents(
            self.iter()
                .filter(|talent| talent.is_unconditional() && talent.modifies(attribute)),
        )
    }
}
