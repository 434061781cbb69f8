//! Player progression: level, experience, and unspent points.
//!
//! # Level-up Table
//!
//! [`LevelUpTable`] is indexed by level. Entry `n` holds the total XP needed to
//! leave level `n` and the points awarded when that happens. Entry 0 is a
//! placeholder so indices line up with levels.
//!
//! ```
//! use emberfall_core::progression::{LevelUpInfo, LevelUpTable, PlayerProgression};
//!
//! let table = LevelUpTable::new(vec![
//!     LevelUpInfo::default(),
//!     LevelUpInfo { level_up_requirement: 300, attribute_point_award: 1, spell_point_award: 1 },
//!     LevelUpInfo { level_up_requirement: 900, attribute_point_award: 1, spell_point_award: 1 },
//!     LevelUpInfo { level_up_requirement: 2700, attribute_point_award: 1, spell_point_award: 1 },
//! ]);
//!
//! let mut progression = PlayerProgression::new(1, 0, 0, 0);
//! let report = progression.award_xp(1000, &table);
//! assert_eq!(report.new_level, 3);
//! assert_eq!(progression.spell_points(), 2);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProgressionError;

/// Initial values for a freshly created player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionDefaults {
    /// Starting level.
    pub level: u32,
    /// Starting XP.
    pub xp: u32,
    /// Starting attribute points.
    pub attribute_points: u32,
    /// Starting spell points.
    pub spell_points: u32,
}

impl Default for ProgressionDefaults {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 1,
            attribute_points: 0,
            spell_points: 10,
        }
    }
}

/// One row of the level-up table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpInfo {
    /// Total XP required to advance past this level.
    pub level_up_requirement: u32,
    /// Attribute points granted on reaching the next level.
    pub attribute_point_award: u32,
    /// Spell points granted on reaching the next level.
    pub spell_point_award: u32,
}

/// XP thresholds and rewards per level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelUpTable {
    levels: Vec<LevelUpInfo>,
}

impl LevelUpTable {
    /// Creates a table. Index 0 should be a placeholder row.
    #[must_use]
    pub fn new(levels: Vec<LevelUpInfo>) -> Self {
        Self { levels }
    }

    /// Row for `level`, if the table has one.
    #[must_use]
    pub fn info(&self, level: u32) -> Option<&LevelUpInfo> {
        self.levels.get(level as usize)
    }

    /// The level reached with `xp` total experience.
    ///
    /// Never exceeds the last row of the table.
    #[must_use]
    pub fn find_level_for_xp(&self, xp: u32) -> u32 {
        let mut level: u32 = 1;
        loop {
            let index = level as usize;
            if index + 1 >= self.levels.len() {
                return level;
            }
            if xp >= self.levels[index].level_up_requirement {
                level += 1;
            } else {
                return level;
            }
        }
    }

    /// Highest reachable level.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.levels.len().saturating_sub(1)).unwrap_or(u32::MAX).max(1)
    }
}

/// Result of [`PlayerProgression::award_xp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpReport {
    /// Level before the award.
    pub previous_level: u32,
    /// Level after the award.
    pub new_level: u32,
    /// Attribute points granted by the level-ups.
    pub attribute_points_awarded: u32,
    /// Spell points granted by the level-ups.
    pub spell_points_awarded: u32,
}

impl LevelUpReport {
    /// Returns true if at least one level was gained.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// A change published by progression-owning code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionEvent {
    /// XP total changed.
    XpChanged(u32),
    /// Level changed.
    LevelChanged(u32),
    /// Unspent attribute points changed.
    AttributePointsChanged(u32),
    /// Unspent spell points changed.
    SpellPointsChanged(u32),
}

/// Level, XP and unspent points of one player.
///
/// Counters never go negative; decrements saturate at zero and checked
/// spending returns an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgression {
    level: u32,
    xp: u32,
    attribute_points: u32,
    spell_points: u32,
}

impl Default for PlayerProgression {
    fn default() -> Self {
        Self::from_defaults(&ProgressionDefaults::default())
    }
}

impl PlayerProgression {
    /// Creates progression with explicit values.
    #[must_use]
    pub const fn new(level: u32, xp: u32, attribute_points: u32, spell_points: u32) -> Self {
        Self {
            level,
            xp,
            attribute_points,
            spell_points,
        }
    }

    /// Creates progression from configured defaults.
    #[must_use]
    pub const fn from_defaults(defaults: &ProgressionDefaults) -> Self {
        Self::new(
            defaults.level,
            defaults.xp,
            defaults.attribute_points,
            defaults.spell_points,
        )
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current XP total.
    #[must_use]
    pub const fn xp(&self) -> u32 {
        self.xp
    }

    /// Unspent attribute points.
    #[must_use]
    pub const fn attribute_points(&self) -> u32 {
        self.attribute_points
    }

    /// Unspent spell points.
    #[must_use]
    pub const fn spell_points(&self) -> u32 {
        self.spell_points
    }

    /// Adds XP without checking for level-ups.
    pub fn add_to_xp(&mut self, xp: u32) {
        self.xp = self.xp.saturating_add(xp);
    }

    /// Overwrites the XP total.
    pub fn set_xp(&mut self, xp: u32) {
        self.xp = xp;
    }

    /// Adds levels.
    pub fn add_to_level(&mut self, levels: u32) {
        self.level = self.level.saturating_add(levels);
    }

    /// Overwrites the level.
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    /// Adds (or, for negative `delta`, removes) attribute points.
    pub fn add_to_attribute_points(&mut self, delta: i32) {
        self.attribute_points = self.attribute_points.saturating_add_signed(delta);
    }

    /// Adds (or, for negative `delta`, removes) spell points.
    pub fn add_to_spell_points(&mut self, delta: i32) {
        self.spell_points = self.spell_points.saturating_add_signed(delta);
    }

    /// Spends `amount` spell points.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::NotEnoughSpellPoints`] if fewer are held; nothing
    /// is spent in that case.
    pub fn spend_spell_points(&mut self, amount: u32) -> Result<(), ProgressionError> {
        if self.spell_points < amount {
            return Err(ProgressionError::NotEnoughSpellPoints {
                needed: amount,
                available: self.spell_points,
            });
        }
        self.spell_points -= amount;
        Ok(())
    }

    /// Spends one attribute point.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::NoAttributePoints`] if none are held.
    pub fn spend_attribute_point(&mut self) -> Result<(), ProgressionError> {
        if self.attribute_points == 0 {
            return Err(ProgressionError::NoAttributePoints);
        }
        self.attribute_points -= 1;
        Ok(())
    }

    /// Adds XP and applies every level-up it triggers, granting the rewards
    /// of each level passed.
    pub fn award_xp(&mut self, xp: u32, table: &LevelUpTable) -> LevelUpReport {
        let previous_level = self.level;
        self.add_to_xp(xp);
        let new_level = table.find_level_for_xp(self.xp).max(previous_level);

        let mut attribute_points_awarded = 0;
        let mut spell_points_awarded = 0;
        for level in previous_level..new_level {
            if let Some(info) = table.info(level) {
                attribute_points_awarded += info.attribute_point_award;
                spell_points_awarded += info.spell_point_award;
            }
        }

        if new_level > previous_level {
            self.level = new_level;
            self.attribute_points = self.attribute_points.saturating_add(attribute_points_awarded);
            self.spell_points = self.spell_points.saturating_add(spell_points_awarded);
            debug!(
                previous_level,
                new_level, attribute_points_awarded, spell_points_awarded, "level up"
            );
        }

        LevelUpReport {
            previous_level,
            new_level,
            attribute_points_awarded,
            spell_points_awarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LevelUpTable {
        LevelUpTable::new(vec![
            LevelUpInfo::default(),
            LevelUpInfo {
                level_up_requirement: 300,
                attribute_point_award: 1,
                spell_point_award: 1,
            },
            LevelUpInfo {
                level_up_requirement: 900,
                attribute_point_award: 2,
                spell_point_award: 1,
            },
            LevelUpInfo {
                level_up_requirement: 2700,
                attribute_point_award: 3,
                spell_point_award: 2,
            },
        ])
    }

    mod defaults_tests {
        use super::*;

        #[test]
        fn defaults_match_fresh_player() {
            let p = PlayerProgression::default();
            assert_eq!(p.level(), 1);
            assert_eq!(p.xp(), 1);
            assert_eq!(p.attribute_points(), 0);
            assert_eq!(p.spell_points(), 10);
        }
    }

    mod table_tests {
        use super::*;

        #[test]
        fn find_level_for_xp_thresholds() {
            let t = table();
            assert_eq!(t.find_level_for_xp(0), 1);
            assert_eq!(t.find_level_for_xp(299), 1);
            assert_eq!(t.find_level_for_xp(300), 2);
            assert_eq!(t.find_level_for_xp(900), 3);
            assert_eq!(t.find_level_for_xp(1_000_000), 3);
            assert_eq!(t.max_level(), 3);
        }

        #[test]
        fn empty_table_stays_at_level_one() {
            assert_eq!(LevelUpTable::default().find_level_for_xp(10_000), 1);
        }
    }

    mod award_tests {
        use super::*;

        #[test]
        fn multi_level_award_sums_rewards() {
            let mut p = PlayerProgression::new(1, 0, 0, 0);
            let report = p.award_xp(950, &table());
            assert!(report.leveled_up());
            assert_eq!(report.new_level, 3);
            assert_eq!(report.attribute_points_awarded, 3);
            assert_eq!(report.spell_points_awarded, 2);
            assert_eq!(p.level(), 3);
            assert_eq!(p.attribute_points(), 3);
            assert_eq!(p.spell_points(), 2);
        }

        #[test]
        fn small_award_only_adds_xp() {
            let mut p = PlayerProgression::new(1, 0, 0, 0);
            let report = p.award_xp(10, &table());
            assert!(!report.leveled_up());
            assert_eq!(p.xp(), 10);
            assert_eq!(p.spell_points(), 0);
        }
    }

    mod spending_tests {
        use super::*;

        #[test]
        fn spend_spell_points_is_checked() {
            let mut p = PlayerProgression::new(1, 0, 0, 1);
            assert_eq!(
                p.spend_spell_points(2),
                Err(ProgressionError::NotEnoughSpellPoints {
                    needed: 2,
                    available: 1
                })
            );
            assert_eq!(p.spell_points(), 1);
            assert!(p.spend_spell_points(1).is_ok());
            assert_eq!(p.spell_points(), 0);
        }

        #[test]
        fn attribute_point_requires_balance() {
            let mut p = PlayerProgression::new(1, 0, 1, 0);
            assert!(p.spend_attribute_point().is_ok());
            assert_eq!(p.spend_attribute_point(), Err(ProgressionError::NoAttributePoints));
        }

        #[test]
        fn signed_adds_saturate() {
            let mut p = PlayerProgression::new(1, 0, 0, 2);
            p.add_to_spell_points(-5);
            assert_eq!(p.spell_points(), 0);
            p.add_to_attribute_points(4);
            assert_eq!(p.attribute_points(), 4);
        }
    }
}
