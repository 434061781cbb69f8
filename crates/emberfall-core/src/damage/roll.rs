//! Random rolls behind every chance check.
//!
//! All randomness in the crate goes through [`RollSource`], so a seeded
//! [`SeededRoller`] replays a fight exactly and tests can script outcomes
//! with [`FixedRoll`] or [`ScriptedRolls`].
//!
//! ```
//! use emberfall_core::damage::roll::{roll_succeeds, RollSource, SeededRoller};
//!
//! let mut a = SeededRoller::new(42);
//! let mut b = SeededRoller::new(42);
//! assert_eq!(a.roll_percent(), b.roll_percent());
//!
//! // Strict comparison: a 100% chance succeeds on every roll in 1..=100.
//! assert!(roll_succeeds(100, 100.5));
//! assert!(!roll_succeeds(25, 25.0));
//! ```

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random rolls.
pub trait RollSource {
    /// Uniform integer in `1..=100`.
    fn roll_percent(&mut self) -> i32;

    /// Uniform float in `min..=max`. Returns `min` when the range is empty.
    fn roll_range(&mut self, min: f32, max: f32) -> f32;
}

/// Returns true if `roll` is strictly below `chance`.
#[must_use]
pub fn roll_succeeds(roll: i32, chance: f32) -> bool {
    #[allow(clippy::cast_precision_loss)]
    let roll = roll as f32;
    roll < chance
}

/// Deterministic roller seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRoller {
    seed: u64,
    rng: ChaCha8Rng,
    rolls: u64,
}

impl SeededRoller {
    /// Creates a roller; the same seed yields the same sequence.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            rolls: 0,
        }
    }

    /// Seed this roller was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rolls made so far.
    #[must_use]
    pub const fn rolls_made(&self) -> u64 {
        self.rolls
    }
}

impl RollSource for SeededRoller {
    fn roll_percent(&mut self) -> i32 {
        self.rolls += 1;
        self.rng.gen_range(1..=100)
    }

    fn roll_range(&mut self, min: f32, max: f32) -> f32 {
        self.rolls += 1;
        if min < max {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }
}

/// Always rolls the same percent; ranges resolve to their minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRoll(pub i32);

impl RollSource for FixedRoll {
    fn roll_percent(&mut self) -> i32 {
        self.0
    }

    fn roll_range(&mut self, min: f32, _max: f32) -> f32 {
        min
    }
}

/// Replays a fixed list of percent rolls, then repeats `fallback`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: VecDeque<i32>,
    fallback: i32,
    consumed: usize,
}

impl ScriptedRolls {
    /// Creates a script.
    pub fn new(rolls: impl IntoIterator<Item = i32>, fallback: i32) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback,
            consumed: 0,
        }
    }

    /// Scripted rolls not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }

    /// Percent rolls made so far, scripted or fallback.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RollSource for ScriptedRolls {
    fn roll_percent(&mut self) -> i32 {
        self.consumed += 1;
        self.rolls.pop_front().unwrap_or(self.fallback)
    }

    fn roll_range(&mut self, min: f32, _max: f32) -> f32 {
        min
    }
}
