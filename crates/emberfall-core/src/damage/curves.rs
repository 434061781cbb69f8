//! Level-indexed coefficient curves.
//!
//! The pipeline scales armor penetration, effective armor and critical hit
//! resistance by named curves evaluated at a combatant's level. Skills use
//! the same curve type for per-level base values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scales armor penetration, at the attacker's level.
pub const ARMOR_PENETRATION: &str = "ArmorPenetration";
/// Scales effective armor, at the receiver's level.
pub const EFFECTIVE_ARMOR: &str = "EffectiveArmor";
/// Scales critical hit resistance, at the receiver's level.
pub const CRITICAL_HIT_RESISTANCE: &str = "CriticalHitResistance";

/// Curves the damage pipeline cannot run without.
pub const REQUIRED_CURVES: [&str; 3] = [ARMOR_PENETRATION, EFFECTIVE_ARMOR, CRITICAL_HIT_RESISTANCE];

/// Named coefficient lookup.
pub trait CurveProvider {
    /// Value of `curve` at `level`, or `None` if no such curve exists.
    fn coefficient(&self, curve: &str, level: u32) -> Option<f32>;
}

/// Piecewise-linear curve over `(level, value)` keys.
///
/// Levels before the first key take the first value, levels after the last
/// key take the last value. A curve without keys evaluates to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct CoefficientCurve {
    keys: Vec<(f32, f32)>,
}

impl CoefficientCurve {
    /// Builds a curve; keys are sorted by level.
    #[must_use]
    pub fn from_points(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// A curve with the same value at every level.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![(1.0, value)],
        }
    }

    /// The sorted keys.
    #[must_use]
    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Evaluates the curve at `level`.
    #[must_use]
    pub fn eval(&self, level: f32) -> f32 {
        let (Some(&(first_level, first_value)), Some(&(last_level, last_value))) =
            (self.keys.first(), self.keys.last())
        else {
            return 0.0;
        };
        if level <= first_level {
            return first_value;
        }
        if level >= last_level {
            return last_value;
        }
        for pair in self.keys.windows(2) {
            let (low_level, low_value) = pair[0];
            let (high_level, high_value) = pair[1];
            if level <= high_level {
                let span = high_level - low_level;
                if span <= 0.0 {
                    return high_value;
                }
                let t = (level - low_level) / span;
                return low_value + (high_value - low_value) * t;
            }
        }
        last_value
    }

    /// Evaluates the curve at an integer level.
    #[must_use]
    pub fn at_level(&self, level: u32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let level = level as f32;
        self.eval(level)
    }
}

impl From<Vec<(f32, f32)>> for CoefficientCurve {
    fn from(keys: Vec<(f32, f32)>) -> Self {
        Self::from_points(keys)
    }
}

impl From<CoefficientCurve> for Vec<(f32, f32)> {
    fn from(curve: CoefficientCurve) -> Self {
        curve.keys
    }
}

/// Named curves loaded from game data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveTable {
    curves: BTreeMap<String, CoefficientCurve>,
}

impl CurveTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, curve: CoefficientCurve) -> Self {
        self.insert(name, curve);
        self
    }

    /// Adds or replaces a curve.
    pub fn insert(&mut self, name: &str, curve: CoefficientCurve) {
        self.curves.insert(name.to_owned(), curve);
    }

    /// Looks up a curve.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CoefficientCurve> {
        self.curves.get(name)
    }

    /// Returns true if a curve with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Names of curves from `required` that are missing.
    #[must_use]
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect()
    }
}

impl CurveProvider for CurveTable {
    fn coefficient(&self, curve: &str, level: u32) -> Option<f32> {
        self.get(curve).map(|curve| curve.at_level(level))
    }
}
