//! Additive-then-multiplicative talent aggregation.
//!
//! ```
//! use emberfall_core::talent::TalentModifier;
//!
//! let m = TalentModifier { additive: 5.0, multiplicative: 20.0 };
//! assert!((m.apply(10.0) - 18.0).abs() < 0.0001);
//!
//! // A zero base is replaced by the multiplicative coefficient (as a fraction).
//! let m = TalentModifier { additive: 0.0, multiplicative: 25.0 };
//! assert!((m.apply(0.0) - 0.25).abs() < 0.0001);
//! ```

use lattice::Tag;

use super::tree::{SkillTalent, TalentType};

/// Summed talent contributions for one attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TalentModifier {
    /// Σ magnitude × level of additive talents.
    pub additive: f32,
    /// Σ magnitude × level of multiplicative talents, in percent.
    pub multiplicative: f32,
}

impl TalentModifier {
    /// Sums the contributions of `talents`. Effect talents contribute
    /// nothing.
    pub fn from_talents<'a, I>(talents: I) -> Self
    where
        I: IntoIterator<Item = &'a SkillTalent>,
    {
        talents
            .into_iter()
            .fold(Self::default(), |mut acc, talent| {
                match talent.talent_type {
                    TalentType::AttributeAdditive => acc.additive += talent.scaled_magnitude(),
                    TalentType::AttributeMultiplicative => {
                        acc.multiplicative += talent.scaled_magnitude();
                    }
                    TalentType::GameplayEffect => {}
                }
                acc
            })
    }

    /// Applies the modifier to `value`.
    ///
    /// The additive part is added first. A positive multiplicative total then
    /// scales a positive value by `1 + m/100`; a value that is zero or
    /// negative after the additive step is replaced by `m/100`.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        let mut value = value + self.additive;
        if self.multiplicative > 0.0 {
            if value > 0.0 {
                value *= 1.0 + self.multiplicative / 100.0;
            } else {
                value = self.multiplicative / 100.0;
            }
        }
        value
    }

    /// Returns true if applying the modifier changes nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.additive == 0.0 && self.multiplicative <= 0.0
    }
}

/// Applies every unconditional talent in `talents` that modifies exactly
/// `attribute` to `base`.
pub fn compute_modifier<'a, I>(base: f32, attribute: &Tag, talents: I) -> f32
where
    I: IntoIterator<Item = &'a SkillTalent>,
{
    TalentModifier::from_talents(
        talents
            .into_iter()
            .filter(|talent| talent.is_unconditional() && talent.modifies(attribute)),
    )
    .apply(base)
}
