//! The damage resolution pipeline.
//!
//! One call to [`DamageResolver::resolve`] turns a [`DamageEffectParams`] and
//! a captured pair of combatants into a [`HitOutcome`]. The steps run in a
//! fixed order and consume percent rolls in that order:
//!
//! 1. **Debuff**: per damage type with a debuff, roll against the chance
//!    reduced by the receiver's resistance (one roll per such type)
//! 2. **Resistance**: each damage type is reduced by its resistance
//! 3. **Conditional talents**: satisfied talents modify each type; area hits
//!    then apply falloff per type, and the types are summed
//! 4. **Block**: one roll against block chance halves the total
//! 5. **Armor**: armor reduced by penetration, both scaled by level curves
//! 6. **Critical**: one roll against crit chance less crit resistance;
//!    doubles the total and adds crit damage
//! 7. **Output**: the outcome goes to the [`EffectSink`]
//!
//! Configuration is checked before the first roll, so a misconfigured hit
//! fails without consuming rolls or touching the sink.
//!
//! # Example
//!
//! ```
//! use emberfall_core::damage::capture::{AttributeCapture, CaptureDefinitions};
//! use emberfall_core::damage::curves::{CoefficientCurve, CurveTable, REQUIRED_CURVES};
//! use emberfall_core::damage::roll::FixedRoll;
//! use emberfall_core::damage::{DamageEffectParams, DamageResolver};
//! use emberfall_core::resolver::NullSink;
//! use emberfall_core::tags::NativeTags;
//! use emberfall_core::talent::SkillTalents;
//!
//! let (_, tags) = NativeTags::bootstrap(&[]).unwrap();
//! let definitions = CaptureDefinitions::standard(&tags);
//! let mut curves = CurveTable::new();
//! for name in REQUIRED_CURVES {
//!     curves.insert(name, CoefficientCurve::constant(1.0));
//! }
//! let resolver = DamageResolver::new(&tags, &definitions, &curves);
//!
//! let params = DamageEffectParams::new(None, None).with_damage(&tags.damage_fire, 20.0);
//! let outcome = resolver
//!     .resolve(&params, &AttributeCapture::default(), SkillTalents::none(), &mut FixedRoll(100), &mut NullSink)
//!     .unwrap();
//! assert!((outcome.damage - 20.0).abs() < 0.0001);
//! assert!(!outcome.blocked && !outcome.critical);
//! ```

use lattice::Tag;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::resolver::EffectSink;
use crate::tags::NativeTags;
use crate::talent::{ConditionContext, ConditionKind, SkillTalent, SkillTalents, TalentModifier};

use super::capture::{AttributeCapture, CaptureDefinitions};
use super::curves::{CurveProvider, ARMOR_PENETRATION, CRITICAL_HIT_RESISTANCE, EFFECTIVE_ARMOR};
use super::outcome::{DebuffOutcome, HitOutcome, RadialDamageRequest};
use super::params::DamageEffectParams;
use super::roll::{roll_succeeds, RollSource};

/// Magnitudes at or below this are treated as absent.
const NEARLY_ZERO: f32 = 1.0e-8;

/// Level coefficients for one hit.
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    armor_penetration: f32,
    effective_armor: f32,
    critical_hit_resistance: f32,
}

/// Resolves hits against one set of tags, capture definitions and curves.
#[derive(Clone, Copy)]
pub struct DamageResolver<'a> {
    tags: &'a NativeTags,
    definitions: &'a CaptureDefinitions,
    curves: &'a dyn CurveProvider,
}

impl std::fmt::Debug for DamageResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageResolver")
            .field("definitions", self.definitions)
            .finish_non_exhaustive()
    }
}

impl<'a> DamageResolver<'a> {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        tags: &'a NativeTags,
        definitions: &'a CaptureDefinitions,
        curves: &'a dyn CurveProvider,
    ) -> Self {
        Self {
            tags,
            definitions,
            curves,
        }
    }

    /// Checks that every resistance and every level curve the pipeline
    /// reads is configured.
    ///
    /// # Errors
    ///
    /// The first missing capture definition or curve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_resistances()?;
        self.coefficients(1, 1)?;
        Ok(())
    }

    /// Resolves one hit.
    ///
    /// `talents` should be the attacker's talents for the skill that
    /// produced the hit. Conditions are evaluated against `capture`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if a resistance, captured attribute or curve is
    /// missing. Nothing is rolled or applied in that case.
    pub fn resolve<R, S>(
        &self,
        params: &DamageEffectParams,
        capture: &AttributeCapture,
        talents: SkillTalents<'_>,
        rolls: &mut R,
        sink: &mut S,
    ) -> Result<HitOutcome, ConfigError>
    where
        R: RollSource + ?Sized,
        S: EffectSink + ?Sized,
    {
        let tags = self.tags;
        self.check_resistances()?;
        let coefficients =
            self.coefficients(capture.source.combat_level(), capture.target.combat_level())?;
        let armor = self.read(capture, &tags.armor)?;
        let armor_penetration = self.read(capture, &tags.armor_penetration)?;
        let block_chance = self.read(capture, &tags.block_chance)?;
        let critical_hit_chance = self.read(capture, &tags.critical_hit_chance)?;
        let critical_hit_damage = self.read(capture, &tags.critical_hit_damage)?;
        let critical_hit_resistance = self.read(capture, &tags.critical_hit_resistance)?;

        let debuff = self.determine_debuff(params, capture, talents, rolls, sink)?;

        let (mut damage, damage_by_type) = self.aggregate_damage(params, capture, talents, sink)?;

        let blocked = roll_succeeds(rolls.roll_percent(), block_chance.max(0.0));
        if blocked {
            damage /= 2.0;
        }

        let penetration = (armor_penetration.max(0.0) + params.skill_armor_penetration).max(0.0);
        let effective_armor =
            armor.max(0.0) * (100.0 - penetration * coefficients.armor_penetration) / 100.0;
        damage *= (100.0 - effective_armor * coefficients.effective_armor) / 100.0;

        let crit_chance = (critical_hit_chance + params.skill_critical_hit_chance).max(0.0);
        let effective_crit_chance = crit_chance
            - critical_hit_resistance.max(0.0) * coefficients.critical_hit_resistance;
        let critical = roll_succeeds(rolls.roll_percent(), effective_crit_chance);
        if critical {
            let bonus = (critical_hit_damage + params.skill_critical_hit_damage).max(0.0);
            damage = 2.0 * damage + bonus;
        }

        let outcome = HitOutcome {
            source: params.source,
            target: params.target,
            damage,
            blocked,
            critical,
            debuff,
            damage_by_type,
            knockback_force: params.knockback_force,
            death_impulse: params.death_impulse,
            radial: params.radial.is_some(),
        };
        debug!(
            source = ?outcome.source,
            target = ?outcome.target,
            damage = outcome.damage,
            blocked,
            critical,
            debuff = ?outcome.debuff.as_ref().map(|d| &d.debuff),
            "hit resolved"
        );
        sink.apply_hit(&outcome);
        Ok(outcome)
    }

    fn read(&self, capture: &AttributeCapture, attribute: &Tag) -> Result<f32, ConfigError> {
        capture.captured(self.definitions, attribute)
    }

    fn check_resistances(&self) -> Result<(), ConfigError> {
        for (_, resistance) in &self.tags.damage_types_to_resistances {
            if !self.definitions.contains(resistance) {
                return Err(ConfigError::MissingCapture(resistance.clone()));
            }
        }
        Ok(())
    }

    fn coefficients(&self, source_level: u32, target_level: u32) -> Result<Coefficients, ConfigError> {
        let curve = |name: &str, level: u32| {
            self.curves
                .coefficient(name, level)
                .ok_or_else(|| ConfigError::MissingCurve(name.to_owned()))
        };
        Ok(Coefficients {
            armor_penetration: curve(ARMOR_PENETRATION, source_level)?,
            effective_armor: curve(EFFECTIVE_ARMOR, target_level)?,
            critical_hit_resistance: curve(CRITICAL_HIT_RESISTANCE, target_level)?,
        })
    }

    fn determine_debuff<R, S>(
        &self,
        params: &DamageEffectParams,
        capture: &AttributeCapture,
        talents: SkillTalents<'_>,
        rolls: &mut R,
        sink: &mut S,
    ) -> Result<Option<DebuffOutcome>, ConfigError>
    where
        R: RollSource + ?Sized,
        S: EffectSink + ?Sized,
    {
        let mut landed = None;
        for (damage_type, debuff) in &self.tags.damage_types_to_debuffs {
            let Some(magnitude) = params.damage_for(damage_type) else {
                continue;
            };
            if magnitude < 0.0 {
                continue;
            }
            let resistance_tag = self
                .tags
                .resistance_for(damage_type)
                .ok_or_else(|| ConfigError::MissingResistance(damage_type.clone()))?;
            let resistance = self.read(capture, resistance_tag)?.max(0.0);
            let chance = params.debuff_chance * (100.0 - resistance) / 100.0;
            let roll = rolls.roll_percent();
            trace!(%damage_type, %debuff, chance, roll, "debuff roll");
            if !roll_succeeds(roll, chance) {
                continue;
            }
            for talent in talents.iter().filter(|t| triggers_on(t, debuff)) {
                sink.apply_talent_effect(params.target, talent);
            }
            landed = Some(DebuffOutcome {
                damage_type: damage_type.clone(),
                debuff: debuff.clone(),
                damage: params.debuff_damage,
                duration: params.debuff_duration,
                frequency: params.debuff_frequency,
            });
        }
        Ok(landed)
    }

    fn aggregate_damage<S>(
        &self,
        params: &DamageEffectParams,
        capture: &AttributeCapture,
        talents: SkillTalents<'_>,
        sink: &mut S,
    ) -> Result<(f32, Vec<(Tag, f32)>), ConfigError>
    where
        S: EffectSink + ?Sized,
    {
        let ctx = ConditionContext {
            capture,
            definitions: self.definitions,
        };
        let mut total = 0.0;
        let mut by_type = Vec::new();
        for (damage_type, resistance_tag) in &self.tags.damage_types_to_resistances {
            let resistance = self.read(capture, resistance_tag)?.max(0.0);
            let Some(mut value) = params.damage_for(damage_type) else {
                continue;
            };
            if value.abs() <= NEARLY_ZERO {
                continue;
            }
            value *= (100.0 - resistance) / 100.0;

            let satisfied = talents.iter().filter(|talent| {
                talent
                    .attribute
                    .as_ref()
                    .is_some_and(|attribute| attribute.matches(damage_type))
                    && talent.condition.is_satisfied(&ctx)
            });
            value = TalentModifier::from_talents(satisfied).apply(value);

            if let Some(radial) = &params.radial {
                let request = RadialDamageRequest {
                    source: params.source,
                    damage_type: damage_type.clone(),
                    base_damage: value,
                    origin: radial.origin,
                    inner_radius: radial.inner_radius,
                    outer_radius: radial.outer_radius,
                };
                if let Some(reported) = sink.apply_radial_damage(params.target, &request) {
                    value = reported;
                }
            }
            trace!(%damage_type, resistance, value, "damage type resolved");
            total += value;
            by_type.push((damage_type.clone(), value));
        }
        Ok((total, by_type))
    }
}

fn triggers_on(talent: &SkillTalent, debuff: &Tag) -> bool {
    talent.condition.kind == ConditionKind::TargetReceiveTag
        && talent.effect.is_some()
        && talent
            .condition
            .tag
            .as_ref()
            .is_some_and(|tag| tag.matches_exact(debuff))
}
