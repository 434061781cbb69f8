//! Damage: parameters, attribute capture, rolls, curves and the resolution
//! pipeline.
//!
//! # Architecture
//!
//! - [`params`]: what a skill hands over for one hit
//! - [`capture`]: the read-only snapshot of both participants
//! - [`roll`]: every chance check draws from a [`RollSource`]
//! - [`curves`]: level-indexed coefficients
//! - [`pipeline`]: the seven ordered resolution steps
//! - [`outcome`]: what the pipeline reports

pub mod capture;
pub mod curves;
pub mod outcome;
pub mod params;
pub mod pipeline;
pub mod roll;

pub use capture::{AttributeCapture, CaptureDefinitions, CombatantSnapshot, SnapshotProvider};
pub use curves::{CoefficientCurve, CurveProvider, CurveTable};
pub use outcome::{DebuffOutcome, HitOutcome, RadialDamageRequest};
pub use params::{DamageEffectParams, RadialDamage};
pub use pipeline::DamageResolver;
pub use roll::{RollSource, SeededRoller};
