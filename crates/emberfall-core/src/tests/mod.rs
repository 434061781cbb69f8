//! Crate-level tests of the assembled combat core.
//!
//! # Test Structure
//!
//! - `determinism.rs`: same seed and calls give identical outcomes
//! - `integration.rs`: end-to-end sessions (progression, talents, skills)
//! - `helpers.rs`: fixture game data, spawners and a recording effect sink

mod determinism;
pub mod helpers;
mod integration;
