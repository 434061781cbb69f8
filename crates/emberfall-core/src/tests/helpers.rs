//! Test helpers: fixture data, session setup and a recording sink.

use std::sync::Arc;

use glam::Vec3;
use lattice::Tag;

use crate::config::GameData;
use crate::damage::{HitOutcome, RadialDamageRequest};
use crate::entity::{ActorId, AttributeSet};
use crate::resolver::EffectSink;
use crate::session::CombatSession;
use crate::tags::NativeTags;
use crate::talent::SkillTalent;

// =============================================================================
// Fixture Data
// =============================================================================

/// Content tags registered on top of the native ones.
pub const FIXTURE_TAGS: &[&str] = &[
    "Abilities.Fire.Firebolt",
    "Abilities.Lightning.Electrocute",
    "Abilities.Arcane.ArcaneShards",
    "Abilities.Passive.HaloOfProtection",
    "Talents.Firebolt.Heat",
    "Talents.Firebolt.Multishot",
    "Talents.Firebolt.Executioner",
    "Talents.Electrocute.Arc",
];

/// Abilities, talents, skills, curves and a four-step level table.
pub const FIXTURE_JSON: &str = r#"{
    "abilities": [
        { "ability": "Abilities.Fire.Firebolt", "ability_type": "Offensive",
          "level_requirement": 1, "startup_input": "InputTag.LMB" },
        { "ability": "Abilities.Lightning.Electrocute", "ability_type": "Offensive",
          "level_requirement": 2 },
        { "ability": "Abilities.Passive.HaloOfProtection", "ability_type": "Passive",
          "level_requirement": 2 },
        { "ability": "Abilities.Arcane.ArcaneShards", "ability_type": "Offensive",
          "level_requirement": 4 }
    ],
    "talent_trees": [
        {
            "skill": "Abilities.Fire.Firebolt",
            "talents": [
                { "skill": "Abilities.Fire.Firebolt", "talent": "Talents.Firebolt.Heat",
                  "max_level": 5, "talent_type": "AttributeMultiplicative",
                  "magnitude": 10, "attribute": "Damage.Fire" },
                { "skill": "Abilities.Fire.Firebolt", "talent": "Talents.Firebolt.Multishot",
                  "max_level": 4, "talent_type": "AttributeAdditive",
                  "magnitude": 1, "attribute": "Skills.Attributes.MaxProjectiles" },
                { "skill": "Abilities.Fire.Firebolt", "talent": "Talents.Firebolt.Executioner",
                  "talent_type": "AttributeMultiplicative", "magnitude": 50,
                  "attribute": "Damage.Fire",
                  "condition": { "kind": "TargetAttributeBelow",
                                 "attribute": "Attributes.Vital.Health", "threshold": 50 } }
            ]
        },
        {
            "skill": "Abilities.Lightning.Electrocute",
            "talents": [
                { "skill": "Abilities.Lightning.Electrocute", "talent": "Talents.Electrocute.Arc",
                  "max_level": 3, "talent_type": "AttributeAdditive",
                  "magnitude": 1, "attribute": "Skills.Attributes.MaxNumTargets" }
            ]
        }
    ],
    "damage_skills": [
        { "skill": "Abilities.Fire.Firebolt", "damage_type": "Damage.Fire",
          "damage": [[1, 20], [10, 200]],
          "debuff_chance": 20, "debuff_damage": 5, "debuff_duration": 5, "debuff_frequency": 1,
          "death_impulse_magnitude": 1000,
          "volley": { "max_projectiles": 5, "spread_degrees": 90, "homing": true,
                      "homing_acceleration_min": 1600, "homing_acceleration_max": 3200 } },
        { "skill": "Abilities.Lightning.Electrocute", "damage_type": "Damage.Lightning",
          "damage": [[1, 10], [10, 100]],
          "beam": { "chain_radius": 850, "max_chain_targets": 2 } },
        { "skill": "Abilities.Arcane.ArcaneShards", "damage_type": "Damage.Arcane",
          "damage": [[1, 15]],
          "radial": { "inner_radius": 50, "outer_radius": 300 } }
    ],
    "curves": {
        "ArmorPenetration": [[1, 0.25], [40, 0.1]],
        "EffectiveArmor": [[1, 0.33], [40, 0.15]],
        "CriticalHitResistance": [[1, 0.25], [40, 0.1]]
    },
    "level_up": [
        { "level_up_requirement": 0, "attribute_point_award": 0, "spell_point_award": 0 },
        { "level_up_requirement": 300, "attribute_point_award": 1, "spell_point_award": 1 },
        { "level_up_requirement": 900, "attribute_point_award": 1, "spell_point_award": 1 },
        { "level_up_requirement": 2700, "attribute_point_award": 1, "spell_point_award": 1 },
        { "level_up_requirement": 6400, "attribute_point_award": 1, "spell_point_award": 1 }
    ]
}"#;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A session over the fixture data.
pub fn fixture_session(seed: u64) -> CombatSession {
    init_tracing();
    let (registry, tags) = NativeTags::bootstrap(FIXTURE_TAGS).unwrap();
    let data = GameData::from_json_str(FIXTURE_JSON)
        .unwrap()
        .bind(&registry)
        .unwrap();
    CombatSession::new(seed, Arc::new(registry), Arc::new(tags), Arc::new(data)).unwrap()
}

/// Interned tag by name.
pub fn tag(session: &CombatSession, name: &str) -> Tag {
    session.registry().get(name).unwrap().clone()
}

// =============================================================================
// Actors
// =============================================================================

/// Health and max health only.
pub fn vitals(tags: &NativeTags, health: f32, max_health: f32) -> AttributeSet {
    AttributeSet::new()
        .with(&tags.health, health)
        .with(&tags.max_health, max_health)
}

/// A level-1 player at `location` with 100 health.
pub fn spawn_test_player(session: &mut CombatSession, location: Vec3) -> ActorId {
    let attributes = vitals(session.tags(), 100.0, 100.0);
    session.spawn_player(location, attributes)
}

/// A level-1 enemy on the X axis.
pub fn spawn_test_enemy(session: &mut CombatSession, x: f32, health: f32, xp_reward: u32) -> ActorId {
    let attributes = vitals(session.tags(), health, 100.0_f32.max(health));
    session.spawn_enemy(Vec3::new(x, 0.0, 0.0), 1, attributes, xp_reward)
}

/// Current health of a combatant.
pub fn health_of(session: &CombatSession, id: ActorId) -> f32 {
    let combat = session.arena().get(id).unwrap().as_combatant().unwrap();
    combat.attributes.value(&session.tags().health)
}

/// Grants Firebolt as a startup ability.
pub fn grant_firebolt(session: &mut CombatSession, player: ActorId) -> Tag {
    let firebolt = tag(session, "Abilities.Fire.Firebolt");
    session
        .grant_startup_abilities(player, std::slice::from_ref(&firebolt), &[])
        .unwrap();
    firebolt
}

// =============================================================================
// Recording Sink
// =============================================================================

/// Records everything the pipeline hands it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Applied hits, in order.
    pub hits: Vec<HitOutcome>,
    /// `(target, effect)` pairs from triggered talents.
    pub talent_effects: Vec<(Option<ActorId>, Tag)>,
    /// Radial requests, in order.
    pub radial_requests: Vec<RadialDamageRequest>,
    /// Value reported for every radial request.
    pub radial_response: Option<f32>,
}

impl EffectSink for RecordingSink {
    fn apply_talent_effect(&mut self, target: Option<ActorId>, talent: &SkillTalent) {
        if let Some(effect) = &talent.effect {
            self.talent_effects.push((target, effect.clone()));
        }
    }

    fn apply_radial_damage(
        &mut self,
        _target: Option<ActorId>,
        request: &RadialDamageRequest,
    ) -> Option<f32> {
        self.radial_requests.push(request.clone());
        self.radial_response
    }

    fn apply_hit(&mut self, outcome: &HitOutcome) {
        self.hits.push(outcome.clone());
    }
}
