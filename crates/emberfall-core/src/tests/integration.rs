//! End-to-end tests of a combat session.
//!
//! These drive the public session API the way a game server would:
//! - Startup abilities, level-ups and spell points
//! - Talents changing damage, projectile count and chain length
//! - Single-target, area and beam skills against an arena

use std::sync::{Arc, Mutex};

use glam::Vec3;

use crate::ability::AbilityStatus;
use crate::entity::ActorId;
use crate::error::{AbilityError, ConfigError, ProgressionError, SessionError, TalentError};
use crate::progression::ProgressionEvent;
use crate::session::ProgressionNotice;
use crate::skills::HomingTarget;

use super::helpers::{
    fixture_session, grant_firebolt, health_of, spawn_test_enemy, spawn_test_player, tag, vitals,
};

// =============================================================================
// Abilities and Progression
// =============================================================================

mod progression_tests {
    use super::*;

    #[test]
    fn startup_ability_is_equipped_in_default_slot() {
        let mut session = fixture_session(1);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = grant_firebolt(&mut session, player);

        let character = session.character(player).unwrap();
        let spec = character.abilities.spec_for_ability(&firebolt).unwrap();
        assert_eq!(spec.status, AbilityStatus::Equipped);
        assert_eq!(spec.level, 1);
        assert_eq!(spec.slot.as_ref(), Some(&session.tags().input_lmb));

        let again = session
            .grant_startup_abilities(player, &[firebolt], &[])
            .unwrap();
        assert!(!again);
    }

    #[test]
    fn kill_awards_xp_levels_up_and_unlocks_eligibility() {
        let mut session = fixture_session(2);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = grant_firebolt(&mut session, player);
        let enemy = spawn_test_enemy(&mut session, 500.0, 10.0, 350);

        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notices);
        session.subscribe_progression(move |notice: &ProgressionNotice| {
            sink.lock().unwrap().push(notice.event);
        });

        let hit = session
            .activate_damage_skill(player, &firebolt, Some(enemy))
            .unwrap();
        assert_eq!(hit.kills, vec![enemy]);
        assert_eq!(hit.xp_awarded, 350);
        assert_eq!(hit.level_up.map(|report| report.new_level), Some(2));

        let progression = *session.progression(player).unwrap();
        assert_eq!(progression.level(), 2);
        assert_eq!(progression.xp(), 351);
        assert_eq!(progression.attribute_points(), 1);
        assert_eq!(progression.spell_points(), 11);
        let combat = session.arena().get(player).unwrap().as_combatant().unwrap();
        assert_eq!(combat.level, 2);

        let abilities = &session.character(player).unwrap().abilities;
        let electrocute = tag(&session, "Abilities.Lightning.Electrocute");
        let halo = tag(&session, "Abilities.Passive.HaloOfProtection");
        let shards = tag(&session, "Abilities.Arcane.ArcaneShards");
        assert_eq!(abilities.status_for_ability(&electrocute), Some(AbilityStatus::Eligible));
        assert_eq!(abilities.status_for_ability(&halo), Some(AbilityStatus::Eligible));
        assert_eq!(abilities.status_for_ability(&shards), None);
        assert_eq!(abilities.status_for_ability(&firebolt), Some(AbilityStatus::Equipped));

        assert_eq!(
            *notices.lock().unwrap(),
            vec![
                ProgressionEvent::XpChanged(351),
                ProgressionEvent::LevelChanged(2),
                ProgressionEvent::AttributePointsChanged(1),
                ProgressionEvent::SpellPointsChanged(11),
            ]
        );
    }

    #[test]
    fn spell_points_unlock_then_level_an_ability() {
        let mut session = fixture_session(3);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let electrocute = tag(&session, "Abilities.Lightning.Electrocute");

        assert_eq!(
            session.spend_spell_point(player, &electrocute),
            Err(SessionError::Ability(AbilityError::NotGranted(electrocute.clone())))
        );

        session.award_xp(player, 400).unwrap();
        assert_eq!(
            session.spend_spell_point(player, &electrocute).unwrap(),
            (AbilityStatus::Unlocked, 1)
        );
        assert_eq!(
            session.spend_spell_point(player, &electrocute).unwrap(),
            (AbilityStatus::Unlocked, 2)
        );
        assert_eq!(session.progression(player).unwrap().spell_points(), 9);

        let slot = session.tags().input_1.clone();
        let outcome = session.equip_ability(player, &electrocute, &slot).unwrap();
        assert_eq!(outcome.status, AbilityStatus::Equipped);
        assert_eq!(outcome.previous_slot, None);
    }

    #[test]
    fn eligible_ability_cannot_be_activated() {
        let mut session = fixture_session(4);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let enemy = spawn_test_enemy(&mut session, 300.0, 100.0, 0);
        let electrocute = tag(&session, "Abilities.Lightning.Electrocute");
        session.award_xp(player, 400).unwrap();

        let result = session.activate_damage_skill(player, &electrocute, Some(enemy));
        assert_eq!(
            result.map(|_| ()),
            Err(SessionError::Ability(AbilityError::NotActivatable {
                ability: electrocute,
                status: AbilityStatus::Eligible,
            }))
        );
        assert!((health_of(&session, enemy) - 100.0).abs() < 0.0001);
    }

    #[test]
    fn attribute_points_raise_attributes() {
        let mut session = fixture_session(5);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let strength = tag(&session, "Attributes.Primary.Strength");

        assert_eq!(
            session.upgrade_attribute(player, &strength),
            Err(SessionError::Progression(ProgressionError::NoAttributePoints))
        );
        session.award_xp(player, 400).unwrap();
        let value = session.upgrade_attribute(player, &strength).unwrap();
        assert!((value - 1.0).abs() < 0.0001);
        assert_eq!(session.progression(player).unwrap().attribute_points(), 0);
    }

    #[test]
    fn enemies_have_no_progression() {
        let mut session = fixture_session(6);
        let enemy = spawn_test_enemy(&mut session, 0.0, 100.0, 10);
        assert_eq!(session.award_xp(enemy, 10), Err(SessionError::NotPlayer(enemy)));
        assert_eq!(
            session.award_xp(ActorId::new(99), 10),
            Err(SessionError::UnknownActor(ActorId::new(99)))
        );
    }
}

// =============================================================================
// Talents
// =============================================================================

mod talent_tests {
    use super::*;

    #[test]
    fn unconditional_talent_raises_damage() {
        let mut session = fixture_session(10);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = grant_firebolt(&mut session, player);
        let heat = tag(&session, "Talents.Firebolt.Heat");
        let enemy = spawn_test_enemy(&mut session, 500.0, 100.0, 0);

        assert_eq!(session.spend_talent_point(player, &firebolt, &heat, false), Ok(1));
        assert_eq!(session.spend_talent_point(player, &firebolt, &heat, false), Ok(2));
        assert_eq!(session.progression(player).unwrap().spell_points(), 8);

        // +20% when the params are built, and again in the conditional pass
        let hit = session
            .activate_damage_skill(player, &firebolt, Some(enemy))
            .unwrap();
        assert!((hit.outcome.damage - 28.8).abs() < 0.001);
        assert!((health_of(&session, enemy) - 71.2).abs() < 0.001);
    }

    #[test]
    fn respec_refunds_a_point() {
        let mut session = fixture_session(11);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = tag(&session, "Abilities.Fire.Firebolt");
        let heat = tag(&session, "Talents.Firebolt.Heat");
        let multishot = tag(&session, "Talents.Firebolt.Multishot");

        session.spend_talent_point(player, &firebolt, &heat, false).unwrap();
        session.spend_talent_point(player, &firebolt, &heat, false).unwrap();
        assert_eq!(session.spend_talent_point(player, &firebolt, &heat, true), Ok(1));
        assert_eq!(session.progression(player).unwrap().spell_points(), 9);
        assert_eq!(
            session.spend_talent_point(player, &firebolt, &multishot, true),
            Err(SessionError::Talent(TalentError::NotTaken(multishot)))
        );
    }

    #[test]
    fn conditional_talent_needs_wounded_target() {
        let mut session = fixture_session(12);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = grant_firebolt(&mut session, player);
        let executioner = tag(&session, "Talents.Firebolt.Executioner");
        session
            .spend_talent_point(player, &firebolt, &executioner, false)
            .unwrap();

        let wounded = spawn_test_enemy(&mut session, 500.0, 40.0, 0);
        let healthy = spawn_test_enemy(&mut session, -500.0, 80.0, 0);

        let hit = session
            .activate_damage_skill(player, &firebolt, Some(wounded))
            .unwrap();
        assert!((hit.outcome.damage - 30.0).abs() < 0.0001);
        assert!((health_of(&session, wounded) - 10.0).abs() < 0.0001);

        let hit = session
            .activate_damage_skill(player, &firebolt, Some(healthy))
            .unwrap();
        assert!((hit.outcome.damage - 20.0).abs() < 0.0001);
    }

    #[test]
    fn talent_of_unknown_skill_is_rejected() {
        let mut session = fixture_session(13);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let summon = tag(&session, "Abilities.Summon");
        let heat = tag(&session, "Talents.Firebolt.Heat");
        assert_eq!(
            session.spend_talent_point(player, &summon, &heat, false),
            Err(SessionError::Config(ConfigError::UnknownSkill(summon)))
        );
    }
}

// =============================================================================
// Skills
// =============================================================================

mod skill_tests {
    use super::*;

    #[test]
    fn firebolt_damages_enemy() {
        let mut session = fixture_session(20);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = grant_firebolt(&mut session, player);
        let enemy = spawn_test_enemy(&mut session, 500.0, 100.0, 0);

        let hit = session
            .activate_damage_skill(player, &firebolt, Some(enemy))
            .unwrap();
        assert!(!hit.outcome.blocked);
        assert!(!hit.outcome.critical);
        assert!((hit.outcome.damage - 20.0).abs() < 0.0001);
        assert!((health_of(&session, enemy) - 80.0).abs() < 0.0001);
        assert!(hit.kills.is_empty());
        assert_eq!(hit.level_up, None);
    }

    #[test]
    fn enemies_cast_at_their_combat_level() {
        let mut session = fixture_session(21);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = tag(&session, "Abilities.Fire.Firebolt");
        let attributes = vitals(session.tags(), 100.0, 100.0);
        let caster = session.spawn_enemy(Vec3::new(200.0, 0.0, 0.0), 10, attributes, 0);

        let hit = session
            .activate_damage_skill(caster, &firebolt, Some(player))
            .unwrap();
        assert!((hit.outcome.damage - 200.0).abs() < 0.0001);
        assert_eq!(hit.xp_awarded, 0);
        assert!(session.arena().get(player).unwrap().as_combatant().unwrap().dead);
    }

    #[test]
    fn unknown_skill_is_a_config_error() {
        let mut session = fixture_session(22);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let summon = tag(&session, "Abilities.Summon");
        let result = session.activate_damage_skill(player, &summon, None);
        assert_eq!(
            result.map(|_| ()),
            Err(SessionError::Config(ConfigError::UnknownSkill(summon)))
        );
    }

    #[test]
    fn props_absorb_nothing() {
        let mut session = fixture_session(23);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = grant_firebolt(&mut session, player);
        let prop = session.spawn_prop(Vec3::new(100.0, 0.0, 0.0));

        let hit = session
            .activate_damage_skill(player, &firebolt, Some(prop))
            .unwrap();
        assert_eq!(hit.outcome.target, Some(prop));
        assert!(hit.kills.is_empty());
        assert!(session.arena().get(prop).unwrap().as_combatant().is_none());
    }

    #[test]
    fn volley_size_follows_multishot() {
        let mut session = fixture_session(24);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let firebolt = tag(&session, "Abilities.Fire.Firebolt");
        let multishot = tag(&session, "Talents.Firebolt.Multishot");
        let enemy = spawn_test_enemy(&mut session, 1000.0, 100.0, 0);

        let single = session
            .fire_volley(player, &firebolt, Vec3::new(1000.0, 0.0, 0.0), Some(enemy))
            .unwrap();
        assert_eq!(single.len(), 1);

        session.spend_talent_point(player, &firebolt, &multishot, false).unwrap();
        session.spend_talent_point(player, &firebolt, &multishot, false).unwrap();
        let launches = session
            .fire_volley(player, &firebolt, Vec3::new(1000.0, 0.0, 0.0), Some(enemy))
            .unwrap();
        assert_eq!(launches.len(), 3);
        for launch in &launches {
            assert_eq!(launch.homing, HomingTarget::Actor(enemy));
            assert!(launch.is_homing);
            assert!((1600.0..=3200.0).contains(&launch.homing_acceleration));
        }
        assert!((launches[1].direction - Vec3::X).length() < 0.0001);
    }

    #[test]
    fn beam_chains_through_nearby_enemies() {
        let mut session = fixture_session(25);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let electrocute = tag(&session, "Abilities.Lightning.Electrocute");
        let arc = tag(&session, "Talents.Electrocute.Arc");
        let enemies: Vec<_> = [500.0, 900.0, 1500.0, 2000.0]
            .into_iter()
            .map(|x| spawn_test_enemy(&mut session, x, 100.0, 0))
            .collect();

        let chain = session.chain_targets(player, &electrocute, enemies[0]).unwrap();
        let ids: Vec<_> = chain.iter().map(|c| c.actor).collect();
        assert_eq!(ids, enemies[..3].to_vec());

        session.spend_talent_point(player, &electrocute, &arc, false).unwrap();
        let chain = session.chain_targets(player, &electrocute, enemies[0]).unwrap();
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn radial_skill_falls_off_with_distance() {
        let mut session = fixture_session(26);
        let player = spawn_test_player(&mut session, Vec3::ZERO);
        let shards = tag(&session, "Abilities.Arcane.ArcaneShards");
        session.award_xp(player, 3000).unwrap();
        assert_eq!(session.progression(player).unwrap().level(), 4);
        session.spend_spell_point(player, &shards).unwrap();

        let close = spawn_test_enemy(&mut session, 30.0, 100.0, 0);
        let mid = spawn_test_enemy(&mut session, 175.0, 100.0, 0);
        let far = spawn_test_enemy(&mut session, 400.0, 100.0, 0);

        let hits = session
            .activate_radial_skill(player, &shards, Vec3::ZERO)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|hit| hit.outcome.radial));
        assert!((health_of(&session, close) - 85.0).abs() < 0.0001);
        assert!((health_of(&session, mid) - 92.5).abs() < 0.0001);
        assert!((health_of(&session, far) - 100.0).abs() < 0.0001);
        assert!((health_of(&session, player) - 100.0).abs() < 0.0001);
    }
}
