//! Combat session: one arena of actors plus everything needed to resolve
//! their abilities.
//!
//! The `CombatSession` ties the core together the way a game server would:
//!
//! 1. **Spawn**: players get progression from the configured defaults and an
//!    ability registry and talent state of their own
//! 2. **Build**: a damage skill turns its static data and the attacker's
//!    unconditional talents into [`DamageEffectParams`]
//! 3. **Resolve**: the pipeline runs against captured attributes and writes
//!    the outcome into the arena through a [`CombatResolver`]
//! 4. **Reward**: kills by a player award the victim's XP, which may level
//!    the player up and make new abilities Eligible
//!
//! # Determinism
//!
//! Every percent and range roll comes from one [`SeededRoller`]. Given the
//! same seed, data and sequence of calls, a session produces identical
//! outcomes. Actors are stored in a `BTreeMap`, so iteration is in id order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use emberfall_core::config::GameData;
//! use emberfall_core::damage::curves::{CoefficientCurve, REQUIRED_CURVES};
//! use emberfall_core::entity::AttributeSet;
//! use emberfall_core::session::CombatSession;
//! use emberfall_core::tags::NativeTags;
//! use glam::Vec3;
//!
//! let (registry, tags) = NativeTags::bootstrap(&[]).unwrap();
//! let mut data = GameData::default();
//! for name in REQUIRED_CURVES {
//!     data.curves.insert(name, CoefficientCurve::constant(0.25));
//! }
//!
//! let mut session = CombatSession::new(7, Arc::new(registry), Arc::new(tags), Arc::new(data)).unwrap();
//! let player = session.spawn_player(Vec3::ZERO, AttributeSet::new());
//! assert_eq!(session.progression(player).unwrap().level(), 1);
//! assert_eq!(session.seed(), 7);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use lattice::{Tag, TagRegistry};
use tracing::{debug, info, warn};

use crate::ability::{AbilityRegistry, AbilityStatus, EquipOutcome};
use crate::arena::Arena;
use crate::config::GameData;
use crate::damage::capture::{AttributeCapture, CaptureDefinitions};
use crate::damage::roll::SeededRoller;
use crate::damage::{DamageEffectParams, DamageResolver, HitOutcome};
use crate::entity::{
    Actor, ActorId, ActorInner, AttributeSet, CombatState, EnemyComponents, Faction,
    PlayerComponents, PropComponents, TransformState,
};
use crate::error::{ConfigError, SessionError};
use crate::events::{EventBus, SubscriptionId};
use crate::progression::{LevelUpReport, PlayerProgression, ProgressionEvent};
use crate::resolver::CombatResolver;
use crate::skills::{DamageSkill, ProjectileLaunch, SkillUse};
use crate::tags::NativeTags;
use crate::talent::{SkillTalents, TalentState};
use crate::targeting::{is_hostile, live_actors_within_radius, CombatantLookup, TargetCandidate};

// =============================================================================
// Character
// =============================================================================

/// Ability and talent state of one player character.
#[derive(Debug)]
pub struct Character {
    /// Granted abilities.
    pub abilities: AbilityRegistry,
    /// Taken talents.
    pub talents: TalentState,
}

impl Character {
    fn new(owner: ActorId) -> Self {
        Self {
            abilities: AbilityRegistry::new(owner),
            talents: TalentState::new(),
        }
    }
}

/// A progression change of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionNotice {
    /// The player.
    pub player: ActorId,
    /// What changed.
    pub event: ProgressionEvent,
}

/// Result of one resolved hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillHit {
    /// The pipeline's outcome.
    pub outcome: HitOutcome,
    /// Actors killed by the hit.
    pub kills: Vec<ActorId>,
    /// XP awarded to the attacker for those kills.
    pub xp_awarded: u32,
    /// Level-up caused by that XP, if any.
    pub level_up: Option<LevelUpReport>,
}

// =============================================================================
// CombatSession
// =============================================================================

/// An arena plus the data, characters and roller that act on it.
pub struct CombatSession {
    arena: Arena,
    registry: Arc<TagRegistry>,
    tags: Arc<NativeTags>,
    data: Arc<GameData>,
    definitions: CaptureDefinitions,
    characters: BTreeMap<ActorId, Character>,
    roller: SeededRoller,
    progression_events: EventBus<ProgressionNotice>,
}

impl fmt::Debug for CombatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatSession")
            .field("arena", &self.arena)
            .field("characters", &format!("[{} characters]", self.characters.len()))
            .field("roller", &self.roller)
            .field("progression_events", &self.progression_events)
            .finish_non_exhaustive()
    }
}

impl CombatSession {
    /// Creates an empty session.
    ///
    /// `data` should already be bound to `registry`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the damage pipeline would be missing a resistance
    /// capture or a level curve.
    pub fn new(
        seed: u64,
        registry: Arc<TagRegistry>,
        tags: Arc<NativeTags>,
        data: Arc<GameData>,
    ) -> Result<Self, ConfigError> {
        let definitions = CaptureDefinitions::standard(&tags);
        DamageResolver::new(&tags, &definitions, &data.curves).validate()?;
        info!(seed, skills = data.damage_skills.len(), "combat session created");
        Ok(Self {
            arena: Arena::new(),
            registry,
            tags,
            data,
            definitions,
            characters: BTreeMap::new(),
            roller: SeededRoller::new(seed),
            progression_events: EventBus::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The actors.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable actors, for moving them around between hits.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// The frozen tag registry.
    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Native tag handles.
    #[must_use]
    pub fn tags(&self) -> &NativeTags {
        &self.tags
    }

    /// Static game data.
    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// Seed of the roller.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.roller.seed()
    }

    /// Rolls consumed so far.
    #[must_use]
    pub const fn rolls_made(&self) -> u64 {
        self.roller.rolls_made()
    }

    /// Ability and talent state of a player.
    #[must_use]
    pub fn character(&self, player: ActorId) -> Option<&Character> {
        self.characters.get(&player)
    }

    /// Mutable ability and talent state of a player, e.g. to subscribe.
    #[must_use]
    pub fn character_mut(&mut self, player: ActorId) -> Option<&mut Character> {
        self.characters.get_mut(&player)
    }

    /// Progression of a player.
    #[must_use]
    pub fn progression(&self, player: ActorId) -> Option<&PlayerProgression> {
        self.arena
            .get(player)
            .and_then(|actor| actor.as_player())
            .map(|components| &components.progression)
    }

    /// Subscribes to progression changes of every player.
    pub fn subscribe_progression<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&ProgressionNotice) + Send + Sync + 'static,
    {
        self.progression_events.subscribe(listener)
    }

    /// Removes a progression listener.
    pub fn unsubscribe_progression(&mut self, id: SubscriptionId) -> bool {
        self.progression_events.unsubscribe(id)
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawns a player with the configured starting progression.
    pub fn spawn_player(&mut self, location: Vec3, attributes: AttributeSet) -> ActorId {
        let progression = PlayerProgression::from_defaults(&self.data.progression_defaults);
        let id = self.arena.spawn(ActorInner::Player(PlayerComponents {
            transform: TransformState::at(location),
            combat: CombatState::new(Faction::PLAYER, attributes).with_level(progression.level()),
            progression,
        }));
        self.characters.insert(id, Character::new(id));
        debug!(%id, level = progression.level(), "player spawned");
        id
    }

    /// Spawns an enemy worth `xp_reward` to its killer.
    pub fn spawn_enemy(
        &mut self,
        location: Vec3,
        level: u32,
        attributes: AttributeSet,
        xp_reward: u32,
    ) -> ActorId {
        let id = self.arena.spawn(ActorInner::Enemy(EnemyComponents {
            transform: TransformState::at(location),
            combat: CombatState::new(Faction::ENEMY, attributes).with_level(level),
            xp_reward,
        }));
        debug!(%id, level, xp_reward, "enemy spawned");
        id
    }

    /// Spawns a non-combat prop.
    pub fn spawn_prop(&mut self, location: Vec3) -> ActorId {
        self.arena.spawn(ActorInner::Prop(PropComponents {
            transform: TransformState::at(location),
        }))
    }

    // =========================================================================
    // Progression
    // =========================================================================

    /// Grants a player's startup abilities once, plus passive startup
    /// abilities. Returns false if startup abilities were already granted.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoAbilities`] if `player` has no character state.
    pub fn grant_startup_abilities(
        &mut self,
        player: ActorId,
        abilities: &[Tag],
        passives: &[Tag],
    ) -> Result<bool, SessionError> {
        let character = self
            .characters
            .get_mut(&player)
            .ok_or(SessionError::NoAbilities(player))?;
        let granted = character
            .abilities
            .grant_startup_abilities(abilities, &self.data.abilities);
        character.abilities.grant_passive_startup_abilities(passives);
        Ok(granted)
    }

    /// Awards XP, applies level-ups, keeps the combat level in step and makes
    /// newly reachable abilities Eligible.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownActor`] or [`SessionError::NotPlayer`].
    pub fn award_xp(&mut self, player: ActorId, xp: u32) -> Result<LevelUpReport, SessionError> {
        let components = player_components(&mut self.arena, player)?;
        let report = components.progression.award_xp(xp, &self.data.level_up);
        components.combat.level = components.progression.level();
        let progression = components.progression;

        self.publish(player, ProgressionEvent::XpChanged(progression.xp()));
        if report.leveled_up() {
            self.publish(player, ProgressionEvent::LevelChanged(progression.level()));
            self.publish(
                player,
                ProgressionEvent::AttributePointsChanged(progression.attribute_points()),
            );
            self.publish(
                player,
                ProgressionEvent::SpellPointsChanged(progression.spell_points()),
            );
            if let Some(character) = self.characters.get_mut(&player) {
                character
                    .abilities
                    .update_ability_statuses_for_level(progression.level(), &self.data.abilities);
            }
            info!(%player, level = progression.level(), "player leveled up");
        }
        Ok(report)
    }

    /// Spends a spell point to unlock or level an ability.
    ///
    /// # Errors
    ///
    /// Lookup errors, or the [`AbilityError`](crate::error::AbilityError)
    /// from the registry.
    pub fn spend_spell_point(
        &mut self,
        player: ActorId,
        ability: &Tag,
    ) -> Result<(AbilityStatus, u32), SessionError> {
        let components = player_components(&mut self.arena, player)?;
        let character = self
            .characters
            .get_mut(&player)
            .ok_or(SessionError::NoAbilities(player))?;
        let result = character
            .abilities
            .spend_spell_point(ability, &mut components.progression)?;
        let spell_points = components.progression.spell_points();
        self.publish(player, ProgressionEvent::SpellPointsChanged(spell_points));
        Ok(result)
    }

    /// Equips an ability into an input slot.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoAbilities`] or the registry's
    /// [`AbilityError`](crate::error::AbilityError).
    pub fn equip_ability(
        &mut self,
        player: ActorId,
        ability: &Tag,
        slot: &Tag,
    ) -> Result<EquipOutcome, SessionError> {
        let character = self
            .characters
            .get_mut(&player)
            .ok_or(SessionError::NoAbilities(player))?;
        Ok(character
            .abilities
            .equip_ability(ability, slot, &self.data.abilities)?)
    }

    /// Invests (or, with `respec`, refunds) one point in a talent of
    /// `skill`'s tree. Returns the talent's new level.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownSkill`] if `skill` has no tree, lookup errors,
    /// or the [`TalentError`](crate::error::TalentError) from the state.
    pub fn spend_talent_point(
        &mut self,
        player: ActorId,
        skill: &Tag,
        talent: &Tag,
        respec: bool,
    ) -> Result<u32, SessionError> {
        let tree = self
            .data
            .talent_tree(skill)
            .ok_or_else(|| ConfigError::UnknownSkill(skill.clone()))?;
        let components = player_components(&mut self.arena, player)?;
        let character = self
            .characters
            .get_mut(&player)
            .ok_or(SessionError::NoAbilities(player))?;
        let level =
            character
                .talents
                .spend_talent_point(tree, talent, respec, &mut components.progression)?;
        let spell_points = components.progression.spell_points();
        self.publish(player, ProgressionEvent::SpellPointsChanged(spell_points));
        Ok(level)
    }

    /// Spends an attribute point to raise `attribute` by one. Returns the
    /// attribute's new value.
    ///
    /// # Errors
    ///
    /// Lookup errors or
    /// [`ProgressionError::NoAttributePoints`](crate::error::ProgressionError::NoAttributePoints).
    pub fn upgrade_attribute(
        &mut self,
        player: ActorId,
        attribute: &Tag,
    ) -> Result<f32, SessionError> {
        let components = player_components(&mut self.arena, player)?;
        components.progression.spend_attribute_point()?;
        let value = components.combat.attributes.add(attribute, 1.0);
        let points = components.progression.attribute_points();
        debug!(%player, %attribute, value, "attribute upgraded");
        self.publish(player, ProgressionEvent::AttributePointsChanged(points));
        Ok(value)
    }

    fn publish(&self, player: ActorId, event: ProgressionEvent) {
        self.progression_events
            .publish(&ProgressionNotice { player, event });
    }

    // =========================================================================
    // Combat
    // =========================================================================

    /// Uses a damage skill of `source` on `target` and resolves the hit.
    ///
    /// Players must have the ability Unlocked or Equipped; its spec level is
    /// the ability level. Other attackers use their combat level.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownSkill`] if the skill has no damage data, lookup
    /// errors, [`AbilityError`](crate::error::AbilityError) if a player
    /// cannot activate it, and any pipeline [`ConfigError`].
    pub fn activate_damage_skill(
        &mut self,
        source: ActorId,
        skill: &Tag,
        target: Option<ActorId>,
    ) -> Result<SkillHit, SessionError> {
        let params = self.build_params(source, skill, target, None)?;
        self.resolve_hit(&params)
    }

    /// Uses an exploding damage skill centred on `origin` against every
    /// enemy in its outer radius.
    ///
    /// # Errors
    ///
    /// As [`activate_damage_skill`](Self::activate_damage_skill).
    pub fn activate_radial_skill(
        &mut self,
        source: ActorId,
        skill: &Tag,
        origin: Vec3,
    ) -> Result<Vec<SkillHit>, SessionError> {
        let defaults = self.damage_skill(skill)?;
        let Some(radial) = defaults.radial else {
            warn!(%skill, "skill has no area settings");
            return Ok(Vec::new());
        };
        let faction = self.faction_of(source)?;
        let victims: Vec<ActorId> =
            live_actors_within_radius(&self.arena, origin, radial.outer_radius, &[source])
                .into_iter()
                .filter(|candidate| is_hostile(faction, candidate.faction))
                .map(|candidate| candidate.actor)
                .collect();

        let mut hits = Vec::with_capacity(victims.len());
        for victim in victims {
            let params = self.build_params(source, skill, Some(victim), Some(origin))?;
            hits.push(self.resolve_hit(&params)?);
        }
        Ok(hits)
    }

    /// Resolves prepared params and applies the outcome to the arena.
    ///
    /// Conditional talents are taken from the attacker's character for the
    /// params' skill. A player killing an enemy is awarded its XP.
    ///
    /// # Errors
    ///
    /// Any pipeline [`ConfigError`]; nothing is applied in that case.
    pub fn resolve_hit(&mut self, params: &DamageEffectParams) -> Result<SkillHit, SessionError> {
        let capture = AttributeCapture::capture_from(&self.arena, params.source, params.target);
        let talents = match (params.source, &params.skill) {
            (Some(source), Some(skill)) => self
                .characters
                .get(&source)
                .map_or(SkillTalents::none(), |character| {
                    character.talents.talents_for_skill(skill)
                }),
            _ => SkillTalents::none(),
        };

        let resolver = DamageResolver::new(&self.tags, &self.definitions, &self.data.curves);
        let mut sink = CombatResolver::new(&mut self.arena, &self.tags);
        let outcome = resolver.resolve(params, &capture, talents, &mut self.roller, &mut sink)?;
        let kills = sink.kills().to_vec();

        let mut hit = SkillHit {
            outcome,
            kills,
            xp_awarded: 0,
            level_up: None,
        };
        let Some(source) = params.source.filter(|id| self.characters.contains_key(id)) else {
            return Ok(hit);
        };
        hit.xp_awarded = hit
            .kills
            .iter()
            .filter_map(|id| self.arena.get(*id).and_then(|actor| actor.as_enemy()))
            .map(|enemy| enemy.xp_reward)
            .sum();
        if hit.xp_awarded > 0 {
            hit.level_up = Some(self.award_xp(source, hit.xp_awarded)?);
        }
        Ok(hit)
    }

    /// Plans a projectile volley of `skill` fired by `source` at
    /// `target_location`. Skills without volley settings fire nothing.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownSkill`] or [`SessionError::UnknownActor`].
    pub fn fire_volley(
        &mut self,
        source: ActorId,
        skill: &Tag,
        target_location: Vec3,
        homing_target: Option<ActorId>,
    ) -> Result<Vec<ProjectileLaunch>, SessionError> {
        let defaults = self.damage_skill(skill)?;
        let Some(volley) = defaults.volley else {
            warn!(%skill, "skill has no volley settings");
            return Ok(Vec::new());
        };
        let origin = self
            .arena
            .get(source)
            .ok_or(SessionError::UnknownActor(source))?
            .location();
        let count = volley.projectile_count(self.talents_of(source, skill), &self.tags);
        Ok(volley.plan(origin, target_location, homing_target, count, &mut self.roller))
    }

    /// The beam path of `skill` from `source` through `first`: `first` and
    /// then each hop, up to the talent-modified maximum. Skills without beam
    /// settings reach only `first`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownSkill`], or [`SessionError::UnknownActor`] if
    /// `first` is not a live combatant.
    pub fn chain_targets(
        &self,
        source: ActorId,
        skill: &Tag,
        first: ActorId,
    ) -> Result<Vec<TargetCandidate>, SessionError> {
        let defaults = self.damage_skill(skill)?;
        let faction = self.faction_of(source)?;
        let view = self
            .arena
            .combatant(first)
            .filter(|view| !view.dead)
            .ok_or(SessionError::UnknownActor(first))?;
        let first = TargetCandidate {
            actor: first,
            location: view.location,
            faction: view.faction,
        };
        let Some(beam) = defaults.beam else {
            return Ok(vec![first]);
        };
        let count = beam.max_targets(self.talents_of(source, skill), &self.tags);
        Ok(beam.walk(&self.arena, source, faction, first, count))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn damage_skill(&self, skill: &Tag) -> Result<&DamageSkill, SessionError> {
        Ok(self
            .data
            .damage_skill(skill)
            .ok_or_else(|| ConfigError::UnknownSkill(skill.clone()))?)
    }

    fn faction_of(&self, actor: ActorId) -> Result<Faction, SessionError> {
        self.arena
            .get(actor)
            .map(Actor::faction)
            .ok_or(SessionError::UnknownActor(actor))
    }

    fn talents_of<'a>(&'a self, actor: ActorId, skill: &'a Tag) -> SkillTalents<'a> {
        self.characters
            .get(&actor)
            .map_or(SkillTalents::none(), |character| {
                character.talents.talents_for_skill(skill)
            })
    }

    fn build_params(
        &mut self,
        source: ActorId,
        skill: &Tag,
        target: Option<ActorId>,
        radial_origin: Option<Vec3>,
    ) -> Result<DamageEffectParams, SessionError> {
        let defaults = self
            .data
            .damage_skill(skill)
            .ok_or_else(|| ConfigError::UnknownSkill(skill.clone()))?;
        let attacker = self
            .arena
            .get(source)
            .ok_or(SessionError::UnknownActor(source))?;
        let source_location = attacker.location();
        let combat_level = attacker.as_combatant().map_or(1, |combat| combat.level);

        let ability_level = match self.characters.get(&source) {
            Some(character) => character.abilities.ensure_activatable(skill)?.level,
            None => combat_level,
        };
        let target_location = match target {
            Some(id) => Some(
                self.arena
                    .get(id)
                    .ok_or(SessionError::UnknownActor(id))?
                    .location(),
            ),
            None => None,
        };

        let skill_use = SkillUse {
            source: Some(source),
            source_location,
            target,
            target_location,
            ability_level,
            radial_origin,
        };
        let talents = self
            .characters
            .get(&source)
            .map_or(SkillTalents::none(), |character| {
                character.talents.talents_for_skill(skill)
            });
        Ok(defaults.make_params(&skill_use, talents, &self.tags, &mut self.roller))
    }
}

fn player_components(
    arena: &mut Arena,
    player: ActorId,
) -> Result<&mut PlayerComponents, SessionError> {
    arena
        .get_mut(player)
        .ok_or(SessionError::UnknownActor(player))?
        .as_player_mut()
        .ok_or(SessionError::NotPlayer(player))
}
