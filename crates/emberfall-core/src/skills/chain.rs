//! Beam chains: a beam hits one target, then jumps to nearby enemies.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{ActorId, Faction};
use crate::tags::NativeTags;
use crate::talent::SkillTalents;
use crate::targeting::{
    is_hostile, live_actors_within_radius, nearest_k_targets, nearest_target, CombatantLookup,
    SpatialQuery, TargetCandidate,
};

/// Chain settings of a beam skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamChain {
    /// How far the beam may jump from the last target.
    pub chain_radius: f32,
    /// Targets after the first, before talents.
    pub max_chain_targets: u32,
}

impl BeamChain {
    /// Additional targets allowed, after talents on
    /// `Skills.Attributes.MaxNumTargets`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn max_targets(&self, talents: SkillTalents<'_>, tags: &NativeTags) -> usize {
        let base = self.max_chain_targets as f32;
        talents
            .compute_modifier(base, &tags.skill_max_num_targets)
            .max(0.0) as usize
    }

    /// The closest live enemy of `owner_faction` within the chain radius of
    /// `from`, skipping `owner` and anything already chained.
    pub fn find_next_target<W>(
        &self,
        world: &W,
        owner: ActorId,
        owner_faction: Faction,
        chained: &[ActorId],
        from: Vec3,
    ) -> Option<TargetCandidate>
    where
        W: SpatialQuery + CombatantLookup + ?Sized,
    {
        let mut ignore = chained.to_vec();
        ignore.push(owner);
        let candidates: Vec<TargetCandidate> =
            live_actors_within_radius(world, from, self.chain_radius, &ignore)
                .into_iter()
                .filter(|c| !ignore.contains(&c.actor) && is_hostile(owner_faction, c.faction))
                .collect();
        nearest_target(&candidates, from)
    }

    /// Up to `count` enemies around `first`, nearest first, all within the
    /// chain radius of `first`.
    pub fn additional_targets<W>(
        &self,
        world: &W,
        owner: ActorId,
        owner_faction: Faction,
        first: &TargetCandidate,
        count: usize,
    ) -> Vec<TargetCandidate>
    where
        W: SpatialQuery + CombatantLookup + ?Sized,
    {
        let ignore = [owner, first.actor];
        let candidates: Vec<TargetCandidate> =
            live_actors_within_radius(world, first.location, self.chain_radius, &ignore)
                .into_iter()
                .filter(|c| !ignore.contains(&c.actor) && is_hostile(owner_faction, c.faction))
                .collect();
        nearest_k_targets(&candidates, first.location, count)
    }

    /// Walks the chain from `first`: each hop jumps to the closest unchained
    /// enemy of the previous target. Returns `first` followed by at most
    /// `count` hops.
    pub fn walk<W>(
        &self,
        world: &W,
        owner: ActorId,
        owner_faction: Faction,
        first: TargetCandidate,
        count: usize,
    ) -> Vec<TargetCandidate>
    where
        W: SpatialQuery + CombatantLookup + ?Sized,
    {
        let mut chain = vec![first];
        let mut chained = vec![first.actor];
        while chain.len() <= count {
            let from = chain[chain.len() - 1].location;
            let Some(next) = self.find_next_target(world, owner, owner_faction, &chained, from)
            else {
                break;
            };
            chained.push(next.actor);
            chain.push(next);
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::entity::{
        ActorInner, AttributeSet, CombatState, EnemyComponents, PlayerComponents, TransformState,
    };

    fn enemy(arena: &mut Arena, x: f32) -> ActorId {
        arena.spawn(ActorInner::Enemy(EnemyComponents {
            transform: TransformState::at(Vec3::new(x, 0.0, 0.0)),
            combat: CombatState::new(Faction::ENEMY, AttributeSet::new()),
            xp_reward: 1,
        }))
    }

    fn setup() -> (Arena, ActorId, Vec<ActorId>) {
        let mut arena = Arena::new();
        let player = arena.spawn(ActorInner::Player(PlayerComponents {
            combat: CombatState::new(Faction::PLAYER, AttributeSet::new()),
            ..PlayerComponents::default()
        }));
        let enemies = vec![
            enemy(&mut arena, 100.0),
            enemy(&mut arena, 150.0),
            enemy(&mut arena, 230.0),
            enemy(&mut arena, 900.0),
        ];
        (arena, player, enemies)
    }

    fn candidate(arena: &Arena, id: ActorId) -> TargetCandidate {
        let view = arena.combatant(id).unwrap();
        TargetCandidate {
            actor: id,
            location: view.location,
            faction: view.faction,
        }
    }

    fn beam() -> BeamChain {
        BeamChain {
            chain_radius: 100.0,
            max_chain_targets: 2,
        }
    }

    #[test]
    fn walk_hops_until_out_of_range() {
        let (arena, player, enemies) = setup();
        let first = candidate(&arena, enemies[0]);
        let chain = beam().walk(&arena, player, Faction::PLAYER, first, 5);
        let ids: Vec<_> = chain.iter().map(|c| c.actor).collect();
        assert_eq!(ids, vec![enemies[0], enemies[1], enemies[2]]);
    }

    #[test]
    fn walk_respects_count() {
        let (arena, player, enemies) = setup();
        let first = candidate(&arena, enemies[0]);
        assert_eq!(beam().walk(&arena, player, Faction::PLAYER, first, 1).len(), 2);
        assert_eq!(beam().walk(&arena, player, Faction::PLAYER, first, 0).len(), 1);
    }

    #[test]
    fn allies_are_never_chained() {
        let (arena, player, enemies) = setup();
        let first = candidate(&arena, enemies[0]);
        let next = beam().find_next_target(&arena, player, Faction::ENEMY, &[enemies[0]], first.location);
        assert!(next.is_none());
    }

    #[test]
    fn additional_targets_are_nearest_first() {
        let (arena, player, enemies) = setup();
        let first = candidate(&arena, enemies[1]);
        let wide = BeamChain {
            chain_radius: 1000.0,
            max_chain_targets: 2,
        };
        let extra = wide.additional_targets(&arena, player, Faction::PLAYER, &first, 2);
        let ids: Vec<_> = extra.iter().map(|c| c.actor).collect();
        assert_eq!(ids, vec![enemies[0], enemies[2]]);
    }

    #[test]
    fn max_targets_follows_talents() {
        let (_, tags) = NativeTags::bootstrap(&[]).unwrap();
        assert_eq!(beam().max_targets(SkillTalents::none(), &tags), 2);
    }
}
