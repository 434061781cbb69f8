//! Per-character ability registry.
//!
//! # List Lock
//!
//! Every mutation runs inside [`AbilityRegistry::with_list_lock`]. The
//! exclusive borrow is the critical section; notifications raised while the
//! list is being changed are queued and published only once the list is
//! consistent again. A listener therefore never sees two abilities sharing a
//! slot, even transiently.
//!
//! # Authority
//!
//! [`AbilityRegistry::spend_spell_point`] and
//! [`AbilityRegistry::equip_ability`] are server-only. The host decides where
//! they may be invoked; the registry itself does not know about networking.

use lattice::Tag;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::catalog::AbilityCatalog;
use super::spec::{AbilitySpec, AbilityStatus};
use crate::entity::ActorId;
use crate::error::AbilityError;
use crate::events::{EventBus, SubscriptionId};
use crate::progression::PlayerProgression;

/// Notification published by an [`AbilityRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbilityEvent {
    /// Startup abilities were granted.
    AbilitiesGiven {
        /// Owning character.
        owner: ActorId,
    },
    /// An ability's status or level changed.
    StatusChanged {
        /// The ability.
        ability: Tag,
        /// New status.
        status: AbilityStatus,
        /// Current level.
        level: u32,
    },
    /// An ability was bound to a slot.
    Equipped {
        /// The ability.
        ability: Tag,
        /// Status after equipping.
        status: AbilityStatus,
        /// The new slot.
        slot: Tag,
        /// The slot it held before, if any.
        previous_slot: Option<Tag>,
    },
    /// A passive ability's ongoing effect turned on or off.
    PassiveEffect {
        /// The passive ability.
        ability: Tag,
        /// Whether the effect is now active.
        active: bool,
    },
    /// A passive ability was displaced and must deactivate.
    PassiveDeactivated {
        /// The passive ability.
        ability: Tag,
    },
    /// An ability must be activated once right now.
    ActivateOnce {
        /// The ability.
        ability: Tag,
    },
}

/// Result of a successful [`AbilityRegistry::equip_ability`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipOutcome {
    /// The ability that was equipped.
    pub ability: Tag,
    /// Its status afterwards.
    pub status: AbilityStatus,
    /// The slot it now holds.
    pub slot: Tag,
    /// The slot it held before.
    pub previous_slot: Option<Tag>,
}

/// The abilities one character holds.
#[derive(Debug, Serialize, Deserialize)]
pub struct AbilityRegistry {
    owner: ActorId,
    specs: Vec<AbilitySpec>,
    startup_abilities_given: bool,
    #[serde(skip)]
    events: EventBus<AbilityEvent>,
}

impl AbilityRegistry {
    /// Creates an empty registry for `owner`.
    #[must_use]
    pub fn new(owner: ActorId) -> Self {
        Self {
            owner,
            specs: Vec::new(),
            startup_abilities_given: false,
            events: EventBus::new(),
        }
    }

    /// Owning character.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// All specs, in grant order.
    #[must_use]
    pub fn specs(&self) -> &[AbilitySpec] {
        &self.specs
    }

    /// Whether startup abilities were already granted.
    #[must_use]
    pub const fn startup_abilities_given(&self) -> bool {
        self.startup_abilities_given
    }

    /// Subscribes to ability notifications.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&AbilityEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Removes a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Runs `mutate` with exclusive access to the spec list, then publishes
    /// the notifications it queued.
    fn with_list_lock<R>(
        &mut self,
        mutate: impl FnOnce(&mut Vec<AbilitySpec>, &mut Vec<AbilityEvent>) -> R,
    ) -> R {
        let mut pending = Vec::new();
        let result = mutate(&mut self.specs, &mut pending);
        self.events.publish_all(&pending);
        result
    }

    fn index_of(&self, ability: &Tag) -> Option<usize> {
        self.specs
            .iter()
            .position(|spec| spec.ability.matches(ability))
    }

    // =========================================================================
    // Granting
    // =========================================================================

    /// Grants the character's startup abilities, once.
    ///
    /// Each ability starts at level 1, Equipped, in the catalog's default
    /// input slot. Returns false (and does nothing) if startup abilities were
    /// already granted.
    pub fn grant_startup_abilities(
        &mut self,
        abilities: &[Tag],
        catalog: &dyn AbilityCatalog,
    ) -> bool {
        if self.startup_abilities_given {
            warn!(owner = %self.owner, "startup abilities already granted");
            return false;
        }
        let owner = self.owner;
        self.with_list_lock(|specs, pending| {
            for ability in abilities {
                if specs.iter().any(|spec| spec.ability.matches_exact(ability)) {
                    continue;
                }
                let slot = catalog
                    .find(ability)
                    .and_then(|info| info.startup_input.clone());
                if let Some(slot) = &slot {
                    for other in specs.iter_mut().filter(|spec| spec.has_slot(slot)) {
                        other.slot = None;
                    }
                }
                let mut spec = AbilitySpec::new(owner, ability.clone(), AbilityStatus::Equipped);
                spec.slot = slot;
                debug!(%owner, ability = %spec.ability, slot = ?spec.slot, "startup ability granted");
                specs.push(spec);
            }
            pending.push(AbilityEvent::AbilitiesGiven { owner });
        });
        self.startup_abilities_given = true;
        true
    }

    /// Grants passive startup abilities and requests a one-time activation of
    /// each. Returns how many were newly granted.
    pub fn grant_passive_startup_abilities(&mut self, abilities: &[Tag]) -> usize {
        let owner = self.owner;
        self.with_list_lock(|specs, pending| {
            let mut granted = 0;
            for ability in abilities {
                if specs.iter().any(|spec| spec.ability.matches_exact(ability)) {
                    continue;
                }
                specs.push(AbilitySpec::new(owner, ability.clone(), AbilityStatus::Unlocked));
                pending.push(AbilityEvent::ActivateOnce {
                    ability: ability.clone(),
                });
                granted += 1;
            }
            granted
        })
    }

    /// Makes every catalog ability whose level requirement is met Eligible.
    ///
    /// Existing specs are never touched, so statuses are never demoted.
    /// Returns the abilities that became Eligible.
    pub fn update_ability_statuses_for_level(
        &mut self,
        level: u32,
        catalog: &dyn AbilityCatalog,
    ) -> Vec<Tag> {
        let owner = self.owner;
        self.with_list_lock(|specs, pending| {
            let mut newly_eligible = Vec::new();
            for info in catalog.abilities() {
                if level < info.level_requirement {
                    continue;
                }
                if specs.iter().any(|spec| spec.ability.matches_exact(&info.ability)) {
                    continue;
                }
                specs.push(AbilitySpec::new(owner, info.ability.clone(), AbilityStatus::Eligible));
                pending.push(AbilityEvent::StatusChanged {
                    ability: info.ability.clone(),
                    status: AbilityStatus::Eligible,
                    level: 1,
                });
                debug!(%owner, ability = %info.ability, level, "ability eligible");
                newly_eligible.push(info.ability.clone());
            }
            newly_eligible
        })
    }

    // =========================================================================
    // Spending and Equipping
    // =========================================================================

    /// Spends one spell point on `ability`. Server-only.
    ///
    /// Eligible abilities become Unlocked; Unlocked or Equipped abilities gain
    /// a level. Returns the new status and level.
    ///
    /// # Errors
    ///
    /// - [`AbilityError::NotGranted`] if the character lacks the ability
    /// - [`AbilityError::NotUnlockable`] if it is Locked
    /// - [`AbilityError::NoSpellPoints`] if no spell point is available
    pub fn spend_spell_point(
        &mut self,
        ability: &Tag,
        progression: &mut PlayerProgression,
    ) -> Result<(AbilityStatus, u32), AbilityError> {
        let index = self
            .index_of(ability)
            .ok_or_else(|| AbilityError::NotGranted(ability.clone()))?;
        if self.specs[index].status == AbilityStatus::Locked {
            return Err(AbilityError::NotUnlockable(self.specs[index].ability.clone()));
        }
        progression
            .spend_spell_points(1)
            .map_err(|_| AbilityError::NoSpellPoints)?;

        let owner = self.owner;
        Ok(self.with_list_lock(|specs, pending| {
            let spec = &mut specs[index];
            match spec.status {
                AbilityStatus::Eligible => spec.status = AbilityStatus::Unlocked,
                AbilityStatus::Unlocked | AbilityStatus::Equipped => spec.level += 1,
                AbilityStatus::Locked => {}
            }
            debug!(%owner, ability = %spec.ability, status = %spec.status, level = spec.level, "spell point spent");
            pending.push(AbilityEvent::StatusChanged {
                ability: spec.ability.clone(),
                status: spec.status,
                level: spec.level,
            });
            (spec.status, spec.level)
        }))
    }

    /// Binds `ability` to `slot`. Server-only.
    ///
    /// Whatever held the slot loses it (a displaced passive is deactivated).
    /// A passive ability entering its first slot is activated once. Equipping
    /// an ability into the slot it already holds changes nothing.
    ///
    /// # Errors
    ///
    /// - [`AbilityError::NotGranted`] if the character lacks the ability
    /// - [`AbilityError::NotEquippable`] unless it is Unlocked or Equipped
    pub fn equip_ability(
        &mut self,
        ability: &Tag,
        slot: &Tag,
        catalog: &dyn AbilityCatalog,
    ) -> Result<EquipOutcome, AbilityError> {
        let index = self
            .index_of(ability)
            .ok_or_else(|| AbilityError::NotGranted(ability.clone()))?;
        let status = self.specs[index].status;
        if !status.is_usable() {
            return Err(AbilityError::NotEquippable {
                ability: self.specs[index].ability.clone(),
                status,
            });
        }

        let owner = self.owner;
        Ok(self.with_list_lock(|specs, pending| {
            let ability = specs[index].ability.clone();
            let previous_slot = specs[index].slot.clone();
            let outcome = EquipOutcome {
                ability: ability.clone(),
                status: AbilityStatus::Equipped,
                slot: slot.clone(),
                previous_slot: previous_slot.clone(),
            };
            let equipped_event = AbilityEvent::Equipped {
                ability: ability.clone(),
                status: AbilityStatus::Equipped,
                slot: slot.clone(),
                previous_slot: previous_slot.clone(),
            };

            if let Some(occupant) = specs.iter().position(|spec| spec.has_slot(slot)) {
                if occupant == index {
                    pending.push(equipped_event);
                    return outcome;
                }
                let displaced = specs[occupant].ability.clone();
                if Self::is_passive_ability(&specs[occupant], catalog) {
                    pending.push(AbilityEvent::PassiveEffect {
                        ability: displaced.clone(),
                        active: false,
                    });
                    pending.push(AbilityEvent::PassiveDeactivated {
                        ability: displaced.clone(),
                    });
                }
                debug!(%owner, ability = %displaced, %slot, "slot cleared");
                specs[occupant].slot = None;
            }

            if previous_slot.is_none() && Self::is_passive_ability(&specs[index], catalog) {
                pending.push(AbilityEvent::ActivateOnce {
                    ability: ability.clone(),
                });
                pending.push(AbilityEvent::PassiveEffect {
                    ability: ability.clone(),
                    active: true,
                });
            }

            let spec = &mut specs[index];
            spec.slot = Some(slot.clone());
            spec.status = AbilityStatus::Equipped;
            debug!(%owner, %ability, %slot, previous = ?previous_slot, "ability equipped");
            pending.push(equipped_event);
            outcome
        }))
    }

    /// Unbinds `ability` from its slot. Status is unchanged.
    pub fn clear_slot(&mut self, ability: &Tag) -> bool {
        let Some(index) = self.index_of(ability) else {
            return false;
        };
        self.with_list_lock(|specs, _| specs[index].slot.take().is_some())
    }

    /// Unbinds every ability holding `slot`. Returns how many were unbound.
    pub fn clear_all_of_slot(&mut self, slot: &Tag) -> usize {
        self.with_list_lock(|specs, _| {
            let mut cleared = 0;
            for spec in specs.iter_mut().filter(|spec| spec.has_slot(slot)) {
                spec.slot = None;
                cleared += 1;
            }
            cleared
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// First spec whose ability equals or descends from `ability`.
    #[must_use]
    pub fn spec_for_ability(&self, ability: &Tag) -> Option<&AbilitySpec> {
        self.index_of(ability).map(|index| &self.specs[index])
    }

    /// Spec bound to exactly `slot`.
    #[must_use]
    pub fn spec_for_slot(&self, slot: &Tag) -> Option<&AbilitySpec> {
        self.specs.iter().find(|spec| spec.has_slot(slot))
    }

    /// Status of `ability`, if granted.
    #[must_use]
    pub fn status_for_ability(&self, ability: &Tag) -> Option<AbilityStatus> {
        self.spec_for_ability(ability).map(|spec| spec.status)
    }

    /// Slot of `ability`, if granted and bound.
    #[must_use]
    pub fn slot_for_ability(&self, ability: &Tag) -> Option<&Tag> {
        self.spec_for_ability(ability)
            .and_then(|spec| spec.slot.as_ref())
    }

    /// Returns true if no ability holds `slot`.
    #[must_use]
    pub fn is_slot_empty(&self, slot: &Tag) -> bool {
        self.spec_for_slot(slot).is_none()
    }

    /// Returns true if the catalog marks the spec's ability as passive.
    #[must_use]
    pub fn is_passive_ability(spec: &AbilitySpec, catalog: &dyn AbilityCatalog) -> bool {
        catalog.is_passive(&spec.ability)
    }

    /// Confirms `ability` may be activated and returns its spec.
    ///
    /// # Errors
    ///
    /// - [`AbilityError::NotGranted`] if the character lacks the ability
    /// - [`AbilityError::NotActivatable`] unless it is Unlocked or Equipped
    pub fn ensure_activatable(&self, ability: &Tag) -> Result<&AbilitySpec, AbilityError> {
        let spec = self
            .spec_for_ability(ability)
            .ok_or_else(|| AbilityError::NotGranted(ability.clone()))?;
        if spec.status.is_usable() {
            Ok(spec)
        } else {
            Err(AbilityError::NotActivatable {
                ability: spec.ability.clone(),
                status: spec.status,
            })
        }
    }
}
