//! Native tags of the combat core.
//!
//! Every tag the core itself reasons about is listed in [`NATIVE_TAG_NAMES`]
//! and resolved once into a [`NativeTags`] value. Content (specific abilities,
//! talents) registers its own names next to these before the registry is
//! frozen.
//!
//! # Example
//!
//! ```
//! use emberfall_core::tags::NativeTags;
//!
//! let (registry, tags) = NativeTags::bootstrap(&["Abilities.Fire.Firebolt"]).unwrap();
//! assert!(registry.contains("Abilities.Fire.Firebolt"));
//! assert_eq!(tags.resistance_for(&tags.damage_fire), Some(&tags.resistance_fire));
//! assert_eq!(tags.debuff_for(&tags.damage_lightning), Some(&tags.debuff_stun));
//! ```

use lattice::{Tag, TagError, TagRegistry, TagRegistryBuilder};

/// Names the core registers in every registry.
pub const NATIVE_TAG_NAMES: &[&str] = &[
    // Primary and secondary attributes
    "Attributes.Primary.Strength",
    "Attributes.Primary.Intelligence",
    "Attributes.Primary.Resilience",
    "Attributes.Primary.Vigor",
    "Attributes.Secondary.Armor",
    "Attributes.Secondary.ArmorPenetration",
    "Attributes.Secondary.BlockChance",
    "Attributes.Secondary.CriticalHitChance",
    "Attributes.Secondary.CriticalHitDamage",
    "Attributes.Secondary.CriticalHitResistance",
    "Attributes.Secondary.HealthRegeneration",
    "Attributes.Secondary.ManaRegeneration",
    "Attributes.Secondary.MaxHealth",
    "Attributes.Secondary.MaxMana",
    "Attributes.Vital.Health",
    "Attributes.Vital.Mana",
    "Attributes.Resistance.Fire",
    "Attributes.Resistance.Lightning",
    "Attributes.Resistance.Arcane",
    "Attributes.Resistance.Physical",
    // Input slots
    "InputTag.LMB",
    "InputTag.RMB",
    "InputTag.1",
    "InputTag.2",
    "InputTag.3",
    "InputTag.4",
    "InputTag.Passive.1",
    "InputTag.Passive.2",
    // Damage types
    "Damage.Fire",
    "Damage.Lightning",
    "Damage.Arcane",
    "Damage.Physical",
    // Debuffs and their set-by-caller magnitudes
    "Debuff.Burn",
    "Debuff.Stun",
    "Debuff.Arcane",
    "Debuff.Physical",
    "Debuff.Chance",
    "Debuff.Damage",
    "Debuff.Duration",
    "Debuff.Frequency",
    // Skill-level attributes modified by talents
    "Skills.Attributes.CriticalHitChance",
    "Skills.Attributes.CriticalHitDamage",
    "Skills.Attributes.ArmorPenetration",
    "Skills.Attributes.KnockbackChance",
    "Skills.Attributes.KnockbackForceMagnitude",
    "Skills.Attributes.MaxProjectiles",
    "Skills.Attributes.MaxNumTargets",
    // Factions
    "Faction.Player",
    "Faction.Enemy",
    // Ability roots
    "Abilities.Attack",
    "Abilities.Summon",
    "Abilities.HitReact",
    "Abilities.Passive",
];

/// Resolved handles for every native tag plus the damage-type maps.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct NativeTags {
    pub armor: Tag,
    pub armor_penetration: Tag,
    pub block_chance: Tag,
    pub critical_hit_chance: Tag,
    pub critical_hit_damage: Tag,
    pub critical_hit_resistance: Tag,
    pub health: Tag,
    pub max_health: Tag,
    pub mana: Tag,
    pub max_mana: Tag,

    pub resistance_fire: Tag,
    pub resistance_lightning: Tag,
    pub resistance_arcane: Tag,
    pub resistance_physical: Tag,

    pub input_lmb: Tag,
    pub input_rmb: Tag,
    pub input_1: Tag,
    pub input_2: Tag,
    pub input_3: Tag,
    pub input_4: Tag,
    pub input_passive_1: Tag,
    pub input_passive_2: Tag,

    pub damage: Tag,
    pub damage_fire: Tag,
    pub damage_lightning: Tag,
    pub damage_arcane: Tag,
    pub damage_physical: Tag,

    pub debuff_burn: Tag,
    pub debuff_stun: Tag,
    pub debuff_arcane: Tag,
    pub debuff_physical: Tag,
    pub debuff_chance: Tag,
    pub debuff_damage: Tag,
    pub debuff_duration: Tag,
    pub debuff_frequency: Tag,

    pub skill_critical_hit_chance: Tag,
    pub skill_critical_hit_damage: Tag,
    pub skill_armor_penetration: Tag,
    pub skill_knockback_chance: Tag,
    pub skill_knockback_force: Tag,
    pub skill_max_projectiles: Tag,
    pub skill_max_num_targets: Tag,

    pub faction_player: Tag,
    pub faction_enemy: Tag,

    /// Damage type → resistance attribute, in evaluation order.
    pub damage_types_to_resistances: Vec<(Tag, Tag)>,
    /// Damage type → debuff, in evaluation order.
    pub damage_types_to_debuffs: Vec<(Tag, Tag)>,
}

impl NativeTags {
    /// Adds every native name to `builder`.
    ///
    /// # Errors
    ///
    /// Only fails if a native name were malformed.
    pub fn register(builder: &mut TagRegistryBuilder) -> Result<(), TagError> {
        builder.register_all(NATIVE_TAG_NAMES.iter().copied())?;
        Ok(())
    }

    /// Resolves handles from a registry that already contains the native
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NotRegistered`] if [`NativeTags::register`] was
    /// not applied to the registry's builder.
    pub fn resolve(registry: &TagRegistry) -> Result<Self, TagError> {
        let t = |name: &str| registry.request(name);

        let damage_fire = t("Damage.Fire")?;
        let damage_lightning = t("Damage.Lightning")?;
        let damage_arcane = t("Damage.Arcane")?;
        let damage_physical = t("Damage.Physical")?;
        let resistance_fire = t("Attributes.Resistance.Fire")?;
        let resistance_lightning = t("Attributes.Resistance.Lightning")?;
        let resistance_arcane = t("Attributes.Resistance.Arcane")?;
        let resistance_physical = t("Attributes.Resistance.Physical")?;
        let debuff_burn = t("Debuff.Burn")?;
        let debuff_stun = t("Debuff.Stun")?;
        let debuff_arcane = t("Debuff.Arcane")?;
        let debuff_physical = t("Debuff.Physical")?;

        Ok(Self {
            armor: t("Attributes.Secondary.Armor")?,
            armor_penetration: t("Attributes.Secondary.ArmorPenetration")?,
            block_chance: t("Attributes.Secondary.BlockChance")?,
            critical_hit_chance: t("Attributes.Secondary.CriticalHitChance")?,
            critical_hit_damage: t("Attributes.Secondary.CriticalHitDamage")?,
            critical_hit_resistance: t("Attributes.Secondary.CriticalHitResistance")?,
            health: t("Attributes.Vital.Health")?,
            max_health: t("Attributes.Secondary.MaxHealth")?,
            mana: t("Attributes.Vital.Mana")?,
            max_mana: t("Attributes.Secondary.MaxMana")?,

            input_lmb: t("InputTag.LMB")?,
            input_rmb: t("InputTag.RMB")?,
            input_1: t("InputTag.1")?,
            input_2: t("InputTag.2")?,
            input_3: t("InputTag.3")?,
            input_4: t("InputTag.4")?,
            input_passive_1: t("InputTag.Passive.1")?,
            input_passive_2: t("InputTag.Passive.2")?,

            damage: t("Damage")?,

            debuff_chance: t("Debuff.Chance")?,
            debuff_damage: t("Debuff.Damage")?,
            debuff_duration: t("Debuff.Duration")?,
            debuff_frequency: t("Debuff.Frequency")?,

            skill_critical_hit_chance: t("Skills.Attributes.CriticalHitChance")?,
            skill_critical_hit_damage: t("Skills.Attributes.CriticalHitDamage")?,
            skill_armor_penetration: t("Skills.Attributes.ArmorPenetration")?,
            skill_knockback_chance: t("Skills.Attributes.KnockbackChance")?,
            skill_knockback_force: t("Skills.Attributes.KnockbackForceMagnitude")?,
            skill_max_projectiles: t("Skills.Attributes.MaxProjectiles")?,
            skill_max_num_targets: t("Skills.Attributes.MaxNumTargets")?,

            faction_player: t("Faction.Player")?,
            faction_enemy: t("Faction.Enemy")?,

            damage_types_to_resistances: vec![
                (damage_fire.clone(), resistance_fire.clone()),
                (damage_lightning.clone(), resistance_lightning.clone()),
                (damage_arcane.clone(), resistance_arcane.clone()),
                (damage_physical.clone(), resistance_physical.clone()),
            ],
            damage_types_to_debuffs: vec![
                (damage_fire.clone(), debuff_burn.clone()),
                (damage_lightning.clone(), debuff_stun.clone()),
                (damage_arcane.clone(), debuff_arcane.clone()),
                (damage_physical.clone(), debuff_physical.clone()),
            ],

            damage_fire,
            damage_lightning,
            damage_arcane,
            damage_physical,
            resistance_fire,
            resistance_lightning,
            resistance_arcane,
            resistance_physical,
            debuff_burn,
            debuff_stun,
            debuff_arcane,
            debuff_physical,
        })
    }

    /// Builds a registry holding the native names plus `extra`, and resolves
    /// the native handles from it.
    ///
    /// # Errors
    ///
    /// Fails if any of `extra` is malformed.
    pub fn bootstrap(extra: &[&str]) -> Result<(TagRegistry, Self), TagError> {
        let mut builder = TagRegistry::builder();
        Self::register(&mut builder)?;
        builder.register_all(extra.iter().copied())?;
        let registry = builder.build();
        let tags = Self::resolve(&registry)?;
        Ok((registry, tags))
    }

    /// Resistance attribute for a damage type.
    #[must_use]
    pub fn resistance_for(&self, damage_type: &Tag) -> Option<&Tag> {
        self.damage_types_to_resistances
            .iter()
            .find(|(damage, _)| damage == damage_type)
            .map(|(_, resistance)| resistance)
    }

    /// Debuff applied by a damage type.
    #[must_use]
    pub fn debuff_for(&self, damage_type: &Tag) -> Option<&Tag> {
        self.damage_types_to_debuffs
            .iter()
            .find(|(damage, _)| damage == damage_type)
            .map(|(_, debuff)| debuff)
    }

    /// Current-value attribute → max-value attribute pairs used for
    /// percent-of-max checks.
    #[must_use]
    pub fn current_to_max(&self) -> Vec<(Tag, Tag)> {
        vec![
            (self.health.clone(), self.max_health.clone()),
            (self.mana.clone(), self.max_mana.clone()),
        ]
    }
}
