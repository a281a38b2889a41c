//! # Economy Configuration
//!
//! Every tunable constant of the engine, with a literal default for each.
//!
//! Configuration is optional: any section or field may be left out of the
//! TOML document and the default is used instead. Enum-indexed tables
//! (`PerTier`, `PerRarity`) are given whole when present.
//!
//! ```toml
//! [drops]
//! equipment_drop_percent = 5.0
//! restrict_to_usable_items = false
//!
//! [rarity_weights]
//! common = 60
//! rare = 28
//! epic = 9
//! legendary = 3
//!
//! [upgrades]
//! scaling_per_level = 0.1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};
use crate::item::CurrencyKind;
use crate::tier::{MonsterTier, PerRarity, PerTier};

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Drop chances, potion stacks and drop placement.
    pub drops: DropConfig,
    /// Equipment rarity weights.
    pub rarity_weights: PerRarity<u32>,
    /// Potion rarity weights. Heavily common.
    pub potion_rarity_weights: PotionRarityWeights,
    /// Scaling curve, upgrade increments and drop-time upgrade ladders.
    pub upgrades: UpgradeConfig,
    /// Gold valuation.
    pub pricing: PricingConfig,
    /// Dust costs of upgrades, which also price dismantling.
    pub dust: DustConfig,
    /// Cleanse cost and refund.
    pub cleanse: CleanseConfig,
    /// On-kill currency bonus ranges.
    pub on_kill: OnKillConfig,
}

impl Default for PerRarity<u32> {
    fn default() -> Self {
        Self::new(70, 22, 6, 2)
    }
}

/// Potion rarity weights, kept apart from the equipment table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PotionRarityWeights(pub PerRarity<u32>);

impl Default for PotionRarityWeights {
    fn default() -> Self {
        Self(PerRarity::new(85, 11, 3, 1))
    }
}

impl EconomyConfig {
    /// Parses a TOML document. Missing sections and fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if the document does not parse.
    pub fn from_toml_str(source: &str) -> EconomyResult<Self> {
        toml::from_str(source).map_err(|e| EconomyError::InvalidConfig(e.to_string()))
    }

    /// Loads a TOML file, falling back to defaults on any failure.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let config = match std::fs::read_to_string(path) {
            Ok(source) => match Self::from_toml_str(&source) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "economy config rejected, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "economy config unreadable, using defaults");
                Self::default()
            }
        };

        for problem in config.validate() {
            tracing::warn!(%problem, "economy config");
        }
        config
    }

    /// Lists suspicious values. None of them are fatal.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let equipment_total: u64 = crate::tier::Rarity::ALL
            .iter()
            .map(|&r| u64::from(*self.rarity_weights.get(r)))
            .sum();
        if equipment_total == 0 {
            problems.push("rarity_weights sum to zero; every drop resolves to common".to_string());
        }
        let potion_total: u64 = crate::tier::Rarity::ALL
            .iter()
            .map(|&r| u64::from(*self.potion_rarity_weights.0.get(r)))
            .sum();
        if potion_total == 0 {
            problems.push("potion_rarity_weights sum to zero; every potion resolves to common".to_string());
        }

        for (name, value) in [
            ("drops.equipment_drop_percent", self.drops.equipment_drop_percent),
            ("drops.potion_drop_percent", self.drops.potion_drop_percent),
            ("pricing.sell_percent", self.pricing.sell_percent),
            ("cleanse.refund_percent", self.cleanse.refund_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                problems.push(format!("{name} = {value} is outside 0..=100"));
            }
        }

        if self.upgrades.scaling_per_level < 0.0 {
            problems.push(format!(
                "upgrades.scaling_per_level = {} is negative; upgrades would shrink stats",
                self.upgrades.scaling_per_level
            ));
        }

        for tier in MonsterTier::ALL {
            let [low, high] = *self.drops.potion_stacks.get(tier);
            if low == 0 || low > high {
                problems.push(format!("drops.potion_stacks.{tier} = [{low}, {high}] is not a valid range"));
            }
        }

        problems
    }
}

/// Drop chances, potion stacks and drop placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Base equipment drop chance per participant, in percent.
    pub equipment_drop_percent: f64,
    /// Multiplier on the equipment chance per monster tier.
    pub equipment_tier_multipliers: PerTier<f64>,
    /// Base potion drop chance per participant, in percent.
    pub potion_drop_percent: f64,
    /// Multiplier on the potion chance per monster tier.
    pub potion_tier_multipliers: PerTier<f64>,
    /// Inclusive potion stack range per monster tier.
    pub potion_stacks: PerTier<[u32; 2]>,
    /// Upper bound of the stat variance multiplier per rarity; lower bound is 1.0.
    pub stat_variance_max: PerRarity<f64>,
    /// Only drop equipment the participant's hero can use.
    pub restrict_to_usable_items: bool,
    /// Radius around the kill that drops may scatter into.
    pub scatter_radius: f32,
    /// Scatter points tried before falling back to the kill position.
    pub placement_attempts: u32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            equipment_drop_percent: 4.0,
            equipment_tier_multipliers: PerTier::new(1.0, 2.5, 6.0, 25.0),
            potion_drop_percent: 6.0,
            potion_tier_multipliers: PerTier::new(1.0, 1.5, 3.0, 6.0),
            potion_stacks: PerTier::new([1, 1], [1, 2], [2, 3], [3, 5]),
            stat_variance_max: PerRarity::new(1.10, 1.20, 1.30, 1.50),
            restrict_to_usable_items: true,
            scatter_radius: 1.5,
            placement_attempts: 6,
        }
    }
}

impl DropConfig {
    /// Equipment drop chance for `tier`, clamped to 0..=100.
    #[must_use]
    pub fn equipment_chance_percent(&self, tier: MonsterTier) -> f64 {
        (self.equipment_drop_percent * self.equipment_tier_multipliers.get(tier)).clamp(0.0, 100.0)
    }

    /// Potion drop chance for `tier`, clamped to 0..=100.
    #[must_use]
    pub fn potion_chance_percent(&self, tier: MonsterTier) -> f64 {
        (self.potion_drop_percent * self.potion_tier_multipliers.get(tier)).clamp(0.0, 100.0)
    }

    /// Inclusive potion stack range for `tier`, repaired if misconfigured.
    #[must_use]
    pub fn potion_stack_range(&self, tier: MonsterTier) -> (u32, u32) {
        let [low, high] = *self.potion_stacks.get(tier);
        let low = low.max(1);
        (low, high.max(low))
    }
}

/// Scaling curve, upgrade increments and drop-time upgrade ladders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// Fraction added to the stat multiplier per upgrade level.
    pub scaling_per_level: f64,
    /// Smallest attack gain per upgrade.
    pub min_attack_increment: u32,
    /// Smallest defense gain per upgrade.
    pub min_defense_increment: u32,
    /// Smallest ability power gain per upgrade.
    pub min_ability_power_increment: u32,
    /// Smallest health gain per upgrade.
    pub min_health_increment: u32,
    /// Flat crit chance added per upgrade.
    pub crit_chance_per_upgrade: f32,
    /// Flat crit damage added per upgrade.
    pub crit_damage_per_upgrade: f32,
    /// Chance in percent of each successive pre-upgrade level on drop.
    pub drop_ladders: PerTier<Vec<f64>>,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            scaling_per_level: 0.08,
            min_attack_increment: 2,
            min_defense_increment: 2,
            min_ability_power_increment: 2,
            min_health_increment: 10,
            crit_chance_per_upgrade: 1.0,
            crit_damage_per_upgrade: 5.0,
            drop_ladders: PerTier::new(
                vec![8.0],
                vec![15.0, 5.0],
                vec![30.0, 12.0, 4.0],
                vec![50.0, 25.0, 10.0, 3.0],
            ),
        }
    }
}

/// Gold valuation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Base gold value per rarity.
    pub base_value: PerRarity<f64>,
    /// Multiplier applied to every base value.
    pub global_multiplier: f64,
    /// Per-level value multiplier; each level adds `per_level_multiplier - 1`.
    pub per_level_multiplier: f64,
    /// Sell price as a percent of gold value.
    pub sell_percent: f64,
    /// Weights of the linear stat valuation.
    pub stat_weights: StatWeights,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_value: PerRarity::new(40.0, 120.0, 350.0, 900.0),
            global_multiplier: 1.0,
            per_level_multiplier: 1.15,
            sell_percent: 40.0,
            stat_weights: StatWeights::default(),
        }
    }
}

/// Gold weight of one unit of each stat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatWeights {
    /// Per point of attack.
    pub attack: f64,
    /// Per point of defense.
    pub defense: f64,
    /// Per point of health.
    pub health: f64,
    /// Per point of ability power.
    pub ability_power: f64,
    /// Per percent of crit chance.
    pub crit_chance: f64,
    /// Per percent of crit damage.
    pub crit_damage: f64,
    /// Per percent of move speed.
    pub move_speed: f64,
    /// Per dodge charge.
    pub dodge_charge: f64,
    /// Per unit of either on-kill bonus.
    pub on_kill_bonus: f64,
    /// Per percent of lifesteal.
    pub lifesteal: f64,
    /// Per percent of thorns.
    pub thorns: f64,
    /// Per point of regen.
    pub regen: f64,
    /// Per percent of attack or cast haste.
    pub haste: f64,
    /// Per elemental stack.
    pub elemental_stack: f64,
    /// Flat value of auto-targeting.
    pub auto_target: f64,
    /// Per percent of consumable heal or shield.
    pub restore_percent: f64,
}

impl Default for StatWeights {
    fn default() -> Self {
        Self {
            attack: 3.0,
            defense: 3.0,
            health: 0.5,
            ability_power: 3.0,
            crit_chance: 4.0,
            crit_damage: 1.5,
            move_speed: 2.0,
            dodge_charge: 15.0,
            on_kill_bonus: 20.0,
            lifesteal: 4.0,
            thorns: 2.0,
            regen: 3.0,
            haste: 3.0,
            elemental_stack: 10.0,
            auto_target: 5.0,
            restore_percent: 0.5,
        }
    }
}

/// Dust costs of upgrades, which also price dismantling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DustConfig {
    /// Flat part of every upgrade cost.
    pub upgrade_base: u32,
    /// Upgrade cost added per target level.
    pub upgrade_per_level: u32,
    /// Dismantle return per rarity, as a multiple of the next upgrade cost.
    pub dismantle_rarity_multipliers: PerRarity<f64>,
}

impl Default for DustConfig {
    fn default() -> Self {
        Self {
            upgrade_base: 10,
            upgrade_per_level: 15,
            dismantle_rarity_multipliers: PerRarity::new(1.0, 2.0, 4.0, 8.0),
        }
    }
}

/// Cleanse cost and refund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanseConfig {
    /// Flat part of the gold cost.
    pub base_gold: u32,
    /// Gold added per level.
    pub gold_per_level: u32,
    /// Percent of theoretical upgrade spend refunded as dust.
    pub refund_percent: f64,
}

impl Default for CleanseConfig {
    fn default() -> Self {
        Self {
            base_gold: 25,
            gold_per_level: 28,
            refund_percent: 70.0,
        }
    }
}

/// On-kill currency bonus ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnKillConfig {
    /// Base gold range for a normal monster.
    pub gold_range: [f64; 2],
    /// Base dust range for a normal monster.
    pub dust_range: [f64; 2],
    /// Range multiplier per monster tier, relative to normal.
    pub tier_multipliers: PerTier<f64>,
}

impl Default for OnKillConfig {
    fn default() -> Self {
        Self {
            gold_range: [1.0, 3.0],
            dust_range: [0.5, 1.5],
            tier_multipliers: PerTier::new(1.0, 2.0, 4.0, 10.0),
        }
    }
}

impl OnKillConfig {
    /// Inclusive base range for `currency` against `tier`.
    #[must_use]
    pub fn range(&self, currency: CurrencyKind, tier: MonsterTier) -> (f64, f64) {
        let [low, high] = match currency {
            CurrencyKind::Gold => self.gold_range,
            CurrencyKind::Dust => self.dust_range,
        };
        let multiplier = self.tier_multipliers.get(tier).max(0.0);
        let low = low.max(0.0) * multiplier;
        (low, (high * multiplier).max(low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Rarity;

    #[test]
    fn test_empty_document_is_default() {
        let config = EconomyConfig::from_toml_str("").unwrap();
        assert_eq!(config, EconomyConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = EconomyConfig::from_toml_str(
            r"
            [drops]
            equipment_drop_percent = 10.0

            [rarity_weights]
            common = 1
            rare = 1
            epic = 1
            legendary = 1

            [cleanse]
            refund_percent = 50.0
            ",
        )
        .unwrap();

        assert!((config.drops.equipment_drop_percent - 10.0).abs() < f64::EPSILON);
        assert!(config.drops.restrict_to_usable_items);
        assert_eq!(*config.rarity_weights.get(Rarity::Legendary), 1);
        assert_eq!(config.cleanse.base_gold, 25);
        assert!((config.upgrades.scaling_per_level - 0.08).abs() < f64::EPSILON);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = EconomyConfig::from_toml_str("[drops]\nequipment_drop_percent = \"lots\"");
        assert!(matches!(result, Err(EconomyError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = EconomyConfig::load_or_default("/definitely/not/here/economy.toml");
        assert_eq!(config, EconomyConfig::default());
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut config = EconomyConfig::default();
        config.rarity_weights = PerRarity::new(0, 0, 0, 0);
        config.pricing.sell_percent = 140.0;
        config.drops.potion_stacks.boss = [5, 3];

        let problems = config.validate();
        assert_eq!(problems.len(), 3, "{problems:?}");
    }

    #[test]
    fn test_chances_clamp() {
        let config = DropConfig::default();
        assert!((config.equipment_chance_percent(MonsterTier::Normal) - 4.0).abs() < 1e-9);
        assert!((config.equipment_chance_percent(MonsterTier::Boss) - 100.0).abs() < 1e-9);
        assert!(config.potion_chance_percent(MonsterTier::Elite) > config.potion_chance_percent(MonsterTier::Normal));
    }

    #[test]
    fn test_potion_stacks_scale_with_tier() {
        let config = DropConfig::default();
        assert_eq!(config.potion_stack_range(MonsterTier::Normal), (1, 1));
        assert_eq!(config.potion_stack_range(MonsterTier::Boss), (3, 5));

        let broken = DropConfig {
            potion_stacks: PerTier::new([0, 0], [4, 2], [2, 3], [3, 5]),
            ..DropConfig::default()
        };
        assert_eq!(broken.potion_stack_range(MonsterTier::Normal), (1, 1));
        assert_eq!(broken.potion_stack_range(MonsterTier::Elite), (4, 4));
    }

    #[test]
    fn test_bonus_ranges_are_multiples_of_normal() {
        let config = OnKillConfig::default();
        let (low, high) = config.range(CurrencyKind::Gold, MonsterTier::Normal);
        let (boss_low, boss_high) = config.range(CurrencyKind::Gold, MonsterTier::Boss);
        assert!((boss_low - low * 10.0).abs() < 1e-9);
        assert!((boss_high - high * 10.0).abs() < 1e-9);
    }
}
