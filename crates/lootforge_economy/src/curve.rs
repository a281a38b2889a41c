//! # Stat Scaling Curve
//!
//! `multiplier(level) = 1 + scaling_per_level * level`, always evaluated from
//! the absolute level, never compounded step by step.
//!
//! The same curve drives manual upgrades, drop-time pre-upgrades, pricing and
//! on-kill bonus amounts. [`StatUpgrader`] applies it to an item one level at
//! a time and strips it again on cleanse.

use crate::config::UpgradeConfig;
use crate::item::ItemInstance;

/// Upgrade level to stat multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatScalingCurve {
    scaling_per_level: f64,
}

impl StatScalingCurve {
    /// Default fraction added per level.
    pub const DEFAULT_SCALING_PER_LEVEL: f64 = 0.08;

    /// Creates a curve. Negative scaling is clamped to zero so the curve
    /// never decreases.
    #[must_use]
    pub fn new(scaling_per_level: f64) -> Self {
        Self {
            scaling_per_level: scaling_per_level.max(0.0),
        }
    }

    /// Fraction added per level.
    #[inline]
    #[must_use]
    pub const fn scaling_per_level(self) -> f64 {
        self.scaling_per_level
    }

    /// Stat multiplier at `level`. Exactly 1.0 at level 0.
    #[inline]
    #[must_use]
    pub fn multiplier(self, level: u32) -> f64 {
        1.0 + self.scaling_per_level * f64::from(level)
    }
}

impl Default for StatScalingCurve {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALING_PER_LEVEL)
    }
}

/// `ceil` that ignores representation noise just above an integer.
#[inline]
fn ceil_stable(value: f64) -> f64 {
    (value - 1e-9).ceil()
}

/// Rounds to one decimal place.
#[inline]
fn round_tenths(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Applies and strips upgrade levels on item stats.
///
/// Scalable fields (attack, defense, health, ability power) grow along the
/// curve with a per-field minimum increment. Crit chance and crit damage gain
/// flat amounts. Gear effects are never touched.
#[derive(Clone, Debug, PartialEq)]
pub struct StatUpgrader {
    curve: StatScalingCurve,
    min_attack: u32,
    min_defense: u32,
    min_ability_power: u32,
    min_health: u32,
    crit_chance_step: f32,
    crit_damage_step: f32,
}

impl StatUpgrader {
    /// Builds an upgrader from configuration.
    #[must_use]
    pub fn from_config(config: &UpgradeConfig) -> Self {
        Self {
            curve: StatScalingCurve::new(config.scaling_per_level),
            min_attack: config.min_attack_increment,
            min_defense: config.min_defense_increment,
            min_ability_power: config.min_ability_power_increment,
            min_health: config.min_health_increment,
            crit_chance_step: config.crit_chance_per_upgrade.max(0.0),
            crit_damage_step: config.crit_damage_per_upgrade.max(0.0),
        }
    }

    /// The curve this upgrader applies.
    #[inline]
    #[must_use]
    pub const fn curve(&self) -> StatScalingCurve {
        self.curve
    }

    /// Raises `item` by exactly one upgrade level.
    ///
    /// Only stats that are currently positive change. Callers are
    /// responsible for rejecting consumables and charging for the upgrade.
    pub fn apply_step(&self, item: &mut ItemInstance) {
        let from = item.upgrade_level;
        let to = from.saturating_add(1);
        let stats = &mut item.stats;

        stats.attack = self.grow(stats.attack, from, to, self.min_attack);
        stats.defense = self.grow(stats.defense, from, to, self.min_defense);
        stats.ability_power = self.grow(stats.ability_power, from, to, self.min_ability_power);
        stats.health = self.grow(stats.health, from, to, self.min_health);

        if stats.crit_chance > 0.0 {
            stats.crit_chance = round_tenths(stats.crit_chance + self.crit_chance_step);
        }
        if stats.crit_damage > 0.0 {
            stats.crit_damage = round_tenths(stats.crit_damage + self.crit_damage_step);
        }

        item.upgrade_level = to;
    }

    /// Raises `item` by `levels` upgrade levels, one step at a time.
    pub fn apply_levels(&self, item: &mut ItemInstance, levels: u32) {
        for _ in 0..levels {
            self.apply_step(item);
        }
    }

    /// Resets `item` to level 0, dividing the scalable stats back down.
    ///
    /// The base is recovered from the current values, not from the
    /// template, so repeated upgrade/cleanse cycles can drift by rounding.
    pub fn strip(&self, item: &mut ItemInstance) {
        let from = item.upgrade_level;
        if from == 0 {
            return;
        }
        let multiplier = self.curve.multiplier(from);
        let stats = &mut item.stats;

        stats.attack = shrink(stats.attack, multiplier);
        stats.defense = shrink(stats.defense, multiplier);
        stats.ability_power = shrink(stats.ability_power, multiplier);
        stats.health = shrink(stats.health, multiplier);

        let levels = from as f32;
        if stats.crit_chance > 0.0 {
            stats.crit_chance = round_tenths((stats.crit_chance - self.crit_chance_step * levels).max(0.0));
        }
        if stats.crit_damage > 0.0 {
            stats.crit_damage = round_tenths((stats.crit_damage - self.crit_damage_step * levels).max(0.0));
        }

        item.upgrade_level = 0;
    }

    fn grow(&self, current: u32, from: u32, to: u32, min_increment: u32) -> u32 {
        if current == 0 {
            return 0;
        }
        let current_f = f64::from(current);
        let base = current_f / self.curve.multiplier(from);
        let target = ceil_stable(base * self.curve.multiplier(to));
        let raw_increase = (target - current_f).max(0.0) as u32;
        current.saturating_add(raw_increase.max(min_increment))
    }
}

impl Default for StatUpgrader {
    fn default() -> Self {
        Self::from_config(&UpgradeConfig::default())
    }
}

fn shrink(current: u32, multiplier: f64) -> u32 {
    if current == 0 {
        return 0;
    }
    ((f64::from(current) / multiplier).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemStats, ItemTemplate, ItemType};
    use crate::tier::Rarity;

    fn item(stats: ItemStats) -> ItemInstance {
        ItemInstance::from_template(&ItemTemplate {
            id: 1,
            name: "Test Blade".to_string(),
            item_type: ItemType::MeleeWeapon,
            rarity: Rarity::Rare,
            stats,
            hero_restriction: None,
            max_stack: 1,
        })
    }

    #[test]
    fn test_multiplier_is_one_at_zero_and_non_decreasing() {
        let curve = StatScalingCurve::default();
        assert!((curve.multiplier(0) - 1.0).abs() < f64::EPSILON);
        let mut last = curve.multiplier(0);
        for level in 1..100 {
            let next = curve.multiplier(level);
            assert!(next >= last, "multiplier dropped at level {level}");
            last = next;
        }
        assert!((curve.multiplier(5) - 1.4).abs() < 1e-9, "not compounded");
    }

    #[test]
    fn test_negative_scaling_clamped() {
        let curve = StatScalingCurve::new(-0.5);
        assert!((curve.multiplier(10) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_small_attack_uses_minimum_increment() {
        let upgrader = StatUpgrader::default();
        let mut sword = item(ItemStats {
            attack: 10,
            ..ItemStats::default()
        });

        upgrader.apply_step(&mut sword);

        // ceil(10 * 1.08) = 11 is only +1, below the floor of 2
        assert_eq!(sword.stats.attack, 12);
        assert_eq!(sword.upgrade_level, 1);
    }

    #[test]
    fn test_large_stats_follow_curve() {
        let upgrader = StatUpgrader::default();
        let mut armor = item(ItemStats {
            attack: 50,
            health: 400,
            ..ItemStats::default()
        });

        upgrader.apply_step(&mut armor);
        assert_eq!(armor.stats.attack, 54);
        assert_eq!(armor.stats.health, 432);

        upgrader.apply_step(&mut armor);
        // base 50 recovered from 54 / 1.08, target 50 * 1.16 = 58
        assert_eq!(armor.stats.attack, 58);
        assert_eq!(armor.stats.health, 464);
    }

    #[test]
    fn test_health_minimum_increment() {
        let upgrader = StatUpgrader::default();
        let mut ring = item(ItemStats {
            health: 100,
            ..ItemStats::default()
        });
        upgrader.apply_step(&mut ring);
        assert_eq!(ring.stats.health, 110);
    }

    #[test]
    fn test_zero_stats_and_gear_effects_untouched() {
        let upgrader = StatUpgrader::default();
        let mut boots = item(ItemStats {
            defense: 8,
            move_speed: 6.5,
            dodge_charges: 1,
            lifesteal: 2.0,
            gold_on_kill: 1.5,
            ..ItemStats::default()
        });

        upgrader.apply_levels(&mut boots, 3);

        assert_eq!(boots.stats.attack, 0);
        assert_eq!(boots.stats.health, 0);
        assert!(boots.stats.crit_chance.abs() < f32::EPSILON);
        assert!((boots.stats.move_speed - 6.5).abs() < f32::EPSILON);
        assert_eq!(boots.stats.dodge_charges, 1);
        assert!((boots.stats.lifesteal - 2.0).abs() < f32::EPSILON);
        assert!((boots.stats.gold_on_kill - 1.5).abs() < f32::EPSILON);
        assert_eq!(boots.upgrade_level, 3);
    }

    #[test]
    fn test_crit_gets_flat_increments() {
        let upgrader = StatUpgrader::default();
        let mut dagger = item(ItemStats {
            crit_chance: 5.0,
            crit_damage: 20.0,
            ..ItemStats::default()
        });

        upgrader.apply_levels(&mut dagger, 2);

        assert!((dagger.stats.crit_chance - 7.0).abs() < 1e-4);
        assert!((dagger.stats.crit_damage - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_upgrades_never_decrease_stats() {
        let upgrader = StatUpgrader::default();
        let mut axe = item(ItemStats {
            attack: 3,
            defense: 1,
            health: 7,
            ability_power: 250,
            ..ItemStats::default()
        });

        for _ in 0..30 {
            let before = (axe.stats.attack, axe.stats.defense, axe.stats.health, axe.stats.ability_power);
            upgrader.apply_step(&mut axe);
            assert!(axe.stats.attack >= before.0 + 2);
            assert!(axe.stats.defense >= before.1 + 2);
            assert!(axe.stats.health >= before.2 + 10);
            assert!(axe.stats.ability_power >= before.3 + 2);
        }
    }

    #[test]
    fn test_strip_recovers_approximate_base() {
        let upgrader = StatUpgrader::default();
        let mut staff = item(ItemStats {
            ability_power: 120,
            crit_chance: 4.0,
            ..ItemStats::default()
        });

        upgrader.apply_levels(&mut staff, 5);
        assert!(staff.stats.ability_power > 120);

        upgrader.strip(&mut staff);

        assert_eq!(staff.upgrade_level, 0);
        let drift = i64::from(staff.stats.ability_power) - 120;
        assert!(drift.abs() <= 2, "drifted by {drift}");
        assert!((staff.stats.crit_chance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_strip_keeps_positive_stats_positive() {
        let upgrader = StatUpgrader::default();
        let mut charm = item(ItemStats {
            defense: 1,
            ..ItemStats::default()
        });
        upgrader.apply_step(&mut charm);
        upgrader.strip(&mut charm);
        assert!(charm.stats.defense >= 1);
    }
}
