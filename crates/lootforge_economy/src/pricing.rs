//! # Economy Calculator
//!
//! Pure pricing formulas. Nothing here mutates an item or touches a wallet;
//! the `transactions` module charges and applies.
//!
//! ```text
//! gold_value     = base[rarity] * global * (1 + (per_level - 1) * level) + 0.5 * stats_value
//! buy            = gold_value
//! sell           = gold_value * sell%            (* stack for consumables)
//! upgrade_cost   = upgrade_base + upgrade_per_level * (level + 1)
//! dismantle      = upgrade_cost * rarity_mult
//! cleanse_cost   = base_gold + gold_per_level * (level + 1), 0 at level 0
//! cleanse_refund = refund% * sum(upgrade_cost at k for k in 0..level)
//! ```

use crate::config::{EconomyConfig, StatWeights};
use crate::item::{ItemInstance, ItemStats};
use crate::tier::Rarity;

/// `floor` that ignores representation noise just below an integer.
#[inline]
fn floor_stable(value: f64) -> u64 {
    (value + 1e-9).floor().max(0.0) as u64
}

/// Pricing formulas over one configuration.
#[derive(Clone, Copy, Debug)]
pub struct EconomyCalculator<'a> {
    config: &'a EconomyConfig,
}

impl<'a> EconomyCalculator<'a> {
    /// Creates a calculator over `config`.
    #[must_use]
    pub const fn new(config: &'a EconomyConfig) -> Self {
        Self { config }
    }

    /// Weighted linear value of every stat field.
    #[must_use]
    pub fn stats_value(&self, stats: &ItemStats) -> f64 {
        let w: &StatWeights = &self.config.pricing.stat_weights;
        let elemental_stacks = stats.elemental.map_or(0, |e| e.stacks);

        w.attack * f64::from(stats.attack)
            + w.defense * f64::from(stats.defense)
            + w.health * f64::from(stats.health)
            + w.ability_power * f64::from(stats.ability_power)
            + w.crit_chance * f64::from(stats.crit_chance)
            + w.crit_damage * f64::from(stats.crit_damage)
            + w.move_speed * f64::from(stats.move_speed)
            + w.dodge_charge * f64::from(stats.dodge_charges)
            + w.on_kill_bonus * f64::from(stats.gold_on_kill + stats.dust_on_kill)
            + w.lifesteal * f64::from(stats.lifesteal)
            + w.thorns * f64::from(stats.thorns)
            + w.regen * f64::from(stats.regen)
            + w.haste * f64::from(stats.attack_haste + stats.cast_haste)
            + w.elemental_stack * f64::from(elemental_stacks)
            + if stats.auto_target { w.auto_target } else { 0.0 }
            + w.restore_percent * f64::from(stats.heal_percent + stats.shield_percent)
    }

    /// Gold value of one unit of `item`. Never below 1.
    #[must_use]
    pub fn gold_value(&self, item: &ItemInstance) -> u64 {
        let pricing = &self.config.pricing;
        let level_factor = 1.0 + (pricing.per_level_multiplier - 1.0) * f64::from(item.upgrade_level);
        let value = pricing.base_value.get(item.rarity) * pricing.global_multiplier * level_factor
            + 0.5 * self.stats_value(&item.stats);

        if value.is_finite() {
            floor_stable(value).max(1)
        } else {
            1
        }
    }

    /// Price to buy `item`.
    #[must_use]
    pub fn buy_price(&self, item: &ItemInstance) -> u64 {
        self.gold_value(item)
    }

    /// Price a vendor pays for `item`. Consumables sell per unit of stack.
    #[must_use]
    pub fn sell_price(&self, item: &ItemInstance) -> u64 {
        let fraction = (self.config.pricing.sell_percent / 100.0).max(0.0);
        let unit = floor_stable(self.gold_value(item) as f64 * fraction);
        if item.is_consumable() {
            unit.saturating_mul(u64::from(item.current_stack))
        } else {
            unit
        }
    }

    /// Dust cost of upgrading from `level` to `level + 1`. Independent of rarity.
    #[must_use]
    pub fn upgrade_cost_at_level(&self, level: u32) -> u64 {
        let dust = &self.config.dust;
        u64::from(dust.upgrade_base).saturating_add(u64::from(dust.upgrade_per_level) * (u64::from(level) + 1))
    }

    /// Dust cost of the next upgrade of `item`; `None` for consumables.
    #[must_use]
    pub fn upgrade_cost(&self, item: &ItemInstance) -> Option<u64> {
        if item.is_consumable() {
            return None;
        }
        Some(self.upgrade_cost_at_level(item.upgrade_level))
    }

    /// Dust returned for dismantling an item of `rarity` at `level`: the
    /// next upgrade's cost scaled by rarity.
    #[must_use]
    pub fn dismantle_value_at(&self, rarity: Rarity, level: u32) -> u64 {
        let multiplier = self.config.dust.dismantle_rarity_multipliers.get(rarity).max(0.0);
        floor_stable(self.upgrade_cost_at_level(level) as f64 * multiplier)
    }

    /// Dust returned for dismantling `item`; `None` for consumables.
    #[must_use]
    pub fn dismantle_value(&self, item: &ItemInstance) -> Option<u64> {
        if item.is_consumable() {
            return None;
        }
        Some(self.dismantle_value_at(item.rarity, item.upgrade_level))
    }

    /// Gold cost of cleansing an item at `level`; 0 at level 0.
    #[must_use]
    pub fn cleanse_cost_at_level(&self, level: u32) -> u64 {
        if level == 0 {
            return 0;
        }
        let cleanse = &self.config.cleanse;
        u64::from(cleanse.base_gold) + u64::from(cleanse.gold_per_level) * (u64::from(level) + 1)
    }

    /// Gold cost of cleansing `item`; `None` for consumables.
    #[must_use]
    pub fn cleanse_cost(&self, item: &ItemInstance) -> Option<u64> {
        if item.is_consumable() {
            return None;
        }
        Some(self.cleanse_cost_at_level(item.upgrade_level))
    }

    /// Dust refunded for cleansing an item at `level`.
    ///
    /// Based on what reaching `level` from scratch would cost, not on what
    /// was actually spent, so pre-upgraded drops refund too.
    #[must_use]
    pub fn cleanse_refund_at_level(&self, level: u32) -> u64 {
        // sum of base + per_level * (k + 1) for k in 0..level
        let dust = &self.config.dust;
        let level = u64::from(level);
        let theoretical = (level * u64::from(dust.upgrade_base))
            .saturating_add(u64::from(dust.upgrade_per_level).saturating_mul(level * (level + 1) / 2));
        let fraction = (self.config.cleanse.refund_percent / 100.0).max(0.0);
        floor_stable(theoretical as f64 * fraction)
    }

    /// Dust refunded for cleansing `item`; `None` for consumables.
    #[must_use]
    pub fn cleanse_refund(&self, item: &ItemInstance) -> Option<u64> {
        if item.is_consumable() {
            return None;
        }
        Some(self.cleanse_refund_at_level(item.upgrade_level))
    }
}
