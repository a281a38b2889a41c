//! # Item Transactions
//!
//! Buying, selling, upgrading, cleansing and dismantling against a wallet.
//!
//! Every operation is all-or-nothing: all checks run before anything is
//! charged or mutated, so a rejected transaction leaves both the item and
//! the wallet exactly as they were.
//!
//! ```text
//! upgrade   : dust  -> +1 level, stats grow along the curve
//! cleanse   : gold  -> level 0, stats divided back down, dust refunded
//! dismantle : item  -> dust (item consumed)
//! buy       : gold  -> fresh instance, optionally pre-upgraded
//! sell      : item  -> gold (item consumed)
//! ```

use thiserror::Error;

use crate::config::EconomyConfig;
use crate::curve::StatUpgrader;
use crate::error::{EconomyError, EconomyResult};
use crate::item::{CurrencyKind, ItemInstance, ItemTemplate};
use crate::pricing::EconomyCalculator;

/// A participant's spendable currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Wallet {
    /// Primary currency.
    pub gold: u64,
    /// Secondary currency.
    pub dust: u64,
}

impl Wallet {
    /// Creates a wallet.
    #[must_use]
    pub const fn new(gold: u64, dust: u64) -> Self {
        Self { gold, dust }
    }

    /// Balance of `currency`.
    #[inline]
    #[must_use]
    pub const fn balance(&self, currency: CurrencyKind) -> u64 {
        match currency {
            CurrencyKind::Gold => self.gold,
            CurrencyKind::Dust => self.dust,
        }
    }

    /// Fails with [`EconomyError::InsufficientFunds`] unless `amount` is
    /// covered.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance is below `amount`.
    pub fn ensure_covers(&self, currency: CurrencyKind, amount: u64) -> EconomyResult<()> {
        let available = self.balance(currency);
        if available < amount {
            return Err(EconomyError::InsufficientFunds {
                currency,
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Adds `amount` of `currency`.
    pub fn credit(&mut self, currency: CurrencyKind, amount: u64) {
        let slot = self.slot(currency);
        *slot = slot.saturating_add(amount);
    }

    fn debit(&mut self, currency: CurrencyKind, amount: u64) {
        let slot = self.slot(currency);
        *slot = slot.saturating_sub(amount);
    }

    fn slot(&mut self, currency: CurrencyKind) -> &mut u64 {
        match currency {
            CurrencyKind::Gold => &mut self.gold,
            CurrencyKind::Dust => &mut self.dust,
        }
    }
}

/// Outcome of a successful upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeReceipt {
    /// Dust charged.
    pub dust_spent: u64,
    /// Upgrade level after the upgrade.
    pub new_level: u32,
}

/// Outcome of a successful cleanse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanseReceipt {
    /// Gold charged.
    pub gold_spent: u64,
    /// Dust refunded.
    pub dust_refunded: u64,
    /// Levels removed.
    pub levels_removed: u32,
}

/// A dismantle that was refused. The item is handed back untouched.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct DismantleRejected {
    /// The item the caller tried to dismantle.
    pub item: ItemInstance,
    /// Why it was refused.
    pub error: EconomyError,
}

/// Transactional operations over one configuration.
#[derive(Clone, Debug)]
pub struct ItemTransactions<'a> {
    calculator: EconomyCalculator<'a>,
    upgrader: StatUpgrader,
}

impl<'a> ItemTransactions<'a> {
    /// Creates the operations for `config`.
    #[must_use]
    pub fn new(config: &'a EconomyConfig) -> Self {
        Self {
            calculator: EconomyCalculator::new(config),
            upgrader: StatUpgrader::from_config(&config.upgrades),
        }
    }

    /// The pricing formulas in use.
    #[must_use]
    pub const fn calculator(&self) -> &EconomyCalculator<'a> {
        &self.calculator
    }

    /// Raises `item` by one level, paid in dust.
    ///
    /// # Errors
    ///
    /// - `NotUpgradeable` for consumables
    /// - `InsufficientFunds` if the wallet cannot cover the cost
    pub fn upgrade_item(&self, item: &mut ItemInstance, wallet: &mut Wallet) -> EconomyResult<UpgradeReceipt> {
        item.ensure_upgradeable()?;
        let cost = self.calculator.upgrade_cost_at_level(item.upgrade_level);
        wallet.ensure_covers(CurrencyKind::Dust, cost)?;

        wallet.debit(CurrencyKind::Dust, cost);
        self.upgrader.apply_step(item);
        item.dust_spent_upgrading = item.dust_spent_upgrading.saturating_add(cost);

        tracing::debug!(template_id = item.template_id, level = item.upgrade_level, cost, "item upgraded");
        Ok(UpgradeReceipt {
            dust_spent: cost,
            new_level: item.upgrade_level,
        })
    }

    /// Resets `item` to level 0, paid in gold, refunding dust.
    ///
    /// # Errors
    ///
    /// - `NotUpgradeable` for consumables
    /// - `NotUpgraded` if the item is already at level 0
    /// - `InsufficientFunds` if the wallet cannot cover the cost
    pub fn cleanse_item(&self, item: &mut ItemInstance, wallet: &mut Wallet) -> EconomyResult<CleanseReceipt> {
        item.ensure_upgradeable()?;
        if item.upgrade_level == 0 {
            return Err(EconomyError::NotUpgraded {
                template_id: item.template_id,
            });
        }
        let levels = item.upgrade_level;
        let cost = self.calculator.cleanse_cost_at_level(levels);
        let refund = self.calculator.cleanse_refund_at_level(levels);
        wallet.ensure_covers(CurrencyKind::Gold, cost)?;

        wallet.debit(CurrencyKind::Gold, cost);
        wallet.credit(CurrencyKind::Dust, refund);
        self.upgrader.strip(item);
        item.dust_spent_upgrading = 0;

        tracing::debug!(template_id = item.template_id, levels, cost, refund, "item cleansed");
        Ok(CleanseReceipt {
            gold_spent: cost,
            dust_refunded: refund,
            levels_removed: levels,
        })
    }

    /// Destroys `item` for dust.
    ///
    /// # Errors
    ///
    /// Consumables are refused and handed back in [`DismantleRejected`].
    pub fn dismantle_item(&self, item: ItemInstance, wallet: &mut Wallet) -> Result<u64, DismantleRejected> {
        let Some(dust) = self.calculator.dismantle_value(&item) else {
            let error = EconomyError::NotUpgradeable {
                template_id: item.template_id,
            };
            return Err(DismantleRejected { item, error });
        };
        wallet.credit(CurrencyKind::Dust, dust);
        tracing::debug!(template_id = item.template_id, dust, "item dismantled");
        Ok(dust)
    }

    /// Gold price of a fresh instance of `template`.
    #[must_use]
    pub fn buy_quote(&self, template: &ItemTemplate) -> u64 {
        self.calculator.buy_price(&ItemInstance::from_template(template))
    }

    /// Gold a vendor pays for `item`.
    #[must_use]
    pub fn sell_quote(&self, item: &ItemInstance) -> u64 {
        self.calculator.sell_price(item)
    }

    /// Buys a fresh level-0 instance of `template`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if the wallet cannot cover the price.
    pub fn purchase(&self, template: &ItemTemplate, wallet: &mut Wallet) -> EconomyResult<ItemInstance> {
        self.purchase_upgraded(template, 0, wallet)
    }

    /// Buys an instance of `template` already raised to `level`, priced at
    /// that level. No dust is charged or recorded as spent.
    ///
    /// # Errors
    ///
    /// - `NotUpgradeable` for a consumable with `level > 0`
    /// - `InsufficientFunds` if the wallet cannot cover the price
    pub fn purchase_upgraded(
        &self,
        template: &ItemTemplate,
        level: u32,
        wallet: &mut Wallet,
    ) -> EconomyResult<ItemInstance> {
        let mut item = ItemInstance::from_template(template);
        if level > 0 {
            item.ensure_upgradeable()?;
            self.upgrader.apply_levels(&mut item, level);
        }
        let price = self.calculator.buy_price(&item);
        wallet.ensure_covers(CurrencyKind::Gold, price)?;
        wallet.debit(CurrencyKind::Gold, price);
        Ok(item)
    }

    /// Sells `item` to a vendor. Returns the gold received.
    pub fn sell(&self, item: ItemInstance, wallet: &mut Wallet) -> u64 {
        let gold = self.calculator.sell_price(&item);
        wallet.credit(CurrencyKind::Gold, gold);
        gold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemStats, ItemType};
    use crate::tier::Rarity;

    fn blade() -> ItemTemplate {
        ItemTemplate {
            id: 11,
            name: "Ember Blade".to_string(),
            item_type: ItemType::MeleeWeapon,
            rarity: Rarity::Rare,
            stats: ItemStats {
                attack: 10,
                crit_chance: 5.0,
                ..ItemStats::default()
            },
            hero_restriction: None,
            max_stack: 1,
        }
    }

    fn potion() -> ItemTemplate {
        ItemTemplate {
            id: 12,
            name: "Healing Draught".to_string(),
            item_type: ItemType::Consumable,
            rarity: Rarity::Common,
            stats: ItemStats {
                heal_percent: 25.0,
                ..ItemStats::default()
            },
            hero_restriction: None,
            max_stack: 10,
        }
    }

    #[test]
    fn test_upgrade_charges_dust_and_tracks_spend() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let mut item = ItemInstance::from_template(&blade());
        let mut wallet = Wallet::new(0, 100);

        let receipt = desk.upgrade_item(&mut item, &mut wallet).unwrap();
        assert_eq!(receipt, UpgradeReceipt { dust_spent: 25, new_level: 1 });
        assert_eq!(item.stats.attack, 12);
        assert_eq!(wallet.dust, 75);

        desk.upgrade_item(&mut item, &mut wallet).unwrap();
        assert_eq!(item.dust_spent_upgrading, 25 + 40);
        assert_eq!(wallet.dust, 35);
    }

    #[test]
    fn test_rejected_upgrade_changes_nothing() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let mut item = ItemInstance::from_template(&blade());
        let mut wallet = Wallet::new(500, 24);

        let err = desk.upgrade_item(&mut item, &mut wallet).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientFunds {
                currency: CurrencyKind::Dust,
                required: 25,
                available: 24,
            }
        );
        assert_eq!(item, ItemInstance::from_template(&blade()));
        assert_eq!(wallet, Wallet::new(500, 24));
    }

    #[test]
    fn test_consumables_rejected_everywhere() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let mut wallet = Wallet::new(10_000, 10_000);
        let mut draught = ItemInstance::from_template(&potion());

        assert!(matches!(
            desk.upgrade_item(&mut draught, &mut wallet),
            Err(EconomyError::NotUpgradeable { template_id: 12 })
        ));
        assert!(matches!(
            desk.cleanse_item(&mut draught, &mut wallet),
            Err(EconomyError::NotUpgradeable { template_id: 12 })
        ));

        let rejected = desk.dismantle_item(draught, &mut wallet).unwrap_err();
        assert_eq!(rejected.item.template_id, 12);
        assert_eq!(rejected.to_string(), "item 12 cannot be upgraded, cleansed or dismantled");
        assert_eq!(wallet, Wallet::new(10_000, 10_000));
    }

    #[test]
    fn test_cleanse_resets_and_refunds_theoretical_cost() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let mut item = ItemInstance::from_template(&blade());
        let mut wallet = Wallet::new(1_000, 1_000);

        for _ in 0..3 {
            desk.upgrade_item(&mut item, &mut wallet).unwrap();
        }
        assert_eq!(wallet.dust, 1_000 - 120);

        let receipt = desk.cleanse_item(&mut item, &mut wallet).unwrap();
        assert_eq!(
            receipt,
            CleanseReceipt {
                gold_spent: 25 + 28 * 4,
                dust_refunded: 84,
                levels_removed: 3,
            }
        );
        assert_eq!(item.upgrade_level, 0);
        assert_eq!(item.dust_spent_upgrading, 0);
        assert!((item.stats.crit_chance - 5.0).abs() < 1e-4);
        assert_eq!(wallet, Wallet::new(1_000 - 137, 1_000 - 120 + 84));

        assert_eq!(
            desk.cleanse_item(&mut item, &mut wallet),
            Err(EconomyError::NotUpgraded { template_id: 11 })
        );
    }

    #[test]
    fn test_cleanse_without_gold_is_rejected() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let mut item = ItemInstance::from_template(&blade());
        let mut wallet = Wallet::new(0, 100);
        desk.upgrade_item(&mut item, &mut wallet).unwrap();

        let before_stats = item.stats.clone();
        let err = desk.cleanse_item(&mut item, &mut wallet).unwrap_err();
        assert!(matches!(err, EconomyError::InsufficientFunds { currency: CurrencyKind::Gold, .. }));
        assert_eq!(item.upgrade_level, 1);
        assert_eq!(item.stats, before_stats);
        assert_eq!(wallet, Wallet::new(0, 75));
    }

    #[test]
    fn test_dismantle_consumes_item_for_dust() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let mut wallet = Wallet::default();

        let dust = desk.dismantle_item(ItemInstance::from_template(&blade()), &mut wallet).unwrap();
        // (10 + 15) * 2 for rare
        assert_eq!(dust, 50);
        assert_eq!(wallet.dust, 50);
    }

    #[test]
    fn test_buy_and_sell() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let price = desk.buy_quote(&blade());
        let mut wallet = Wallet::new(price, 0);

        let item = desk.purchase(&blade(), &mut wallet).unwrap();
        assert_eq!(wallet.gold, 0);
        assert_eq!(item.upgrade_level, 0);

        let quote = desk.sell_quote(&item);
        assert_eq!(desk.sell(item, &mut wallet), quote);
        assert_eq!(wallet.gold, quote);
        assert!(quote < price);

        assert!(matches!(
            desk.purchase(&blade(), &mut Wallet::new(price - 1, 0)),
            Err(EconomyError::InsufficientFunds { currency: CurrencyKind::Gold, .. })
        ));
    }

    #[test]
    fn test_pre_upgraded_purchase_is_priced_at_level() {
        let config = EconomyConfig::default();
        let desk = ItemTransactions::new(&config);
        let fresh_price = desk.buy_quote(&blade());
        let mut wallet = Wallet::new(10_000, 0);

        let item = desk.purchase_upgraded(&blade(), 3, &mut wallet).unwrap();
        assert_eq!(item.upgrade_level, 3);
        assert_eq!(item.dust_spent_upgrading, 0);
        assert!(item.stats.attack >= 10 + 3 * 2);

        let paid = 10_000 - wallet.gold;
        assert_eq!(paid, desk.calculator().buy_price(&item));
        assert!(paid > fresh_price);
        // Refund still follows the theoretical cost of three upgrades
        assert_eq!(desk.calculator().cleanse_refund(&item), Some(84));
        assert_eq!(wallet.dust, 0);

        let err = desk.purchase_upgraded(&potion(), 1, &mut wallet).unwrap_err();
        assert_eq!(err, EconomyError::NotUpgradeable { template_id: 12 });
        assert_eq!(wallet.gold, 10_000 - paid);
    }
}
