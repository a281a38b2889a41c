//! # Drop-Time Upgrade Ladder
//!
//! Dropped equipment may arrive pre-upgraded. Each monster tier has a ladder
//! of step chances; a step is only attempted if the one before it passed.
//!
//! ```text
//! Boss ladder [50%, 25%, 10%, 3%]
//!
//!   roll +1 ── pass ──> roll +2 ── pass ──> roll +3 ── pass ──> roll +4
//!      │                  │                   │
//!     fail               fail                fail
//!      ▼                  ▼                   ▼
//!   level 0            level 1             level 2
//! ```
//!
//! Every step's chance is scaled by a [`ProgressionScalar`] supplied by the
//! integration layer, so zone depth or wave number can shift the odds
//! without this module knowing where the number comes from.

use rand::Rng;

use crate::config::UpgradeConfig;
use crate::curve::StatUpgrader;
use crate::item::ItemInstance;
use crate::tier::{MonsterTier, PerTier};

/// Source of a progression-based multiplier on upgrade step chances.
pub trait ProgressionScalar: Send + Sync {
    /// Multiplier on the chance of reaching `level` from a `tier` kill.
    ///
    /// Queried once per ladder step. The scaled chance is clamped to [0, 1].
    fn upgrade_chance_scalar(&self, tier: MonsterTier, level: u32) -> f64;
}

/// Progression that never changes the configured odds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoProgression;

impl ProgressionScalar for NoProgression {
    #[inline]
    fn upgrade_chance_scalar(&self, _tier: MonsterTier, _level: u32) -> f64 {
        1.0
    }
}

/// Rolls and applies pre-upgrade levels for drops.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeRollEngine {
    ladders: PerTier<Vec<f64>>,
    upgrader: StatUpgrader,
}

impl UpgradeRollEngine {
    /// Builds the engine from configuration.
    #[must_use]
    pub fn from_config(config: &UpgradeConfig) -> Self {
        Self {
            ladders: config.drop_ladders.clone(),
            upgrader: StatUpgrader::from_config(config),
        }
    }

    /// Step chances in percent for `tier`. Its length bounds the level a
    /// drop can reach.
    #[must_use]
    pub fn ladder(&self, tier: MonsterTier) -> &[f64] {
        self.ladders.get(tier)
    }

    /// The upgrader used to apply rolled levels.
    #[must_use]
    pub const fn upgrader(&self) -> &StatUpgrader {
        &self.upgrader
    }

    /// Climbs `tier`'s ladder until the first failed step.
    pub fn roll_level<R: Rng + ?Sized>(
        &self,
        tier: MonsterTier,
        progression: &dyn ProgressionScalar,
        rng: &mut R,
    ) -> u32 {
        let mut level = 0u32;
        for &percent in self.ladder(tier) {
            let scalar = progression.upgrade_chance_scalar(tier, level + 1);
            let chance = percent / 100.0 * scalar;
            let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };

            if rng.gen::<f64>() < chance {
                level += 1;
            } else {
                break;
            }
        }
        level
    }

    /// Rolls a level for `item` and applies it. Returns the levels gained.
    ///
    /// Consumables are never rolled.
    pub fn roll_and_apply<R: Rng + ?Sized>(
        &self,
        item: &mut ItemInstance,
        tier: MonsterTier,
        progression: &dyn ProgressionScalar,
        rng: &mut R,
    ) -> u32 {
        if item.is_consumable() {
            return 0;
        }
        let levels = self.roll_level(tier, progression, rng);
        self.upgrader.apply_levels(item, levels);
        levels
    }
}

impl Default for UpgradeRollEngine {
    fn default() -> Self {
        Self::from_config(&UpgradeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemStats, ItemTemplate, ItemType};
    use crate::tier::Rarity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixed(f64);

    impl ProgressionScalar for Fixed {
        fn upgrade_chance_scalar(&self, _tier: MonsterTier, _level: u32) -> f64 {
            self.0
        }
    }

    fn helmet() -> ItemInstance {
        ItemInstance::from_template(&ItemTemplate {
            id: 4,
            name: "Iron Helm".to_string(),
            item_type: ItemType::Helmet,
            rarity: Rarity::Rare,
            stats: ItemStats {
                defense: 10,
                health: 50,
                ..ItemStats::default()
            },
            hero_restriction: None,
            max_stack: 1,
        })
    }

    #[test]
    fn test_level_bounded_by_ladder_length() {
        let engine = UpgradeRollEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        for tier in MonsterTier::ALL {
            let max = engine.ladder(tier).len() as u32;
            for _ in 0..5_000 {
                assert!(engine.roll_level(tier, &NoProgression, &mut rng) <= max);
            }
        }
    }

    #[test]
    fn test_normal_tier_rate_matches_ladder() {
        let engine = UpgradeRollEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let iterations = 100_000u32;

        let upgraded = (0..iterations)
            .filter(|_| engine.roll_level(MonsterTier::Normal, &NoProgression, &mut rng) == 1)
            .count();
        let rate = upgraded as f64 / f64::from(iterations);
        assert!((rate - 0.08).abs() < 0.005, "upgrade rate {rate}");
    }

    #[test]
    fn test_steps_are_must_pass() {
        let mut config = UpgradeConfig::default();
        config.drop_ladders.boss = vec![100.0, 0.0, 100.0];
        let engine = UpgradeRollEngine::from_config(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..1_000 {
            assert_eq!(engine.roll_level(MonsterTier::Boss, &NoProgression, &mut rng), 1);
        }
    }

    #[test]
    fn test_progression_scalar_clamps_chance() {
        let engine = UpgradeRollEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        for _ in 0..1_000 {
            assert_eq!(engine.roll_level(MonsterTier::Boss, &Fixed(0.0), &mut rng), 0);
            assert_eq!(engine.roll_level(MonsterTier::Boss, &Fixed(f64::NAN), &mut rng), 0);
            assert_eq!(engine.roll_level(MonsterTier::Boss, &Fixed(1_000.0), &mut rng), 4);
        }
    }

    #[test]
    fn test_roll_and_apply_uses_shared_curve() {
        let engine = UpgradeRollEngine::from_config(&UpgradeConfig {
            drop_ladders: PerTier::new(vec![100.0, 100.0], vec![], vec![], vec![]),
            ..UpgradeConfig::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut dropped = helmet();
        let levels = engine.roll_and_apply(&mut dropped, MonsterTier::Normal, &NoProgression, &mut rng);

        let mut manual = helmet();
        engine.upgrader().apply_levels(&mut manual, 2);

        assert_eq!(levels, 2);
        assert_eq!(dropped, manual);
        assert_eq!(dropped.dust_spent_upgrading, 0);
    }

    #[test]
    fn test_consumables_never_roll() {
        let engine = UpgradeRollEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut potion = ItemInstance::from_template(&ItemTemplate {
            id: 7,
            name: "Potion".to_string(),
            item_type: ItemType::Consumable,
            rarity: Rarity::Common,
            stats: ItemStats::default(),
            hero_restriction: None,
            max_stack: 10,
        });

        assert_eq!(engine.roll_and_apply(&mut potion, MonsterTier::Boss, &Fixed(1_000.0), &mut rng), 0);
        assert_eq!(potion.upgrade_level, 0);
    }
}
