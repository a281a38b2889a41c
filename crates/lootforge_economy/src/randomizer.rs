//! # Stat Randomizer
//!
//! Per-drop variance on top of template stats. Every non-zero field gets its
//! own multiplier drawn from the rarity's band:
//!
//! ```text
//! Common     [1.0, 1.1]
//! Rare       [1.0, 1.2]
//! Epic       [1.0, 1.3]
//! Legendary  [1.0, 1.5]
//! ```
//!
//! Variance only ever adds. Zero fields stay zero and no field lands below
//! its template value. Consumable restore amounts and auto-targeting are
//! left alone.

use rand::Rng;

use crate::item::ItemStats;
use crate::tier::{PerRarity, Rarity};

/// Draws per-field stat multipliers from a rarity band.
#[derive(Clone, Debug, PartialEq)]
pub struct StatRandomizer {
    upper_bounds: PerRarity<f64>,
}

impl StatRandomizer {
    /// Creates a randomizer over per-rarity upper bounds. Bounds below 1.0
    /// behave as 1.0.
    #[must_use]
    pub const fn new(upper_bounds: PerRarity<f64>) -> Self {
        Self { upper_bounds }
    }

    /// Upper bound of the multiplier band for `rarity`.
    #[inline]
    #[must_use]
    pub fn upper_bound(&self, rarity: Rarity) -> f64 {
        let upper = *self.upper_bounds.get(rarity);
        if upper.is_finite() {
            upper.max(1.0)
        } else {
            1.0
        }
    }

    /// Returns a randomized copy of `base`.
    pub fn randomize<R: Rng + ?Sized>(&self, base: &ItemStats, rarity: Rarity, rng: &mut R) -> ItemStats {
        let upper = self.upper_bound(rarity);
        let mut stats = base.clone();

        for field in [
            &mut stats.attack,
            &mut stats.defense,
            &mut stats.health,
            &mut stats.ability_power,
            &mut stats.dodge_charges,
        ] {
            if *field > 0 {
                *field = vary_whole(*field, draw(rng, upper));
            }
        }

        for field in [
            &mut stats.crit_chance,
            &mut stats.crit_damage,
            &mut stats.move_speed,
            &mut stats.gold_on_kill,
            &mut stats.dust_on_kill,
            &mut stats.lifesteal,
            &mut stats.thorns,
            &mut stats.regen,
            &mut stats.attack_haste,
            &mut stats.cast_haste,
        ] {
            if *field > 0.0 {
                *field = vary_fraction(*field, draw(rng, upper));
            }
        }

        if let Some(infusion) = stats.elemental.as_mut() {
            if infusion.stacks > 0 {
                infusion.stacks = vary_whole(infusion.stacks, draw(rng, upper));
            }
        }

        stats
    }
}

impl Default for StatRandomizer {
    fn default() -> Self {
        Self::new(PerRarity::new(1.10, 1.20, 1.30, 1.50))
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, upper: f64) -> f64 {
    if upper > 1.0 {
        rng.gen_range(1.0..=upper)
    } else {
        1.0
    }
}

/// Rounds to nearest; never below the base or 1.
fn vary_whole(base: u32, multiplier: f64) -> u32 {
    let varied = (f64::from(base) * multiplier).round();
    let varied = if varied >= f64::from(u32::MAX) { u32::MAX } else { varied as u32 };
    varied.max(base).max(1)
}

/// Rounds to tenths; never below the base or 0.1.
fn vary_fraction(base: f32, multiplier: f64) -> f32 {
    let varied = ((f64::from(base) * multiplier * 10.0).round() / 10.0) as f32;
    varied.max(base).max(0.1)
}
