//! # Rarity Resolution
//!
//! Weighted rarity selection for a monster tier.
//!
//! ## Algorithm
//!
//! ```text
//! allowed = tier's rarity space ({Common, Rare} for the two weakest tiers)
//! total   = sum of weights over allowed        (excluded weights never count)
//! draw    = uniform integer in [0, total)
//! walk cumulative bounds Legendary -> Epic -> Rare -> Common,
//! return the first bound the draw falls under
//! ```
//!
//! A zero total never errors: it resolves to Common.

use rand::Rng;

use crate::tier::{MonsterTier, PerRarity, Rarity};

/// Weighted rarity selection.
#[derive(Clone, Debug, PartialEq)]
pub struct RarityResolver {
    weights: PerRarity<u32>,
}

impl RarityResolver {
    /// Creates a resolver over configured weights.
    #[must_use]
    pub const fn new(weights: PerRarity<u32>) -> Self {
        Self { weights }
    }

    /// Configured weights.
    #[must_use]
    pub const fn weights(&self) -> &PerRarity<u32> {
        &self.weights
    }

    /// Weight of `rarity` inside `tier`'s rarity space.
    #[inline]
    #[must_use]
    pub fn effective_weight(&self, tier: MonsterTier, rarity: Rarity) -> u64 {
        if tier.allows(rarity) {
            u64::from(*self.weights.get(rarity))
        } else {
            0
        }
    }

    /// Sum of weights inside `tier`'s rarity space.
    #[must_use]
    pub fn total_weight(&self, tier: MonsterTier) -> u64 {
        Rarity::ALL.iter().map(|&r| self.effective_weight(tier, r)).sum()
    }

    /// Resolves a rarity for `tier`.
    pub fn resolve<R: Rng + ?Sized>(&self, tier: MonsterTier, rng: &mut R) -> Rarity {
        let total = self.total_weight(tier);
        if total == 0 {
            return Rarity::Common;
        }
        self.resolve_draw(tier, rng.gen_range(0..total))
    }

    /// Maps a draw in `[0, total_weight)` onto a rarity.
    ///
    /// Draws at or beyond the total resolve to Common.
    #[must_use]
    pub fn resolve_draw(&self, tier: MonsterTier, draw: u64) -> Rarity {
        let mut bound = 0u64;
        for rarity in Rarity::RESOLUTION_ORDER {
            bound += self.effective_weight(tier, rarity);
            if draw < bound {
                return rarity;
            }
        }
        Rarity::Common
    }
}
