//! # Tiers and Enum-Indexed Tables
//!
//! Monster tiers and item rarities, plus the `PerTier` / `PerRarity` tables
//! every tier-dependent constant lives in. Drop chances, rarity spaces,
//! potion stack ranges, upgrade ladders and on-kill bonus ranges all index
//! the same tables instead of branching on the tier at each call site.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rarity tier for items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Rarity {
    /// Common items - the bulk of drops.
    Common = 0,
    /// Rare items.
    Rare = 1,
    /// Epic items.
    Epic = 2,
    /// Legendary items.
    Legendary = 3,
}

impl Rarity {
    /// All rarities, commonest first.
    pub const ALL: [Self; 4] = [Self::Common, Self::Rare, Self::Epic, Self::Legendary];

    /// Order in which cumulative weight bounds are walked.
    ///
    /// Rarest first, so a draw sitting exactly on a boundary lands on the
    /// rarer side.
    pub const RESOLUTION_ORDER: [Self; 4] = [Self::Legendary, Self::Epic, Self::Rare, Self::Common];

    /// Rarities to try when the pool for `self` is empty, in order.
    #[must_use]
    pub const fn fallback_order(self) -> [Self; 3] {
        match self {
            Self::Common => [Self::Rare, Self::Epic, Self::Legendary],
            Self::Rare => [Self::Common, Self::Epic, Self::Legendary],
            Self::Epic => [Self::Rare, Self::Legendary, Self::Common],
            Self::Legendary => [Self::Epic, Self::Rare, Self::Common],
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        };
        f.write_str(name)
    }
}

/// Difficulty class of a defeated monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MonsterTier {
    /// Regular enemies.
    Normal = 0,
    /// Tougher regular enemies.
    Elite = 1,
    /// Named mini-bosses.
    Champion = 2,
    /// Bosses.
    Boss = 3,
}

impl MonsterTier {
    /// All tiers, weakest first.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Elite, Self::Champion, Self::Boss];

    /// Whether this tier may produce `rarity` at all.
    ///
    /// The two weakest tiers only ever roll Common or Rare.
    #[inline]
    #[must_use]
    pub const fn allows(self, rarity: Rarity) -> bool {
        match self {
            Self::Normal | Self::Elite => matches!(rarity, Rarity::Common | Rarity::Rare),
            Self::Champion | Self::Boss => true,
        }
    }
}

impl fmt::Display for MonsterTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Elite => "elite",
            Self::Champion => "champion",
            Self::Boss => "boss",
        };
        f.write_str(name)
    }
}

/// One value per monster tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerTier<T> {
    /// Value for [`MonsterTier::Normal`].
    pub normal: T,
    /// Value for [`MonsterTier::Elite`].
    pub elite: T,
    /// Value for [`MonsterTier::Champion`].
    pub champion: T,
    /// Value for [`MonsterTier::Boss`].
    pub boss: T,
}

impl<T> PerTier<T> {
    /// Creates a table from values ordered weakest to strongest.
    #[must_use]
    pub const fn new(normal: T, elite: T, champion: T, boss: T) -> Self {
        Self { normal, elite, champion, boss }
    }

    /// Returns the value for `tier`.
    #[inline]
    #[must_use]
    pub const fn get(&self, tier: MonsterTier) -> &T {
        match tier {
            MonsterTier::Normal => &self.normal,
            MonsterTier::Elite => &self.elite,
            MonsterTier::Champion => &self.champion,
            MonsterTier::Boss => &self.boss,
        }
    }
}

/// One value per rarity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerRarity<T> {
    /// Value for [`Rarity::Common`].
    pub common: T,
    /// Value for [`Rarity::Rare`].
    pub rare: T,
    /// Value for [`Rarity::Epic`].
    pub epic: T,
    /// Value for [`Rarity::Legendary`].
    pub legendary: T,
}

impl<T> PerRarity<T> {
    /// Creates a table from values ordered commonest to rarest.
    #[must_use]
    pub const fn new(common: T, rare: T, epic: T, legendary: T) -> Self {
        Self { common, rare, epic, legendary }
    }

    /// Returns the value for `rarity`.
    #[inline]
    #[must_use]
    pub const fn get(&self, rarity: Rarity) -> &T {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Rare => &self.rare,
            Rarity::Epic => &self.epic,
            Rarity::Legendary => &self.legendary,
        }
    }
}
