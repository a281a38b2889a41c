//! # Category Pool Index
//!
//! Partitions the catalog into `(category, rarity)` equipment pools plus one
//! flat consumable pool. Built once per catalog and never mutated; a catalog
//! change builds a fresh index (see `LootSnapshot`).

use crate::item::{ItemCatalog, LootCategory, TemplateId};
use crate::tier::Rarity;

/// Template ids grouped by category and rarity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPoolIndex {
    /// Indexed `[category][rarity]`.
    equipment: [[Vec<TemplateId>; 4]; 3],
    consumables: Vec<TemplateId>,
}

const fn category_slot(category: LootCategory) -> usize {
    match category {
        LootCategory::Weapons => 0,
        LootCategory::Armor => 1,
        LootCategory::Accessories => 2,
    }
}

impl CategoryPoolIndex {
    /// Assigns every template in `catalog` to its pool.
    #[must_use]
    pub fn build(catalog: &ItemCatalog) -> Self {
        let mut index = Self::default();
        for template in catalog.iter() {
            match template.category() {
                Some(category) => index.equipment[category_slot(category)][template.rarity as usize].push(template.id),
                None => index.consumables.push(template.id),
            }
        }
        index
    }

    /// The exact pool for `(category, rarity)`, possibly empty.
    #[must_use]
    pub fn pool(&self, category: LootCategory, rarity: Rarity) -> &[TemplateId] {
        &self.equipment[category_slot(category)][rarity as usize]
    }

    /// All consumable templates.
    #[must_use]
    pub fn consumables(&self) -> &[TemplateId] {
        &self.consumables
    }

    /// Number of equipment templates across all pools.
    #[must_use]
    pub fn equipment_count(&self) -> usize {
        self.equipment.iter().flatten().map(Vec::len).sum()
    }

    /// Finds a non-empty pool for a request, with fallback.
    ///
    /// Order: the exact pool, then the category's other rarities in
    /// [`Rarity::fallback_order`], then the requested rarity in other
    /// categories, then any non-empty pool. `None` only when no equipment
    /// exists at all.
    #[must_use]
    pub fn lookup(&self, category: LootCategory, rarity: Rarity) -> Option<PoolHit<'_>> {
        let exact = self.pool(category, rarity);
        if !exact.is_empty() {
            return Some(PoolHit { category, rarity, templates: exact });
        }

        for fallback in rarity.fallback_order() {
            let pool = self.pool(category, fallback);
            if !pool.is_empty() {
                return Some(PoolHit { category, rarity: fallback, templates: pool });
            }
        }

        let others = LootCategory::ALL.into_iter().filter(|&c| c != category);
        for other in others.clone() {
            let pool = self.pool(other, rarity);
            if !pool.is_empty() {
                return Some(PoolHit { category: other, rarity, templates: pool });
            }
        }
        for other in others {
            for fallback in rarity.fallback_order() {
                let pool = self.pool(other, fallback);
                if !pool.is_empty() {
                    return Some(PoolHit { category: other, rarity: fallback, templates: pool });
                }
            }
        }

        None
    }
}

/// A non-empty pool returned by [`CategoryPoolIndex::lookup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolHit<'a> {
    /// Category the pool belongs to.
    pub category: LootCategory,
    /// Rarity the pool belongs to.
    pub rarity: Rarity,
    /// Template ids in the pool. Never empty.
    pub templates: &'a [TemplateId],
}
