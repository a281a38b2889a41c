//! # Items
//!
//! Immutable catalog templates and the mutable instances cloned from them.
//!
//! An [`ItemInstance`] is owned by exactly one container at a time (an
//! inventory slot, an equip slot or a world drop). It deliberately does not
//! implement `Clone`: handing an item over is always a move.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};
use crate::tier::Rarity;

/// Unique identifier for an item template.
pub type TemplateId = u32;

/// Identifier of a playable hero.
pub type HeroId = u32;

/// Currencies this engine prices in or grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    /// Primary currency: buying, selling and cleansing.
    Gold,
    /// Secondary currency: upgrading, dismantle returns and cleanse refunds.
    Dust,
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gold => f.write_str("gold"),
            Self::Dust => f.write_str("dust"),
        }
    }
}

/// Coarse slot grouping used to balance drop variety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootCategory {
    /// Anything held in the weapon hand.
    Weapons,
    /// Body, head, feet and shields.
    Armor,
    /// Rings, amulets and trinkets.
    Accessories,
}

impl LootCategory {
    /// All categories. Equipment drops pick one uniformly.
    pub const ALL: [Self; 3] = [Self::Weapons, Self::Armor, Self::Accessories];
}

/// Concrete item type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Swords, axes, maces.
    MeleeWeapon,
    /// Bows and crossbows.
    RangedWeapon,
    /// Staves and wands.
    Staff,
    /// Body armour.
    ChestArmor,
    /// Head armour.
    Helmet,
    /// Foot armour.
    Boots,
    /// Off-hand shields.
    Shield,
    /// Rings.
    Ring,
    /// Amulets.
    Amulet,
    /// Trinkets.
    Trinket,
    /// Potions and other stackable consumables.
    Consumable,
}

impl ItemType {
    /// Loot category for this type; `None` for consumables.
    #[must_use]
    pub const fn category(self) -> Option<LootCategory> {
        match self {
            Self::MeleeWeapon | Self::RangedWeapon | Self::Staff => Some(LootCategory::Weapons),
            Self::ChestArmor | Self::Helmet | Self::Boots | Self::Shield => {
                Some(LootCategory::Armor)
            }
            Self::Ring | Self::Amulet | Self::Trinket => Some(LootCategory::Accessories),
            Self::Consumable => None,
        }
    }

    /// Returns true for consumables.
    #[inline]
    #[must_use]
    pub const fn is_consumable(self) -> bool {
        matches!(self, Self::Consumable)
    }
}

/// Elemental damage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// Burning damage over time.
    Fire,
    /// Slowing cold damage.
    Frost,
    /// Chaining shock damage.
    Lightning,
    /// Stacking poison.
    Poison,
}

/// Elemental payload applied on hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementalInfusion {
    /// The element applied.
    pub element: Element,
    /// Stacks applied per hit. Never below 1.
    pub stacks: u32,
}

/// Numeric stats carried by templates and instances.
///
/// Attack, defense, health and ability power scale with upgrades. Crit
/// chance and crit damage gain flat amounts per upgrade. Everything else is a
/// gear effect, fixed at drop time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStats {
    /// Flat attack damage.
    pub attack: u32,
    /// Flat armour.
    pub defense: u32,
    /// Flat maximum health.
    pub health: u32,
    /// Flat ability power.
    pub ability_power: u32,
    /// Crit chance in percent.
    pub crit_chance: f32,
    /// Bonus crit damage in percent.
    pub crit_damage: f32,
    /// Movement speed bonus in percent.
    pub move_speed: f32,
    /// Extra dodge charges.
    pub dodge_charges: u32,
    /// Gold-on-kill bonus magnitude.
    pub gold_on_kill: f32,
    /// Dust-on-kill bonus magnitude.
    pub dust_on_kill: f32,
    /// Lifesteal in percent.
    pub lifesteal: f32,
    /// Damage reflected to attackers in percent.
    pub thorns: f32,
    /// Health regenerated per second.
    pub regen: f32,
    /// Attack speed bonus in percent.
    pub attack_haste: f32,
    /// Cast speed bonus in percent.
    pub cast_haste: f32,
    /// Whether attacks pick targets automatically.
    pub auto_target: bool,
    /// Elemental payload, if any.
    pub elemental: Option<ElementalInfusion>,
    /// Consumables only: percent of max health healed.
    pub heal_percent: f32,
    /// Consumables only: percent of max health granted as shield.
    pub shield_percent: f32,
}

impl ItemStats {
    /// Bonus magnitude for an on-kill currency.
    #[inline]
    #[must_use]
    pub fn on_kill_bonus(&self, currency: CurrencyKind) -> f32 {
        match currency {
            CurrencyKind::Gold => self.gold_on_kill,
            CurrencyKind::Dust => self.dust_on_kill,
        }
    }
}

/// An immutable catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Unique identifier.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Concrete item type.
    pub item_type: ItemType,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Base stats before randomisation and upgrades.
    #[serde(default)]
    pub stats: ItemStats,
    /// Hero this item is restricted to, if any.
    #[serde(default)]
    pub hero_restriction: Option<HeroId>,
    /// Maximum stack size.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

const fn default_max_stack() -> u32 {
    1
}

impl ItemTemplate {
    /// Loot category, `None` for consumables.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> Option<LootCategory> {
        self.item_type.category()
    }

    /// Whether `hero` may use this item.
    #[inline]
    #[must_use]
    pub fn usable_by(&self, hero: Option<HeroId>) -> bool {
        match self.hero_restriction {
            None => true,
            Some(required) => hero == Some(required),
        }
    }
}

/// A live item: a template clone plus its mutable progression state.
#[derive(Debug, PartialEq)]
pub struct ItemInstance {
    /// Template this instance was cloned from.
    pub template_id: TemplateId,
    /// Display name.
    pub name: String,
    /// Concrete item type.
    pub item_type: ItemType,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Current stats (randomised and upgraded).
    pub stats: ItemStats,
    /// Hero restriction copied from the template.
    pub hero_restriction: Option<HeroId>,
    /// Maximum stack size.
    pub max_stack: u32,
    /// Current stack size.
    pub current_stack: u32,
    /// Number of upgrades applied.
    pub upgrade_level: u32,
    /// Dust actually spent upgrading this item.
    pub dust_spent_upgrading: u64,
}

impl ItemInstance {
    /// Clones a template into a fresh level-0 instance with a stack of one.
    #[must_use]
    pub fn from_template(template: &ItemTemplate) -> Self {
        Self {
            template_id: template.id,
            name: template.name.clone(),
            item_type: template.item_type,
            rarity: template.rarity,
            stats: template.stats.clone(),
            hero_restriction: template.hero_restriction,
            max_stack: template.max_stack.max(1),
            current_stack: 1,
            upgrade_level: 0,
            dust_spent_upgrading: 0,
        }
    }

    /// Sets the stack size, clamped to `1..=max_stack`.
    #[must_use]
    pub fn with_stack(mut self, count: u32) -> Self {
        self.current_stack = count.clamp(1, self.max_stack);
        self
    }

    /// Returns true for consumables.
    #[inline]
    #[must_use]
    pub const fn is_consumable(&self) -> bool {
        self.item_type.is_consumable()
    }

    /// Loot category, `None` for consumables.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> Option<LootCategory> {
        self.item_type.category()
    }

    /// Fails with [`EconomyError::NotUpgradeable`] for consumables.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is a consumable.
    pub fn ensure_upgradeable(&self) -> EconomyResult<()> {
        if self.is_consumable() {
            return Err(EconomyError::NotUpgradeable {
                template_id: self.template_id,
            });
        }
        Ok(())
    }
}

/// The once-loaded template catalog.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    templates: Vec<ItemTemplate>,
    by_id: HashMap<TemplateId, usize>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog. Duplicate ids keep the first template.
    #[must_use]
    pub fn from_templates(templates: impl IntoIterator<Item = ItemTemplate>) -> Self {
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(template);
        }
        catalog
    }

    fn insert(&mut self, template: ItemTemplate) {
        if self.by_id.contains_key(&template.id) {
            tracing::warn!(template_id = template.id, "duplicate template id ignored");
            return;
        }
        self.by_id.insert(template.id, self.templates.len());
        self.templates.push(template);
    }

    /// Gets a template by ID.
    #[must_use]
    pub fn get(&self, id: TemplateId) -> Option<&ItemTemplate> {
        self.by_id.get(&id).map(|&idx| &self.templates[idx])
    }

    /// Returns all templates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemTemplate> {
        self.templates.iter()
    }

    /// Returns the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the catalog holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
