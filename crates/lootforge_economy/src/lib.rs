//! # LOOTFORGE Economy System
//!
//! Loot generation and item progression for LOOTFORGE sessions.
//!
//! ## Design Principles
//!
//! 1. **Per-participant fairness** - Every living player rolls independently on every kill
//! 2. **One scaling curve** - Upgrades, drop-time upgrades, pricing and on-kill bonuses share it
//! 3. **Transactional progression** - Upgrades, cleanses and sales are all-or-nothing
//! 4. **Optional configuration** - Every constant has a literal default; TOML overrides it
//!
//! ## Layers
//!
//! ```text
//! LootEngine (integration)        shared state, events, catalog swaps
//!   ├── DropArbiter (loot)        per-kill, per-participant drop rolls
//!   │     ├── RarityResolver      weighted rarity per monster tier
//!   │     ├── CategoryPoolIndex   (category, rarity) pools with fallback
//!   │     ├── StatRandomizer      rarity-banded stat variance
//!   │     └── UpgradeRollEngine   drop-time upgrade ladder
//!   ├── OnKillBonusLedger         currency on kill
//!   └── ItemTransactions          upgrade / cleanse / dismantle / buy / sell
//!         └── EconomyCalculator   pricing formulas over StatScalingCurve
//! ```
//!
//! ## Thread Safety
//!
//! The engine is designed to be called from the authoritative side, exactly
//! once per kill. It never persists anything; drops and currency grants are
//! handed out as events.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lootforge_economy::{EconomyConfig, ItemCatalog, KillEvent, LootEngine, MonsterTier, Participant};
//!
//! let config = EconomyConfig::load_or_default("data/economy.toml");
//! let engine = LootEngine::new(config, catalog, seed);
//!
//! engine.on_kill(
//!     &KillEvent { victim_tier: MonsterTier::Boss, position, killer_unit: Some(hero_unit) },
//!     &roster,
//! );
//! for event in engine.drain_events() {
//!     // forward to the pickup and currency subsystems
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bonus;
pub mod config;
pub mod curve;
pub mod error;
pub mod item;
pub mod loot;
pub mod pools;
pub mod pricing;
pub mod randomizer;
pub mod rarity;
pub mod tier;
pub mod transactions;
pub mod upgrade_roll;
pub mod integration;

pub use bonus::{CurrencyGrant, OnKillBonus, OnKillBonusEntry, OnKillBonusLedger};
pub use config::EconomyConfig;
pub use curve::{StatScalingCurve, StatUpgrader};
pub use error::{EconomyError, EconomyResult};
pub use item::{CurrencyKind, HeroId, ItemCatalog, ItemInstance, ItemStats, ItemTemplate, ItemType, LootCategory, TemplateId};
pub use loot::{
    DropArbiter, DropPlacement, DropRecord, DropStatistics, KillEvent, LootSnapshot, OpenGround, Participant,
    ParticipantId, Position, UnitId,
};
pub use pools::CategoryPoolIndex;
pub use pricing::EconomyCalculator;
pub use randomizer::StatRandomizer;
pub use rarity::RarityResolver;
pub use tier::{MonsterTier, PerRarity, PerTier, Rarity};
pub use transactions::{CleanseReceipt, DismantleRejected, ItemTransactions, UpgradeReceipt, Wallet};
pub use upgrade_roll::{NoProgression, ProgressionScalar, UpgradeRollEngine};

pub use integration::{EconomyEvent, KillSummary, LootEngine};
