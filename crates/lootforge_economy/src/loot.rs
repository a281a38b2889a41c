//! # Drop Arbitration
//!
//! Decides what every participant receives from one kill.
//!
//! ## Per-Kill Flow
//!
//! ```text
//! KillEvent ──> for each alive human participant, in roster order:
//!                 ├─ equipment roll (tier chance)
//!                 │    rarity -> category -> pool (+fallback) -> hero filter
//!                 │    -> clone -> stat variance -> upgrade ladder -> place
//!                 └─ potion roll (tier chance, independent)
//!                      potion rarity -> potion pick -> stack size -> place
//! ```
//!
//! Every participant rolls independently, not only the killer. One kill can
//! hand private drops to several participants and nobody's roll changes
//! anybody else's odds. Roster order only decides which random draws each
//! participant consumes.
//!
//! The arbiter must run exactly once per kill, on the authoritative side.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use rand::Rng;

use crate::config::{DropConfig, EconomyConfig};
use crate::item::{HeroId, ItemCatalog, ItemInstance, ItemTemplate, LootCategory};
use crate::pools::CategoryPoolIndex;
use crate::randomizer::StatRandomizer;
use crate::rarity::RarityResolver;
use crate::tier::{MonsterTier, Rarity};
use crate::upgrade_roll::{NoProgression, ProgressionScalar, UpgradeRollEngine};

/// Identifier of a participant in the session.
pub type ParticipantId = u32;

/// Identifier of a unit in the simulation.
pub type UnitId = u64;

/// World position (x, y, z). Drops scatter in the x/z plane.
pub type Position = [f32; 3];

/// A player taking part in the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    /// Participant identifier; owner of private drops.
    pub id: ParticipantId,
    /// Hero the participant plays, if one has been picked.
    pub hero: Option<HeroId>,
    /// Bots and spectators never receive drops.
    pub is_human: bool,
    /// Dead participants skip the roll for this kill.
    pub alive: bool,
    /// The participant's hero unit.
    pub hero_unit: UnitId,
    /// Subordinate units the participant controls (summons, pets).
    pub owned_units: Vec<UnitId>,
}

impl Participant {
    /// Creates a living human participant with no owned units.
    #[must_use]
    pub const fn new(id: ParticipantId, hero: Option<HeroId>, hero_unit: UnitId) -> Self {
        Self {
            id,
            hero,
            is_human: true,
            alive: true,
            hero_unit,
            owned_units: Vec::new(),
        }
    }

    /// Whether this participant takes part in drop rolls.
    #[inline]
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.is_human && self.alive
    }

    /// Whether `unit` is the hero or one of the owned units.
    #[must_use]
    pub fn controls(&self, unit: UnitId) -> bool {
        self.hero_unit == unit || self.owned_units.contains(&unit)
    }
}

/// One enemy death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KillEvent {
    /// Tier of the defeated monster.
    pub victim_tier: MonsterTier,
    /// Where the monster died.
    pub position: Position,
    /// Unit credited with the kill, if any.
    pub killer_unit: Option<UnitId>,
}

/// An item placed in the world, handed to the external pickup subsystem.
#[derive(Debug, PartialEq)]
pub struct DropRecord {
    /// The dropped item. Moves to whoever picks it up.
    pub item: ItemInstance,
    /// Where the item lies.
    pub position: Position,
    /// Only this participant may collect it; `None` means anyone may.
    pub owner: Option<ParticipantId>,
}

/// World-position validity check supplied by the host simulation.
pub trait DropPlacement: Send + Sync {
    /// Whether an item may be placed at `position`.
    fn is_valid(&self, position: Position) -> bool;
}

/// Placement that accepts every position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenGround;

impl DropPlacement for OpenGround {
    #[inline]
    fn is_valid(&self, _position: Position) -> bool {
        true
    }
}

/// Catalog plus the pool index built from it. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct LootSnapshot {
    catalog: ItemCatalog,
    pools: CategoryPoolIndex,
}

impl LootSnapshot {
    /// Indexes `catalog` into a snapshot.
    #[must_use]
    pub fn build(catalog: ItemCatalog) -> Self {
        let pools = CategoryPoolIndex::build(&catalog);
        Self { catalog, pools }
    }

    /// The template catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// The pool index.
    #[must_use]
    pub const fn pools(&self) -> &CategoryPoolIndex {
        &self.pools
    }
}

/// Resolves kills into private drops.
#[derive(Clone, Debug)]
pub struct DropArbiter {
    drops: DropConfig,
    equipment_rarity: RarityResolver,
    potion_rarity: RarityResolver,
    randomizer: StatRandomizer,
    upgrades: UpgradeRollEngine,
}

impl DropArbiter {
    /// Builds an arbiter from configuration.
    #[must_use]
    pub fn from_config(config: &EconomyConfig) -> Self {
        Self {
            drops: config.drops.clone(),
            equipment_rarity: RarityResolver::new(config.rarity_weights.clone()),
            potion_rarity: RarityResolver::new(config.potion_rarity_weights.0.clone()),
            randomizer: StatRandomizer::new(config.drops.stat_variance_max.clone()),
            upgrades: UpgradeRollEngine::from_config(&config.upgrades),
        }
    }

    /// Resolves one kill for every eligible participant.
    pub fn resolve_kill<R: Rng + ?Sized>(
        &self,
        snapshot: &LootSnapshot,
        kill: &KillEvent,
        participants: &[Participant],
        progression: &dyn ProgressionScalar,
        placement: &dyn DropPlacement,
        rng: &mut R,
    ) -> Vec<DropRecord> {
        let tier = kill.victim_tier;
        let equipment_chance = self.drops.equipment_chance_percent(tier);
        let potion_chance = self.drops.potion_chance_percent(tier);
        let mut drops = Vec::new();

        for participant in participants.iter().filter(|p| p.is_eligible()) {
            if roll_percent(equipment_chance, rng) {
                match self.roll_equipment(snapshot, tier, participant.hero, progression, rng) {
                    Some(item) => {
                        tracing::debug!(
                            participant = participant.id,
                            %tier,
                            template_id = item.template_id,
                            rarity = %item.rarity,
                            level = item.upgrade_level,
                            "equipment drop"
                        );
                        let position = self.place(kill.position, placement, rng);
                        drops.push(DropRecord {
                            item,
                            position,
                            owner: Some(participant.id),
                        });
                    }
                    None => tracing::warn!(participant = participant.id, "equipment roll passed but catalog has no equipment"),
                }
            }

            if roll_percent(potion_chance, rng) {
                match self.roll_potion(snapshot, tier, rng) {
                    Some(item) => {
                        tracing::debug!(
                            participant = participant.id,
                            %tier,
                            template_id = item.template_id,
                            stack = item.current_stack,
                            "potion drop"
                        );
                        let position = self.place(kill.position, placement, rng);
                        drops.push(DropRecord {
                            item,
                            position,
                            owner: Some(participant.id),
                        });
                    }
                    None => tracing::warn!(participant = participant.id, "potion roll passed but catalog has no potions"),
                }
            }
        }

        drops
    }

    /// Builds one equipment drop for a participant playing `hero`.
    ///
    /// `None` only when the catalog holds no equipment at all.
    pub fn roll_equipment<R: Rng + ?Sized>(
        &self,
        snapshot: &LootSnapshot,
        tier: MonsterTier,
        hero: Option<HeroId>,
        progression: &dyn ProgressionScalar,
        rng: &mut R,
    ) -> Option<ItemInstance> {
        let rarity = self.equipment_rarity.resolve(tier, rng);
        let category = LootCategory::ALL[rng.gen_range(0..LootCategory::ALL.len())];
        let hit = snapshot.pools.lookup(category, rarity)?;

        let pool: Vec<&ItemTemplate> = hit
            .templates
            .iter()
            .filter_map(|&id| snapshot.catalog.get(id))
            .collect();
        let usable: Vec<&ItemTemplate> = if self.drops.restrict_to_usable_items {
            pool.iter().copied().filter(|t| t.usable_by(hero)).collect()
        } else {
            Vec::new()
        };
        // A filter that empties the pool is ignored rather than dropping nothing
        let candidates = if usable.is_empty() { &pool } else { &usable };

        let template = pick(candidates, rng)?;
        let mut item = ItemInstance::from_template(template);
        item.stats = self.randomizer.randomize(&template.stats, template.rarity, rng);
        self.upgrades.roll_and_apply(&mut item, tier, progression, rng);
        Some(item)
    }

    /// Builds one potion drop.
    ///
    /// `None` only when the catalog holds no consumables.
    pub fn roll_potion<R: Rng + ?Sized>(
        &self,
        snapshot: &LootSnapshot,
        tier: MonsterTier,
        rng: &mut R,
    ) -> Option<ItemInstance> {
        let rarity = self.potion_rarity.resolve(tier, rng);
        let template = pick_potion(snapshot, rarity, rng)?;

        let (low, high) = self.drops.potion_stack_range(tier);
        let stack = rng.gen_range(low..=high);
        Some(ItemInstance::from_template(template).with_stack(stack))
    }

    /// Picks a valid point near `origin`, or `origin` itself.
    pub fn place<R: Rng + ?Sized>(&self, origin: Position, placement: &dyn DropPlacement, rng: &mut R) -> Position {
        let radius = self.drops.scatter_radius;
        if radius.is_finite() && radius > 0.0 {
            for _ in 0..self.drops.placement_attempts {
                let angle = rng.gen_range(0.0..TAU);
                let distance = rng.gen_range(0.0..=radius);
                let candidate = [
                    origin[0] + angle.cos() * distance,
                    origin[1],
                    origin[2] + angle.sin() * distance,
                ];
                if placement.is_valid(candidate) {
                    return candidate;
                }
            }
        }
        origin
    }

    /// Resolves `iterations` kills of `tier` against `participants` and
    /// aggregates the outcome.
    pub fn run_statistics<R: Rng + ?Sized>(
        &self,
        snapshot: &LootSnapshot,
        tier: MonsterTier,
        participants: &[Participant],
        iterations: u32,
        rng: &mut R,
    ) -> DropStatistics {
        let mut stats = DropStatistics::new();
        let eligible = participants.iter().filter(|p| p.is_eligible()).count();
        let kill = KillEvent {
            victim_tier: tier,
            position: [0.0; 3],
            killer_unit: None,
        };

        for _ in 0..iterations {
            let drops = self.resolve_kill(snapshot, &kill, participants, &NoProgression, &OpenGround, rng);
            stats.record_kill(eligible, &drops);
        }
        stats
    }
}

impl Default for DropArbiter {
    fn default() -> Self {
        Self::from_config(&EconomyConfig::default())
    }
}

#[inline]
fn roll_percent<R: Rng + ?Sized>(chance_percent: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() * 100.0 < chance_percent
}

fn pick<'a, R: Rng + ?Sized>(candidates: &[&'a ItemTemplate], rng: &mut R) -> Option<&'a ItemTemplate> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

/// Exact rarity, else any rarity up to the requested one, else anything.
fn pick_potion<'a, R: Rng + ?Sized>(snapshot: &'a LootSnapshot, rarity: Rarity, rng: &mut R) -> Option<&'a ItemTemplate> {
    let potions: Vec<&ItemTemplate> = snapshot
        .pools
        .consumables()
        .iter()
        .filter_map(|&id| snapshot.catalog.get(id))
        .collect();

    let exact: Vec<&ItemTemplate> = potions.iter().copied().filter(|t| t.rarity == rarity).collect();
    if !exact.is_empty() {
        return pick(&exact, rng);
    }
    let lower: Vec<&ItemTemplate> = potions.iter().copied().filter(|t| t.rarity <= rarity).collect();
    if !lower.is_empty() {
        return pick(&lower, rng);
    }
    pick(&potions, rng)
}

/// Aggregated outcome of many simulated kills.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropStatistics {
    /// Kills resolved.
    pub kills: u64,
    /// Participant rolls performed (kills times eligible participants).
    pub participant_rolls: u64,
    /// Equipment drops created.
    pub equipment_drops: u64,
    /// Potion drops created.
    pub potion_drops: u64,
    /// Equipment drops per rarity, indexed by `Rarity as usize`.
    pub rarity_counts: [u64; 4],
    /// Equipment drops per pre-upgrade level.
    pub upgrade_levels: BTreeMap<u32, u64>,
    /// Kills where two or more participants received equipment.
    pub multi_recipient_kills: u64,
}

impl DropStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one resolved kill with `eligible` participants.
    pub fn record_kill(&mut self, eligible: usize, drops: &[DropRecord]) {
        self.kills += 1;
        self.participant_rolls += eligible as u64;

        let mut recipients: Vec<ParticipantId> = Vec::new();
        for drop in drops {
            if drop.item.is_consumable() {
                self.potion_drops += 1;
                continue;
            }
            self.equipment_drops += 1;
            self.rarity_counts[drop.item.rarity as usize] += 1;
            *self.upgrade_levels.entry(drop.item.upgrade_level).or_insert(0) += 1;
            if let Some(owner) = drop.owner {
                if !recipients.contains(&owner) {
                    recipients.push(owner);
                }
            }
        }
        if recipients.len() >= 2 {
            self.multi_recipient_kills += 1;
        }
    }

    /// Equipment drops per participant roll, in percent.
    #[must_use]
    pub fn equipment_rate_percent(&self) -> f64 {
        percent(self.equipment_drops, self.participant_rolls)
    }

    /// Potion drops per participant roll, in percent.
    #[must_use]
    pub fn potion_rate_percent(&self) -> f64 {
        percent(self.potion_drops, self.participant_rolls)
    }

    /// Share of equipment drops with `rarity`, in percent.
    #[must_use]
    pub fn rarity_share_percent(&self, rarity: Rarity) -> f64 {
        percent(self.rarity_counts[rarity as usize], self.equipment_drops)
    }

    /// Kills that rewarded two or more participants, in percent.
    #[must_use]
    pub fn multi_recipient_rate_percent(&self) -> f64 {
        percent(self.multi_recipient_kills, self.kills)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
