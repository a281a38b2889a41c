//! # Drop Simulation
//!
//! Resolves many kills per monster tier against a small built-in catalog
//! with a two-player roster and prints the observed rates.
//!
//! Usage: `drop_simulation [kills_per_tier] [economy.toml]`

use std::time::Instant;

use lootforge_economy::{
    DropArbiter, EconomyConfig, ItemCatalog, ItemStats, ItemTemplate, ItemType, LootSnapshot, MonsterTier,
    Participant, Rarity,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DEFAULT_KILLS: u32 = 200_000;

fn demo_catalog() -> ItemCatalog {
    let equipment = [
        ("Sword", ItemType::MeleeWeapon, 12, 0, 0),
        ("Longbow", ItemType::RangedWeapon, 10, 0, 0),
        ("Staff", ItemType::Staff, 4, 0, 0),
        ("Cuirass", ItemType::ChestArmor, 0, 10, 60),
        ("Helm", ItemType::Helmet, 0, 6, 30),
        ("Greaves", ItemType::Boots, 0, 4, 20),
        ("Ring", ItemType::Ring, 3, 0, 15),
        ("Amulet", ItemType::Amulet, 0, 2, 40),
    ];

    let mut templates = Vec::new();
    let mut id = 1;
    for (name, item_type, attack, defense, health) in equipment {
        for rarity in Rarity::ALL {
            let scale = 1 + rarity as u32;
            templates.push(ItemTemplate {
                id,
                name: format!("{rarity} {name}"),
                item_type,
                rarity,
                stats: ItemStats {
                    attack: attack * scale,
                    defense: defense * scale,
                    health: health * scale,
                    ability_power: if item_type == ItemType::Staff { 15 * scale } else { 0 },
                    ..ItemStats::default()
                },
                hero_restriction: None,
                max_stack: 1,
            });
            id += 1;
        }
    }
    for (rarity, heal) in Rarity::ALL.into_iter().zip([20.0, 35.0, 50.0, 80.0]) {
        templates.push(ItemTemplate {
            id,
            name: format!("{rarity} Potion"),
            item_type: ItemType::Consumable,
            rarity,
            stats: ItemStats {
                heal_percent: heal,
                ..ItemStats::default()
            },
            hero_restriction: None,
            max_stack: 10,
        });
        id += 1;
    }
    ItemCatalog::from_templates(templates)
}

fn main() {
    let mut args = std::env::args().skip(1);
    let kills = args.next().and_then(|a| a.parse().ok()).unwrap_or(DEFAULT_KILLS);
    let config = args.next().map_or_else(EconomyConfig::default, |path| EconomyConfig::load_or_default(path));

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         LOOTFORGE - DROP SIMULATION                              ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let arbiter = DropArbiter::from_config(&config);
    let snapshot = LootSnapshot::build(demo_catalog());
    let roster = [Participant::new(1, None, 10), Participant::new(2, None, 20)];
    let mut rng = ChaCha8Rng::seed_from_u64(0x10F7_F02E);

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Kills per tier:     {kills}");
    println!("│ Participants:       {}", roster.len());
    println!("│ Templates:          {}", snapshot.catalog().len());
    println!("│ Equipment:          {}", snapshot.pools().equipment_count());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let start = Instant::now();

    println!("┌─ RESULTS ───────────────────────────────────────────────────────────────────────┐");
    println!("│ tier      equip%   potion%  both%    common%  rare%    epic%    legend%  +1..   │");
    for tier in MonsterTier::ALL {
        let stats = arbiter.run_statistics(&snapshot, tier, &roster, kills, &mut rng);
        let upgraded: u64 = stats.upgrade_levels.range(1..).map(|(_, count)| count).sum();
        let upgraded_percent = if stats.equipment_drops == 0 {
            0.0
        } else {
            upgraded as f64 / stats.equipment_drops as f64 * 100.0
        };

        println!(
            "│ {:<9} {:>6.2}   {:>6.2}   {:>6.2}   {:>6.2}   {:>6.2}   {:>6.2}   {:>6.2}   {:>6.2} │",
            tier.to_string(),
            stats.equipment_rate_percent(),
            stats.potion_rate_percent(),
            stats.multi_recipient_rate_percent(),
            stats.rarity_share_percent(Rarity::Common),
            stats.rarity_share_percent(Rarity::Rare),
            stats.rarity_share_percent(Rarity::Epic),
            stats.rarity_share_percent(Rarity::Legendary),
            upgraded_percent,
        );
    }
    println!("└─────────────────────────────────────────────────────────────────────────────────┘");
    println!();

    let elapsed = start.elapsed();
    let total = u64::from(kills) * MonsterTier::ALL.len() as u64;
    println!(
        "Resolved {total} kills in {:.2}s ({:.0} kills/s)",
        elapsed.as_secs_f64(),
        total as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
}
