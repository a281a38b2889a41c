//! Benchmark for kill resolution throughput.
//!
//! TARGET: 100,000 kills per second with a four-player roster
//!
//! Run with: cargo bench --package lootforge_economy --bench loot_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lootforge_economy::{
    DropArbiter, EconomyConfig, ItemCatalog, ItemStats, ItemTemplate, ItemType, KillEvent, LootSnapshot,
    MonsterTier, NoProgression, OpenGround, Participant, Rarity, RarityResolver,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_test_catalog() -> ItemCatalog {
    let types = [
        ItemType::MeleeWeapon,
        ItemType::Staff,
        ItemType::ChestArmor,
        ItemType::Boots,
        ItemType::Ring,
        ItemType::Amulet,
    ];
    let mut templates = Vec::new();
    let mut id = 1;
    for item_type in types {
        for rarity in Rarity::ALL {
            templates.push(ItemTemplate {
                id,
                name: format!("{item_type:?} {rarity}"),
                item_type,
                rarity,
                stats: ItemStats {
                    attack: 12,
                    defense: 6,
                    crit_chance: 3.0,
                    ..ItemStats::default()
                },
                hero_restriction: if id % 3 == 0 { Some(id % 4) } else { None },
                max_stack: 1,
            });
            id += 1;
        }
    }
    for rarity in Rarity::ALL {
        templates.push(ItemTemplate {
            id,
            name: format!("Potion {rarity}"),
            item_type: ItemType::Consumable,
            rarity,
            stats: ItemStats {
                heal_percent: 25.0,
                ..ItemStats::default()
            },
            hero_restriction: None,
            max_stack: 10,
        });
        id += 1;
    }
    ItemCatalog::from_templates(templates)
}

fn roster() -> Vec<Participant> {
    (0..4).map(|i| Participant::new(i, Some(i), u64::from(i) * 10)).collect()
}

fn benchmark_rarity_resolution(c: &mut Criterion) {
    let resolver = RarityResolver::new(EconomyConfig::default().rarity_weights);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    c.bench_function("rarity_resolution", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(MonsterTier::Boss), &mut rng)));
    });
}

fn benchmark_single_kill(c: &mut Criterion) {
    let arbiter = DropArbiter::default();
    let snapshot = LootSnapshot::build(create_test_catalog());
    let participants = roster();
    let kill = KillEvent {
        victim_tier: MonsterTier::Champion,
        position: [0.0, 0.0, 0.0],
        killer_unit: Some(0),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    c.bench_function("single_kill_resolution", |b| {
        b.iter(|| {
            black_box(arbiter.resolve_kill(
                &snapshot,
                black_box(&kill),
                &participants,
                &NoProgression,
                &OpenGround,
                &mut rng,
            ))
        });
    });
}

fn benchmark_boss_kills(c: &mut Criterion) {
    let mut config = EconomyConfig::default();
    config.drops.equipment_drop_percent = 100.0;
    let arbiter = DropArbiter::from_config(&config);
    let snapshot = LootSnapshot::build(create_test_catalog());
    let participants = roster();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut group = c.benchmark_group("guaranteed_drops");
    group.throughput(Throughput::Elements(10_000));
    group.sample_size(10);

    group.bench_function("10k_boss_kills", |b| {
        b.iter(|| black_box(arbiter.run_statistics(&snapshot, MonsterTier::Boss, &participants, 10_000, &mut rng)));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_rarity_resolution,
    benchmark_single_kill,
    benchmark_boss_kills
);
criterion_main!(benches);
