//! Benchmark for upgrade, cleanse and pricing throughput.
//!
//! Run with: cargo bench --package lootforge_economy --bench upgrade_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lootforge_economy::{
    EconomyCalculator, EconomyConfig, ItemInstance, ItemStats, ItemTemplate, ItemTransactions, ItemType, Rarity,
    StatUpgrader, Wallet,
};

fn create_test_template() -> ItemTemplate {
    ItemTemplate {
        id: 1,
        name: "Runed Greatsword".to_string(),
        item_type: ItemType::MeleeWeapon,
        rarity: Rarity::Epic,
        stats: ItemStats {
            attack: 45,
            health: 120,
            crit_chance: 6.0,
            crit_damage: 25.0,
            lifesteal: 3.0,
            ..ItemStats::default()
        },
        hero_restriction: None,
        max_stack: 1,
    }
}

fn benchmark_upgrade_steps(c: &mut Criterion) {
    let upgrader = StatUpgrader::default();
    let template = create_test_template();

    c.bench_function("upgrade_to_level_10", |b| {
        b.iter(|| {
            let mut item = ItemInstance::from_template(&template);
            upgrader.apply_levels(&mut item, black_box(10));
            black_box(item)
        });
    });
}

fn benchmark_upgrade_cleanse_cycle(c: &mut Criterion) {
    let config = EconomyConfig::default();
    let desk = ItemTransactions::new(&config);
    let template = create_test_template();

    c.bench_function("upgrade_5_then_cleanse", |b| {
        b.iter(|| {
            let mut item = ItemInstance::from_template(&template);
            let mut wallet = Wallet::new(1_000_000, 1_000_000);
            for _ in 0..5 {
                if desk.upgrade_item(&mut item, &mut wallet).is_err() {
                    break;
                }
            }
            let refund = desk.cleanse_item(&mut item, &mut wallet).map(|r| r.dust_refunded);
            black_box((wallet, refund))
        });
    });
}

fn benchmark_pricing(c: &mut Criterion) {
    let config = EconomyConfig::default();
    let calc = EconomyCalculator::new(&config);
    let mut item = ItemInstance::from_template(&create_test_template());
    item.upgrade_level = 7;

    c.bench_function("price_quotes", |b| {
        b.iter(|| {
            let item = black_box(&item);
            black_box((
                calc.buy_price(item),
                calc.sell_price(item),
                calc.upgrade_cost(item),
                calc.dismantle_value(item),
                calc.cleanse_refund(item),
            ))
        });
    });
}

criterion_group!(
    benches,
    benchmark_upgrade_steps,
    benchmark_upgrade_cleanse_cycle,
    benchmark_pricing
);
criterion_main!(benches);
