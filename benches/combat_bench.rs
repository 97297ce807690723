use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lineage_core::combat::attack::{AttackDefinition, AttackKind};
use lineage_core::combat::damage::resolve_damage;
use lineage_core::config::{DamageConfig, EncounterConfig, TimingConfig};
use lineage_core::grid::compute_cell_centers;
use lineage_core::{Encounter, TraitCatalog, TraitType};

fn bench_damage(c: &mut Criterion) {
    let config = DamageConfig::default();
    let attacker = [TraitType::Fire, TraitType::Ice, TraitType::Steel];
    let weaknesses = [TraitType::Fire, TraitType::Ice, TraitType::Earth, TraitType::Wind];

    c.bench_function("resolve_damage", |b| {
        b.iter(|| {
            resolve_damage(
                black_box(15),
                black_box(&attacker),
                black_box(&weaknesses),
                black_box(Some(TraitType::Steel)),
                &config,
            )
        })
    });
}

fn bench_grid(c: &mut Criterion) {
    c.bench_function("compute_cell_centers_3x3", |b| {
        b.iter(|| compute_cell_centers(black_box(Vec2::new(0.0, -2.0)), 3, 3, black_box(1.5)))
    });

    c.bench_function("compute_cell_centers_16x16", |b| {
        b.iter(|| compute_cell_centers(black_box(Vec2::ZERO), 16, 16, black_box(0.5)))
    });

    let timing = TimingConfig::default();
    let damage = DamageConfig::default();
    c.bench_function("attack_definition_triple", |b| {
        b.iter(|| AttackDefinition::build(black_box(AttackKind::TripleLeftSwipe), &timing, &damage, 2))
    });
}

fn bench_encounter(c: &mut Criterion) {
    let mut config = EncounterConfig::default();
    config.player.base_health = i32::MAX / 2;
    config.boss.max_health = i32::MAX / 2;

    c.bench_function("encounter_enemy_turn_60hz", |b| {
        b.iter(|| {
            let mut encounter = Encounter::new(config.clone(), TraitCatalog::standard());
            encounter.start_new_game();
            if let Some(pick) = encounter.pending_offer().and_then(|o| o.first().copied()) {
                let _ = encounter.select_trait(pick);
            }
            encounter.player_charge();
            for _ in 0..720 {
                encounter.tick(black_box(1.0 / 60.0));
            }
            encounter.drain_notices().len()
        })
    });
}

criterion_group!(benches, bench_damage, bench_grid, bench_encounter);
criterion_main!(benches);
