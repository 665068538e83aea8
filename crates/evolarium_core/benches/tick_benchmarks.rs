use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use evolarium_core::{SimConfig, Simulation};
use evolarium_data::WorldSettings;

fn world(population: usize, predation: bool) -> Simulation {
    let config = SimConfig {
        seed: Some(42),
        initial_population: population,
        initial_food: population * 2,
        ..Default::default()
    };
    let mut settings = WorldSettings::default();
    settings.flags.predation = predation;
    Simulation::new(config, settings).expect("valid benchmark config")
}

fn bench_tick(c: &mut Criterion) {
    for &population in &[1_000usize, 5_000] {
        c.bench_function(&format!("tick_{population}_organisms"), |b| {
            b.iter_batched(
                || world(population, true),
                |mut sim| {
                    for _ in 0..10 {
                        black_box(sim.tick());
                    }
                    sim
                },
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_tick_without_predation(c: &mut Criterion) {
    c.bench_function("tick_5000_organisms_no_predation", |b| {
        b.iter_batched(
            || world(5_000, false),
            |mut sim| {
                for _ in 0..10 {
                    black_box(sim.tick());
                }
                sim
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_stats_sample(c: &mut Criterion) {
    let mut sim = world(5_000, true);
    c.bench_function("stats_sample_5000", |b| {
        b.iter(|| {
            sim.sample_stats();
            black_box(sim.stats.samples)
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_tick_without_predation,
    bench_stats_sample
);
criterion_main!(benches);
