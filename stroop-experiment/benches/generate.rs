use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::SeedableRng;
use rand::rngs::StdRng;
use stroop_experiment::{StroopConfig, generate_trials};

pub fn bench_generate(c: &mut Criterion) {
    let config = StroopConfig::default();
    let mut g = c.benchmark_group("generate_trials");

    for count in [8usize, 10, 60, 480] {
        g.bench_function(format!("{count}"), |b| {
            b.iter_batched(
                || StdRng::seed_from_u64(count as u64),
                |mut rng| black_box(generate_trials(count, &config.colors, &mut rng).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }
    g.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
