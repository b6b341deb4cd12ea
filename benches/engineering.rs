use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use finhealth::artifacts::{ArtifactStore, MemoryArtifactStore};
use finhealth::features::{engineer, Mode, Server, Trainer};
use finhealth::training::{GradientBoostedTrees, GradientBoostingConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const JOBS: [&str; 4] = ["Engineer", "Teacher", "Clerk", "Manager"];

fn create_raw_table(n_rows: usize) -> DataFrame {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let pick = |rng: &mut Xoshiro256PlusPlus, xs: &[&'static str]| xs[rng.gen_range(0..xs.len())];

    let mut regions = Vec::with_capacity(n_rows);
    let mut jobs = Vec::with_capacity(n_rows);
    for _ in 0..n_rows {
        regions.push(pick(&mut rng, &REGIONS));
        jobs.push(pick(&mut rng, &JOBS));
    }

    df!(
        "user_id" => (0..n_rows as i64).collect::<Vec<_>>(),
        "age" => (0..n_rows).map(|_| rng.gen_range(20i64..70)).collect::<Vec<_>>(),
        "job_title" => jobs,
        "monthly_income_usd" => (0..n_rows).map(|_| rng.gen_range(1000.0..12000.0)).collect::<Vec<f64>>(),
        "region" => regions,
        "credit_score" => (0..n_rows).map(|_| rng.gen_range(500.0..850.0)).collect::<Vec<f64>>(),
        "savings_to_income_ratio" => (0..n_rows).map(|_| rng.gen_range(0.0..8.0)).collect::<Vec<f64>>(),
        "debt_to_income_ratio" => (0..n_rows).map(|_| rng.gen_range(0.0..6.0)).collect::<Vec<f64>>(),
    )
    .unwrap()
}

fn bench_engineering(c: &mut Criterion) {
    let mut group = c.benchmark_group("engineering");

    for n_rows in [1000, 10000].iter() {
        let df = create_raw_table(*n_rows);

        group.bench_with_input(BenchmarkId::new("training", n_rows), &df, |b, df| {
            let trainer = Trainer::new();
            b.iter(|| trainer.engineer(black_box(df)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("serving", n_rows), &df, |b, df| {
            let store: Arc<dyn ArtifactStore> = Arc::new(MemoryArtifactStore::new());
            engineer(store.clone(), df, Mode::Training).unwrap();
            let server = Server::new(store);
            b.iter(|| server.engineer(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_boosting(c: &mut Criterion) {
    let mut group = c.benchmark_group("boosting");
    group.sample_size(10);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let x = Array2::from_shape_fn((2000, 10), |_| rng.gen::<f64>());
    let y: Array1<f64> = x.rows().into_iter().map(|r| if r[0] + r[1] > 1.0 { 1.0 } else { 0.0 }).collect();

    group.bench_function("fit_2000x10", |b| {
        b.iter(|| {
            let mut model = GradientBoostedTrees::new(GradientBoostingConfig::default());
            model.fit(black_box(&x), black_box(&y)).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_engineering, bench_boosting);
criterion_main!(benches);
