// benches/monte_carlo.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use godel_loop_sim::prelude::*;

fn benchmark_loop_simulation(c: &mut Criterion) {
    c.bench_function("critical_radius_bisection", |b| {
        let finder = CriticalRadiusFinder::from_omega(0.5).unwrap();
        let bracket = SearchBracket::new(0.0, 3.0, 1e-10).unwrap();
        b.iter(|| finder.find(black_box(&bracket)).unwrap());
    });

    c.bench_function("critical_radius_scan", |b| {
        let finder = CriticalRadiusFinder::from_omega(0.5).unwrap();
        let scan = ScanConfig::default();
        b.iter(|| finder.scan(black_box(&scan)).unwrap());
    });

    c.bench_function("stratified_complexity_50", |b| {
        let engine = ConsistencyMonteCarlo::new(DEFAULT_SEED);
        let config = SimulationConfig::new(0.5, 50, 1000).unwrap();
        b.iter(|| engine.simulate(black_box(&config)).unwrap());
    });

    c.bench_function("direct_complexity_50", |b| {
        let engine = ConsistencyMonteCarlo::new(DEFAULT_SEED).with_estimator(Estimator::Direct);
        let config = SimulationConfig::new(0.5, 50, 1000).unwrap();
        b.iter(|| engine.simulate(black_box(&config)).unwrap());
    });
}

criterion_group!(benches, benchmark_loop_simulation);
criterion_main!(benches);
