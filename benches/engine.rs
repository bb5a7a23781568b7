//! Benchmarks for the seqopt generation loop.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use seqopt::{
    engine::{Engine, LocalExecutor, ParallelExecutor, RewardAggregator, strategy_from_config},
    rewards,
    schema::{EngineConfig, Method, SequenceSpace},
};

fn evaluator() -> RewardAggregator {
    RewardAggregator::new(vec![
        rewards::stability(1.0),
        rewards::solubility(0.5),
        rewards::novelty(vec!["MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQ".to_string()], 0.3),
    ])
}

fn config(method: Method, population_size: usize) -> EngineConfig {
    EngineConfig {
        method,
        iterations: 10,
        population_size,
        seed: Some(42),
        space: SequenceSpace::new("ACDEFGHIKLMNPQRSTVWY", 16, 48).unwrap(),
        ..Default::default()
    }
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");

    for method in [
        Method::Random,
        Method::Cem,
        Method::Ga,
        Method::Cmaes,
        Method::CmaesVarlen,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(method.to_string()),
            &method,
            |b, &method| {
                b.iter(|| {
                    let config = config(method, 64);
                    let strategy = strategy_from_config(&config).unwrap();
                    let executor = Box::new(LocalExecutor::new(evaluator()));
                    let mut engine = Engine::new(config, strategy, executor).unwrap();
                    black_box(engine.run().unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_executors(c: &mut Criterion) {
    let mut group = c.benchmark_group("executor");

    for population_size in [64, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::new("sequential", population_size),
            &population_size,
            |b, &n| {
                b.iter(|| {
                    let config = config(Method::CmaesVarlen, n);
                    let strategy = strategy_from_config(&config).unwrap();
                    let executor = Box::new(LocalExecutor::new(evaluator()));
                    let mut engine = Engine::new(config, strategy, executor).unwrap();
                    black_box(engine.run().unwrap());
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", population_size),
            &population_size,
            |b, &n| {
                b.iter(|| {
                    let config = config(Method::CmaesVarlen, n);
                    let strategy = strategy_from_config(&config).unwrap();
                    let executor = Box::new(ParallelExecutor::new(evaluator()));
                    let mut engine = Engine::new(config, strategy, executor).unwrap();
                    black_box(engine.run().unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_methods, bench_executors);
criterion_main!(benches);
