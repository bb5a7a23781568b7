//! Variable-length CMA-ES demo.
//!
//! Optimizes peptide-like sequences whose length is itself part of the
//! search, scoring stability alongside G/C content.

use seqopt::{
    engine::{Engine, LocalExecutor, RewardAggregator, strategy_from_config},
    rewards,
    schema::{EngineConfig, Method, SequenceSpace},
};

fn main() {
    env_logger::init();

    let config = EngineConfig {
        method: Method::CmaesVarlen,
        iterations: 8,
        population_size: 32,
        seed: Some(42),
        space: SequenceSpace::new("ACDEFGHIKLMNPQRSTVWY", 8, 25).unwrap(),
        ..Default::default()
    };

    let evaluator = RewardAggregator::new(vec![
        rewards::stability(1.0),
        rewards::gc_content(0.5, 0.1, 0.5),
    ]);

    let strategy = strategy_from_config(&config).unwrap();
    let executor = Box::new(LocalExecutor::new(evaluator));
    let mut engine = Engine::new(config.clone(), strategy, executor).unwrap();

    println!("Variable-Length CMA-ES Optimization");
    println!("===================================");
    println!(
        "Alphabet: {}",
        config.space.alphabet.iter().collect::<String>()
    );
    println!(
        "Length range: [{}, {}]",
        config.space.min_len, config.space.max_len
    );
    println!("Population: {}", config.population_size);
    println!("Iterations: {}", config.iterations);
    println!();

    let results = engine.run().expect("run failed");

    println!("Total iterations: {}", results.history.len());
    println!("Total evaluations: {}", results.summary["total_evals"]);

    if let Some((best, score)) = &results.best {
        println!();
        println!("Best score: {score:.4}");
        println!("Best sequence: {}", best.tokens);
        println!("Length: {}", best.len());
    }

    println!();
    println!("Convergence (best score per iteration):");
    for metrics in &results.history {
        println!(
            "  Iteration {}: best={:.4}, mean={:.4}",
            metrics.generation, metrics.best, metrics.mean
        );
    }
}
