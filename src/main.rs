//! seqopt CLI - Optimize sequences around a starting point.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use seqopt::{
    engine::{Engine, ParallelExecutor, RewardAggregator, strategy_from_config},
    rewards,
    schema::{EngineConfig, Method, SequenceSpace},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: {} <sequence> [options]", args[0]);
        eprintln!();
        eprintln!("Search for sequences scoring well on stability, solubility and");
        eprintln!("novelty against the given starting sequence.");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --method <name>      random | cem | ga | cmaes | cmaes-varlen (default: cmaes-varlen)");
        eprintln!("  --iterations <n>     Generations to run (default: 30)");
        eprintln!("  --population <n>     Candidates per generation (default: 64)");
        eprintln!("  --seed <n>           Random seed (default: entropy)");
        eprintln!("  --top <k>            Ranked candidates to print (default: 10)");
        eprintln!("  --baseline <seq>     Extra baseline for the novelty block (repeatable)");
        eprintln!("  --manifest <path>    Write a reproducibility manifest as JSON");
        std::process::exit(1);
    }

    let input = args[1].clone();
    if input.is_empty() {
        eprintln!("Error: starting sequence must be non-empty");
        std::process::exit(1);
    }

    let mut method = Method::CmaesVarlen;
    let mut iterations = 30usize;
    let mut population = 64usize;
    let mut seed = None;
    let mut top = 10usize;
    let mut baselines = vec![input.clone()];
    let mut manifest_path: Option<PathBuf> = None;

    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1).unwrap_or_else(|| {
            eprintln!("Error: {} requires a value", args[i]);
            std::process::exit(1);
        });
        match args[i].as_str() {
            "--method" => method = parse_or_exit(value, "method"),
            "--iterations" => iterations = parse_or_exit(value, "iterations"),
            "--population" => population = parse_or_exit(value, "population"),
            "--seed" => seed = Some(parse_or_exit(value, "seed")),
            "--top" => top = parse_or_exit(value, "top"),
            "--baseline" => baselines.push(value.clone()),
            "--manifest" => manifest_path = Some(PathBuf::from(value)),
            other => {
                eprintln!("Error: unknown option {other}");
                std::process::exit(1);
            }
        }
        i += 2;
    }

    let config = EngineConfig {
        method,
        iterations,
        population_size: population,
        seed,
        space: space_around(&input),
        ..Default::default()
    };

    let evaluator = RewardAggregator::new(vec![
        rewards::stability(1.0),
        rewards::solubility(0.5),
        rewards::novelty(baselines, 0.3),
    ]);

    let strategy = strategy_from_config(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let executor = Box::new(ParallelExecutor::new(evaluator));
    let mut engine = Engine::new(config.clone(), strategy, executor).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    println!("seqopt");
    println!("======");
    println!("Input:      {} ({} symbols)", input, input.chars().count());
    println!("Method:     {method}");
    println!(
        "Space:      {} symbols, lengths {}..={}",
        config.space.symbol_count(),
        config.space.min_len,
        config.space.max_len
    );
    println!("Budget:     {iterations} x {population} evaluations");
    println!();

    let start = Instant::now();
    let results = engine.run().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    println!("Top candidates:");
    for (rank, (candidate, score)) in results.top(top).iter().enumerate() {
        println!("  {:>2}. {:.4}  {}", rank + 1, score, candidate.tokens);
    }
    println!();
    for metrics in &results.history {
        println!(
            "  gen {:>3}: best={:.4} mean={:.4}",
            metrics.generation, metrics.best, metrics.mean
        );
    }
    println!();
    println!(
        "Evaluated {} candidates in {:.2}s",
        results.ranking.len(),
        elapsed.as_secs_f32()
    );

    if let Some(path) = manifest_path {
        let manifest = results.to_manifest(&config);
        if let Err(e) = manifest.save(&path) {
            eprintln!("Error writing manifest: {e}");
            std::process::exit(1);
        }
        println!("Manifest written to {}", path.display());
    }
}

/// Default protein alphabet extended with any unseen input symbols, with
/// length bounds bracketing the input length.
fn space_around(input: &str) -> SequenceSpace {
    let mut alphabet: BTreeSet<char> = "ACDEFGHIKLMNPQRSTVWY".chars().collect();
    alphabet.extend(input.chars());

    let len = input.chars().count();
    let min_len = (len.saturating_sub(len / 4)).max(1);
    let max_len = len + len / 4 + 1;

    SequenceSpace {
        alphabet: alphabet.into_iter().collect(),
        min_len,
        max_len,
    }
}

fn parse_or_exit<T: FromStr>(value: &str, name: &str) -> T
where
    T::Err: std::fmt::Display,
{
    value.parse().unwrap_or_else(|e| {
        eprintln!("Error parsing {name}: {e}");
        std::process::exit(1);
    })
}
