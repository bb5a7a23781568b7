//! Optimization engine: ask-tell strategies, reward aggregation and
//! batch execution.
//!
//! # Overview
//!
//! The engine consists of:
//!
//! - **Strategies** (`strategies`): ask-tell search policies (random, CEM,
//!   GA, fixed- and variable-length CMA-ES)
//! - **Evaluator** (`evaluator`): combines weighted reward blocks into one
//!   scalar per candidate
//! - **Executors** (`executor`): run the evaluator over a batch,
//!   sequentially or across a rayon worker pool
//! - **Search loop** (`search`): the generation loop tying the pieces
//!   together and recording history
//!
//! # Example
//!
//! ```rust,no_run
//! use seqopt::engine::{Engine, LocalExecutor, RewardAggregator, strategy_from_config};
//! use seqopt::rewards;
//! use seqopt::schema::{EngineConfig, Method, SequenceSpace};
//!
//! let config = EngineConfig {
//!     method: Method::CmaesVarlen,
//!     iterations: 8,
//!     population_size: 32,
//!     seed: Some(42),
//!     space: SequenceSpace::new("ACDEFGHIKLMNPQRSTVWY", 8, 25).unwrap(),
//!     ..Default::default()
//! };
//!
//! let strategy = strategy_from_config(&config).unwrap();
//! let evaluator = RewardAggregator::new(vec![
//!     rewards::stability(1.0),
//!     rewards::gc_content(0.5, 0.1, 0.5),
//! ]);
//! let executor = Box::new(LocalExecutor::new(evaluator));
//!
//! let mut engine = Engine::new(config, strategy, executor).unwrap();
//! let results = engine.run().unwrap();
//! println!("best: {:?}", results.best);
//! ```

mod evaluator;
mod executor;
mod search;
pub mod strategies;

pub use evaluator::{Reward, RewardAggregator};
pub use executor::{Executor, LocalExecutor, ParallelExecutor};
pub use search::{Engine, EnginePhase};
pub use strategies::{Evaluated, Strategy, strategy_from_config};

use crate::schema::ConfigError;

/// A candidate evaluation failed. The enclosing run aborts instead of
/// substituting a default score, which would bias the strategy update.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvaluationError {
    #[error("scoring component {name:?} failed: {message}")]
    Component { name: String, message: String },
    #[error("scoring component {name:?} returned a non-finite score")]
    NonFinite { name: String },
}

/// Ask-tell protocol violations. A rejected call leaves the strategy's
/// internal state unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StrategyError {
    #[error("ask requires at least one candidate")]
    EmptyAsk,
    #[error("tell called with no items")]
    EmptyTell,
    #[error("candidate {id} was not produced by the preceding ask")]
    UnknownCandidate { id: u64 },
    #[error("candidate {id} violates the sequence space bounds")]
    ShapeViolation { id: u64 },
}

/// Umbrella error for engine runs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("strategy protocol violation: {0}")]
    Strategy(#[from] StrategyError),
}
