//! seqopt - Population-based optimization over discrete sequences.
//!
//! This crate searches spaces of token sequences (protein or nucleotide
//! strings, or any finite alphabet) by repeatedly asking a strategy for
//! a batch of candidates, scoring them through a reward pipeline and
//! telling the scores back so the strategy can adapt.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `schema`: Configuration, candidates and result types
//! - `engine`: Strategies (random, CEM, GA, CMA-ES), executors and the
//!   generation loop
//! - `rewards`: Built-in reward blocks and the custom-closure factory
//!
//! # Example
//!
//! ```rust,no_run
//! use seqopt::{
//!     engine::{Engine, LocalExecutor, RewardAggregator, strategy_from_config},
//!     rewards,
//!     schema::{EngineConfig, Method, SequenceSpace},
//! };
//!
//! // Configure a variable-length CMA-ES run over short peptides
//! let config = EngineConfig {
//!     method: Method::CmaesVarlen,
//!     iterations: 30,
//!     population_size: 64,
//!     seed: Some(42),
//!     space: SequenceSpace::new("ACDEFGHIKLMNPQRSTVWY", 8, 24).unwrap(),
//!     ..Default::default()
//! };
//!
//! // Score candidates with weighted reward blocks
//! let evaluator = RewardAggregator::new(vec![
//!     rewards::stability(1.0),
//!     rewards::solubility(0.5),
//! ]);
//!
//! let strategy = strategy_from_config(&config).unwrap();
//! let executor = Box::new(LocalExecutor::new(evaluator));
//! let mut engine = Engine::new(config, strategy, executor).unwrap();
//!
//! let results = engine.run().unwrap();
//! if let Some((candidate, score)) = &results.best {
//!     println!("best {} scored {score:.4}", candidate.tokens);
//! }
//! ```

pub mod engine;
pub mod rewards;
pub mod schema;

// Re-export commonly used types
pub use engine::{Engine, EnginePhase, LocalExecutor, ParallelExecutor, RewardAggregator};
pub use schema::{Candidate, EngineConfig, Method, Results, SequenceSpace};
