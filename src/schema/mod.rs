//! Data model: candidates, configuration and results.

mod candidate;
mod config;
mod results;

pub use candidate::{Candidate, ScoringContext};
pub use config::{
    CemParams, CmaesParams, ConfigError, EngineConfig, GaParams, Method, SequenceSpace,
};
pub use results::{Manifest, Metrics, Results};
