//! Configuration types for optimization runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Search strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Uniform random sampling.
    Random,
    /// Cross-entropy method.
    Cem,
    /// Genetic algorithm.
    Ga,
    /// CMA-ES over fixed-length sequences.
    Cmaes,
    /// CMA-ES over variable-length sequences.
    CmaesVarlen,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Random => "random",
            Method::Cem => "cem",
            Method::Ga => "ga",
            Method::Cmaes => "cmaes",
            Method::CmaesVarlen => "cmaes-varlen",
        };
        f.write_str(name)
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Method::Random),
            "cem" => Ok(Method::Cem),
            "ga" => Ok(Method::Ga),
            "cmaes" => Ok(Method::Cmaes),
            "cmaes-varlen" => Ok(Method::CmaesVarlen),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// Alphabet and length bounds shared by every strategy.
///
/// A candidate produced by `ask` always satisfies
/// `min_len <= len(tokens) <= max_len` with every symbol drawn from
/// `alphabet`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSpace {
    /// Distinct symbols candidates are built from.
    pub alphabet: Vec<char>,
    /// Minimum sequence length (inclusive, >= 1).
    pub min_len: usize,
    /// Maximum sequence length (inclusive).
    pub max_len: usize,
}

impl SequenceSpace {
    /// Create a validated sequence space.
    pub fn new(alphabet: &str, min_len: usize, max_len: usize) -> Result<Self, ConfigError> {
        let space = Self {
            alphabet: alphabet.chars().collect(),
            min_len,
            max_len,
        };
        space.validate()?;
        Ok(space)
    }

    /// Validate alphabet and length bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        for (i, symbol) in self.alphabet.iter().enumerate() {
            if self.alphabet[..i].contains(symbol) {
                return Err(ConfigError::DuplicateSymbol(*symbol));
            }
        }
        if self.min_len == 0 || self.min_len > self.max_len {
            return Err(ConfigError::InvalidLengthBounds {
                min_len: self.min_len,
                max_len: self.max_len,
            });
        }
        Ok(())
    }

    /// Number of distinct symbols.
    #[inline]
    pub fn symbol_count(&self) -> usize {
        self.alphabet.len()
    }

    /// Number of admissible lengths.
    #[inline]
    pub fn length_span(&self) -> usize {
        self.max_len - self.min_len + 1
    }
}

impl Default for SequenceSpace {
    fn default() -> Self {
        Self {
            alphabet: "ACDEFGHIKLMNPQRSTVWY".chars().collect(),
            min_len: 8,
            max_len: 32,
        }
    }
}

/// Cross-entropy method parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CemParams {
    /// Fraction of the working pool used to re-estimate the distribution.
    #[serde(default = "default_elite_fraction")]
    pub elite_fraction: f64,
    /// Exponential smoothing between the old and new distribution
    /// (1.0 keeps the old distribution, 0.0 replaces it).
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    /// Rolling cap on the accumulating working pool.
    #[serde(default = "default_pool_cap")]
    pub pool_cap: usize,
}

impl Default for CemParams {
    fn default() -> Self {
        Self {
            elite_fraction: default_elite_fraction(),
            smoothing: default_smoothing(),
            pool_cap: default_pool_cap(),
        }
    }
}

fn default_elite_fraction() -> f64 {
    0.2
}
fn default_smoothing() -> f64 {
    0.5
}
fn default_pool_cap() -> usize {
    4096
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaParams {
    /// Crossover probability per offspring (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Mutation probability per symbol (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Number of best individuals carried over unchanged.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
}

impl GaParams {
    /// Validate that both rates are probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        Ok(())
    }
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            elitism: default_elitism(),
        }
    }
}

fn default_crossover_rate() -> f64 {
    0.8
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_elitism() -> usize {
    2
}

/// CMA-ES parameters (shared by the fixed- and variable-length variants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmaesParams {
    /// Initial global step size (sigma).
    #[serde(default = "default_sigma0")]
    pub sigma0: f64,
}

impl Default for CmaesParams {
    fn default() -> Self {
        Self {
            sigma0: default_sigma0(),
        }
    }
}

fn default_sigma0() -> f64 {
    0.3
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Search strategy.
    pub method: Method,
    /// Number of generations to run.
    pub iterations: usize,
    /// Candidates asked for per generation.
    pub population_size: usize,
    /// Random seed. Fixed seed plus identical configuration and scoring
    /// components reproduces identical results.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Alphabet and length bounds.
    pub space: SequenceSpace,
    /// CEM-specific parameters.
    #[serde(default)]
    pub cem: CemParams,
    /// GA-specific parameters.
    #[serde(default)]
    pub ga: GaParams,
    /// CMA-ES-specific parameters.
    #[serde(default)]
    pub cmaes: CmaesParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            method: Method::Cem,
            iterations: 50,
            population_size: 200,
            seed: None,
            space: SequenceSpace::default(),
            cem: CemParams::default(),
            ga: GaParams::default(),
            cmaes: CmaesParams::default(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        if !(self.cmaes.sigma0 > 0.0) {
            return Err(ConfigError::InvalidSigma(self.cmaes.sigma0));
        }
        if !(0.0..=1.0).contains(&self.cem.elite_fraction) || self.cem.elite_fraction == 0.0 {
            return Err(ConfigError::InvalidEliteFraction(self.cem.elite_fraction));
        }
        self.ga.validate()?;
        self.space.validate()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("alphabet must be non-empty")]
    EmptyAlphabet,
    #[error("alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(char),
    #[error("invalid length bounds: min_len={min_len}, max_len={max_len}")]
    InvalidLengthBounds { min_len: usize, max_len: usize },
    #[error("iterations must be positive")]
    InvalidIterations,
    #[error("population size must be positive")]
    InvalidPopulationSize,
    #[error("sigma0 must be positive, got {0}")]
    InvalidSigma(f64),
    #[error("elite fraction must be in (0, 1], got {0}")]
    InvalidEliteFraction(f64),
    #[error("{name} must be in [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("unknown method {0:?}")]
    UnknownMethod(String),
}
