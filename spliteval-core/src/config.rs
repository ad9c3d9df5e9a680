//! Configuration for evaluators and split generators.
//!
//! Configuration is plain serde data so it can be embedded in a larger
//! application config or loaded on its own from TOML:
//!
//! ```toml
//! [evaluator]
//! workers = 4
//! validate_splits = true
//!
//! [splits]
//! kind = "cross_validation"
//! folds = 5
//! seed = 42
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::splits::{
    CrossValidationSplitGenerator, LeaveOneOutSplitGenerator,
    RandomPermutationAndDivisionSplitGenerator, SplitError, SplitGenerator,
};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but describes an unusable setup.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the evaluator's worker pool and checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Number of worker threads; `None` uses the available parallelism and
    /// `1` evaluates every split inline on the calling thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Check every split index against the example count before dispatch.
    #[serde(default = "default_true")]
    pub validate_splits: bool,

    /// Prefix for worker thread names.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_true() -> bool {
    true
}

fn default_thread_name() -> String {
    "spliteval-worker".to_string()
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            workers: None,
            validate_splits: true,
            thread_name: default_thread_name(),
        }
    }
}

impl EvaluatorConfig {
    /// Create a config that evaluates every split on the calling thread.
    pub fn sequential() -> Self {
        Self::default().with_workers(1)
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Enable or disable split index validation.
    pub fn with_split_validation(mut self, enabled: bool) -> Self {
        self.validate_splits = enabled;
        self
    }

    /// Set the worker thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Number of workers the evaluator will actually use.
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
    }

    /// Check the config for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `workers` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid(
                "evaluator.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which split generator to build, and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitConfig {
    /// Shuffled k-fold cross-validation
    CrossValidation {
        folds: usize,
        #[serde(default)]
        seed: u64,
    },
    /// Repeated random subsampling
    RandomDivision {
        splits: usize,
        ratio: f64,
        #[serde(default)]
        seed: u64,
    },
    /// One held-out example per split
    LeaveOneOut,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::CrossValidation { folds: 5, seed: 0 }
    }
}

impl SplitConfig {
    /// Convert to config string representation.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CrossValidation { .. } => "cross_validation",
            Self::RandomDivision { .. } => "random_division",
            Self::LeaveOneOut => "leave_one_out",
        }
    }

    /// Build the configured split generator.
    ///
    /// # Errors
    ///
    /// Returns the generator's [`SplitError`] when the parameters are invalid.
    pub fn build(&self) -> Result<Arc<dyn SplitGenerator>, SplitError> {
        let generator: Arc<dyn SplitGenerator> = match *self {
            Self::CrossValidation { folds, seed } => {
                Arc::new(CrossValidationSplitGenerator::new(folds, seed)?)
            }
            Self::RandomDivision {
                splits,
                ratio,
                seed,
            } => Arc::new(RandomPermutationAndDivisionSplitGenerator::new(
                splits, ratio, seed,
            )?),
            Self::LeaveOneOut => Arc::new(LeaveOneOutSplitGenerator),
        };
        Ok(generator)
    }
}

/// Complete configuration of one evaluation setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    #[serde(default)]
    pub splits: SplitConfig,
}

impl EvaluationConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            splits = config.splits.kind(),
            workers = ?config.evaluator.workers,
            "Evaluation config loaded"
        );
        Ok(config)
    }

    /// Check the config, including that the split generator can be built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.evaluator.validate()?;
        self.splits
            .build()
            .map_err(|e| ConfigError::Invalid(format!("splits: {e}")))?;
        Ok(())
    }
}
