//! Error types for the evaluation engine.

use thiserror::Error;

use crate::config::ConfigError;
use crate::splits::SplitError;

/// Boxed error raised by an evaluation strategy hook.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Errors that abort an evaluation.
///
/// Every failure aborts the whole `evaluate` call; no partial result is
/// ever produced.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// `evaluate` was called with no examples.
    #[error("cannot evaluate an empty example set")]
    EmptyInput,

    /// A generated split references an example that does not exist.
    #[error(
        "split {split} references example {index}, but only {example_count} examples were supplied"
    )]
    InvalidSplit {
        split: usize,
        index: usize,
        example_count: usize,
    },

    /// The split generator rejected its configuration.
    #[error("split generation failed: {0}")]
    SplitGeneration(#[from] SplitError),

    /// The per-split hook failed.
    #[error("evaluation of split {split} failed: {source}")]
    SplitEvaluation {
        split: usize,
        #[source]
        source: BoxError,
    },

    /// The combine hook failed, or there was nothing to combine.
    #[error("failed to aggregate {result_count} split results: {source}")]
    Aggregation {
        result_count: usize,
        #[source]
        source: BoxError,
    },

    /// The evaluator config describes an unusable setup.
    #[error("invalid evaluator config: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl EvaluationError {
    /// Returns true for errors caused by the inputs or setup rather than by
    /// the evaluation itself.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::InvalidSplit { .. }
                | Self::SplitGeneration(_)
                | Self::Config(_)
                | Self::WorkerPool(_)
        )
    }

    /// Returns true for failures of the strategy hooks.
    #[must_use]
    pub fn is_computation_error(&self) -> bool {
        !self.is_configuration_error()
    }
}
