//! Error types for split generation.

use thiserror::Error;

/// Result type for split generation.
pub type Result<T> = std::result::Result<T, SplitError>;

/// Errors that a split generator can report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    /// Cross-validation needs at least two folds.
    #[error("invalid fold count {folds}: at least 2 folds are required")]
    InvalidFoldCount { folds: usize },

    /// At least one split must be requested.
    #[error("invalid split count {0}: at least 1 split is required")]
    InvalidSplitCount(usize),

    /// The training ratio must lie strictly between 0 and 1.
    #[error("invalid training ratio {0}: expected a value in (0, 1)")]
    InvalidRatio(f64),

    /// The example set is too small for the configured partitioning.
    #[error("{example_count} examples are not enough to {requirement}")]
    NotEnoughExamples {
        example_count: usize,
        requirement: String,
    },

    /// A thread panicked while holding the generator's random number generator.
    #[error("random number generator lock was poisoned")]
    RngPoisoned,
}
