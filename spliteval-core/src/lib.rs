//! Split-based learner evaluation for spliteval.
//!
//! This crate measures how well a learner performs by splitting a set of
//! examples into sub-experiments, evaluating each split independently and
//! in parallel, and combining the per-split results into one figure of
//! merit.
//!
//! # Architecture
//!
//! - **Splits** ([`SplitGenerator`]) decide how the examples are partitioned
//!   into training and validation roles
//! - **Strategies** ([`EvaluationStrategy`]) score one split and combine
//!   the scores of all splits
//! - **The evaluator** ([`Evaluator`]) owns the protocol: generate splits,
//!   fan out, join, aggregate once
//!
//! ```
//! use std::sync::Arc;
//!
//! use spliteval_core::{Evaluator, LeaveOneOutSplitGenerator, MetricStrategy, Split};
//!
//! let strategy = MetricStrategy::new(|examples: &[i32], split: &Split| {
//!     let held_out = split.validation()[0];
//!     Ok::<_, std::convert::Infallible>(f64::from(examples[held_out]))
//! });
//! let evaluator = Evaluator::new(strategy, Arc::new(LeaveOneOutSplitGenerator)).unwrap();
//!
//! assert_eq!(evaluator.evaluate(&[2, 4, 6, 8]).unwrap(), 5.0);
//! ```

mod config;
mod error;
mod evaluator;
mod measures;
pub mod splits;
mod strategy;
mod types;

// Engine
pub use evaluator::Evaluator;

// Strategy port
pub use strategy::{EvaluationStrategy, MetricStrategy};

// Split types (re-export from splits module)
pub use splits::{
    CrossValidationSplitGenerator, FixedSplitGenerator, LeaveOneOutSplitGenerator,
    RandomPermutationAndDivisionSplitGenerator, Split, SplitError, SplitGenerator,
};

// Result types
pub use measures::{Average, AverageError, PerformanceMeasure, PerformanceResult, Reduction};

// Configuration
pub use config::{ConfigError, EvaluationConfig, EvaluatorConfig, SplitConfig};

// Errors
pub use error::{BoxError, EvaluationError, Result};

// ID types
pub use types::EvaluationId;
