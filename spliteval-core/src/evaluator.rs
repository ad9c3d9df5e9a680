//! Split-based evaluation engine.
//!
//! [`Evaluator`] coordinates one evaluation: it asks the split generator for
//! splits, fans the per-split work out over a worker pool, waits for every
//! split, and hands the collected results to the strategy's combine hook.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::config::{EvaluationConfig, EvaluatorConfig};
use crate::error::{BoxError, EvaluationError, Result};
use crate::splits::{Split, SplitGenerator};
use crate::strategy::EvaluationStrategy;
use crate::types::EvaluationId;

/// Evaluates a learner by splitting the examples and averaging per-split
/// results.
///
/// The evaluator is the only component that knows about concurrency. Each
/// split is evaluated exactly once, independently of the others; results
/// are collected through the pool's join, so no task shares mutable state
/// with another. Aggregation runs once, after every split has finished.
pub struct Evaluator<S> {
    strategy: S,
    split_generator: Arc<dyn SplitGenerator>,
    config: EvaluatorConfig,
    pool: Option<ThreadPool>,
}

impl<S: EvaluationStrategy> Evaluator<S> {
    /// Create an evaluator with the default config.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::WorkerPool`] if the worker threads cannot
    /// be spawned.
    pub fn new(strategy: S, split_generator: Arc<dyn SplitGenerator>) -> Result<Self> {
        Self::with_config(strategy, split_generator, EvaluatorConfig::default())
    }

    /// Create an evaluator with an explicit config.
    ///
    /// A worker count of one evaluates splits inline on the calling thread;
    /// anything larger gets a dedicated pool.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Config`] if the config is invalid, or
    /// [`EvaluationError::WorkerPool`] if the worker threads cannot be
    /// spawned.
    pub fn with_config(
        strategy: S,
        split_generator: Arc<dyn SplitGenerator>,
        config: EvaluatorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let workers = config.effective_workers();
        let pool = if workers > 1 {
            let prefix = config.thread_name.clone();
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(move |i| format!("{prefix}-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        debug!(
            workers,
            splits = split_generator.name(),
            validate_splits = config.validate_splits,
            "Evaluator created"
        );

        Ok(Self {
            strategy,
            split_generator,
            config,
            pool,
        })
    }

    /// Create an evaluator from a loaded [`EvaluationConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::SplitGeneration`] if the split generator
    /// cannot be built, or [`EvaluationError::WorkerPool`].
    pub fn from_config(strategy: S, config: &EvaluationConfig) -> Result<Self> {
        let split_generator = config.splits.build()?;
        Self::with_config(strategy, split_generator, config.evaluator.clone())
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Number of workers splits are spread over.
    pub fn workers(&self) -> usize {
        self.pool
            .as_ref()
            .map_or(1, ThreadPool::current_num_threads)
    }

    /// Evaluate the learner on `examples`.
    ///
    /// Blocks until every split has been evaluated and the results combined.
    ///
    /// # Errors
    ///
    /// - [`EvaluationError::EmptyInput`] if `examples` is empty
    /// - [`EvaluationError::SplitGeneration`] if the generator fails
    /// - [`EvaluationError::InvalidSplit`] if a split references a missing example
    /// - [`EvaluationError::SplitEvaluation`] if any split fails
    /// - [`EvaluationError::Aggregation`] if combining fails or no split was generated
    pub fn evaluate(&self, examples: &[S::Example]) -> Result<S::Output> {
        if examples.is_empty() {
            return Err(EvaluationError::EmptyInput);
        }

        let id = EvaluationId::new();
        let span = tracing::info_span!("evaluate", run = %id, examples = examples.len());
        let _entered = span.enter();
        let started = Instant::now();

        let splits = self.split_generator.generate_splits(examples.len())?;
        debug!(
            generator = self.split_generator.name(),
            splits = splits.len(),
            "Splits generated"
        );

        if self.config.validate_splits {
            validate_splits(&splits, examples.len())?;
        }

        if splits.is_empty() {
            warn!("Split generator produced no splits");
            return Err(EvaluationError::Aggregation {
                result_count: 0,
                source: format!(
                    "split generator '{}' produced no splits for {} examples",
                    self.split_generator.name(),
                    examples.len()
                )
                .into(),
            });
        }

        let results = self.evaluate_splits(examples, &splits, &span)?;
        debug_assert_eq!(results.len(), splits.len());

        let result_count = results.len();
        let output = self.strategy.average_results(results).map_err(|e| {
            let source: BoxError = e.into();
            warn!(result_count, error = %source, "Aggregation failed");
            EvaluationError::Aggregation {
                result_count,
                source,
            }
        })?;

        info!(
            splits = result_count,
            elapsed = ?started.elapsed(),
            "Evaluation complete"
        );
        Ok(output)
    }

    fn evaluate_splits(
        &self,
        examples: &[S::Example],
        splits: &[Split],
        span: &tracing::Span,
    ) -> Result<Vec<S::Output>> {
        let task = |(index, split): (usize, &Split)| {
            let _entered = tracing::trace_span!(parent: span, "split", index).entered();
            self.strategy
                .evaluate_on_split(examples, split)
                .map_err(|e| {
                    let source: BoxError = e.into();
                    warn!(split = index, error = %source, "Split evaluation failed");
                    EvaluationError::SplitEvaluation {
                        split: index,
                        source,
                    }
                })
        };

        match &self.pool {
            Some(pool) => {
                debug!(
                    workers = pool.current_num_threads(),
                    "Dispatching splits to worker pool"
                );
                pool.install(|| splits.par_iter().enumerate().map(task).collect())
            }
            None => splits.iter().enumerate().map(task).collect(),
        }
    }
}

/// Check that every index of every split is valid for `example_count`.
fn validate_splits(splits: &[Split], example_count: usize) -> Result<()> {
    for (split, descriptor) in splits.iter().enumerate() {
        if let Some(index) = descriptor.first_out_of_range(example_count) {
            warn!(split, index, example_count, "Split references a missing example");
            return Err(EvaluationError::InvalidSplit {
                split,
                index,
                example_count,
            });
        }
    }
    Ok(())
}
