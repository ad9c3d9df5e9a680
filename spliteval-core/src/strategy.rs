//! Evaluation strategy port.
//!
//! A strategy supplies the domain-specific half of an evaluation: how to
//! score a learner on one split, and how to combine the per-split scores.
//! The [`Evaluator`](crate::Evaluator) owns everything else.

use std::marker::PhantomData;

use crate::error::BoxError;
use crate::measures::Reduction;
use crate::splits::Split;

/// The two hooks of a split-based evaluation.
///
/// # Contract
///
/// - [`evaluate_on_split`](Self::evaluate_on_split) must depend only on its
///   inputs and must be safe to call concurrently for different splits.
/// - [`average_results`](Self::average_results) must accept any non-empty
///   sequence and must not depend on its order; results arrive in no
///   particular order.
///
/// # Examples
///
/// ```
/// use spliteval_core::{Average, BoxError, EvaluationStrategy, Split};
///
/// struct MeanOfValidation;
///
/// impl EvaluationStrategy for MeanOfValidation {
///     type Example = f64;
///     type Output = f64;
///     type Error = BoxError;
///
///     fn evaluate_on_split(&self, examples: &[f64], split: &Split) -> Result<f64, BoxError> {
///         let values: Vec<f64> = split.validation().iter().map(|&i| examples[i]).collect();
///         Ok(f64::average(&values)?)
///     }
///
///     fn average_results(&self, results: Vec<f64>) -> Result<f64, BoxError> {
///         Ok(f64::average(&results)?)
///     }
/// }
/// ```
pub trait EvaluationStrategy: Send + Sync {
    /// One data point submitted for evaluation.
    type Example: Sync;

    /// Result of evaluating one split, and of the whole evaluation.
    type Output: Send;

    /// Failure raised by either hook.
    type Error: Into<BoxError>;

    /// Evaluate the learner on one split of the examples.
    fn evaluate_on_split(
        &self,
        examples: &[Self::Example],
        split: &Split,
    ) -> Result<Self::Output, Self::Error>;

    /// Combine the results of all splits into one.
    fn average_results(&self, results: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;
}

/// Strategy that scores each split with a closure and reduces the scores.
///
/// Covers the common case of a scalar metric (accuracy, RMSE, ...) combined
/// with one of the built-in [`Reduction`]s.
pub struct MetricStrategy<E, F> {
    metric: F,
    reduction: Reduction,
    _example: PhantomData<fn(&E)>,
}

impl<E, F, Err> MetricStrategy<E, F>
where
    F: Fn(&[E], &Split) -> Result<f64, Err>,
{
    /// Create a strategy that averages the metric across splits.
    pub fn new(metric: F) -> Self {
        Self::with_reduction(metric, Reduction::Mean)
    }

    /// Create a strategy with an explicit reduction.
    pub fn with_reduction(metric: F, reduction: Reduction) -> Self {
        Self {
            metric,
            reduction,
            _example: PhantomData,
        }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }
}

impl<E, F, Err> EvaluationStrategy for MetricStrategy<E, F>
where
    E: Sync,
    F: Fn(&[E], &Split) -> Result<f64, Err> + Send + Sync,
    Err: Into<BoxError>,
{
    type Example = E;
    type Output = f64;
    type Error = BoxError;

    fn evaluate_on_split(&self, examples: &[E], split: &Split) -> Result<f64, BoxError> {
        (self.metric)(examples, split).map_err(Into::into)
    }

    fn average_results(&self, results: Vec<f64>) -> Result<f64, BoxError> {
        Ok(self.reduction.apply(&results)?)
    }
}
