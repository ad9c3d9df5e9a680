//! Result types and order-insensitive reductions for split results.
//!
//! The evaluator makes no promise about the order in which split results
//! arrive, so every reduction here treats its input as a multiset.
//! Floating-point inputs are sorted before summation, which makes the
//! reductions reproducible bit for bit regardless of completion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while combining split results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AverageError {
    /// Nothing to combine.
    #[error("cannot average an empty set of results")]
    Empty,

    /// The measures to combine carry no samples between them.
    #[error("cannot average performance measures with zero total samples")]
    NoSamples,

    /// Performance results disagree on which measures they contain.
    #[error("mismatched measures: expected {expected:?}, found {found:?}")]
    MismatchedMeasures {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Values that can be combined into a single representative value.
///
/// Implementations must not depend on the order of `items`.
pub trait Average: Sized {
    /// Combine a non-empty slice of values.
    ///
    /// # Errors
    ///
    /// Returns [`AverageError::Empty`] for an empty slice, or a
    /// type-specific error when the values cannot be combined.
    fn average(items: &[Self]) -> Result<Self, AverageError>;
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

fn sorted_sum(values: &[f64]) -> f64 {
    sorted(values).into_iter().sum()
}

impl Average for f64 {
    /// Unweighted arithmetic mean.
    fn average(items: &[Self]) -> Result<Self, AverageError> {
        if items.is_empty() {
            return Err(AverageError::Empty);
        }
        Ok(sorted_sum(items) / items.len() as f64)
    }
}

/// How a bag of scalar results is reduced to one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Sum of all values
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// 50th percentile (midpoint of the two middle values for even counts)
    Median,
}

impl Reduction {
    /// Reduce `values` to a single number.
    ///
    /// # Errors
    ///
    /// Returns [`AverageError::Empty`] when `values` is empty.
    pub fn apply(&self, values: &[f64]) -> Result<f64, AverageError> {
        if values.is_empty() {
            return Err(AverageError::Empty);
        }
        let sorted = sorted(values);
        let reduced = match self {
            Self::Mean => f64::average(values)?,
            Self::Sum => sorted.iter().sum::<f64>(),
            Self::Min => sorted[0],
            Self::Max => sorted[sorted.len() - 1],
            Self::Median => {
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
        };
        Ok(reduced)
    }
}

/// Summary statistics of a performance measure over a number of samples.
///
/// `std_dev` is the population standard deviation of the samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMeasure {
    pub mean: f64,
    pub sample_count: usize,
    pub std_dev: f64,
}

impl PerformanceMeasure {
    /// A measure made of a single sample.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            mean: value,
            sample_count: 1,
            std_dev: 0.0,
        }
    }

    /// Summarise a set of samples.
    ///
    /// # Errors
    ///
    /// Returns [`AverageError::Empty`] when `samples` is empty.
    pub fn from_samples(samples: &[f64]) -> Result<Self, AverageError> {
        let mean = f64::average(samples)?;
        let deviations: Vec<f64> = samples.iter().map(|x| (x - mean) * (x - mean)).collect();
        let variance = sorted_sum(&deviations) / samples.len() as f64;
        Ok(Self {
            mean,
            sample_count: samples.len(),
            std_dev: variance.sqrt(),
        })
    }

    /// Variance of the samples (square of `std_dev`).
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

impl Average for PerformanceMeasure {
    /// Pool the measures as if their samples had been summarised together.
    ///
    /// Means are weighted by sample count; the variance is the mean of the
    /// within-measure variances plus the spread of the means around the
    /// pooled mean.
    fn average(items: &[Self]) -> Result<Self, AverageError> {
        if items.is_empty() {
            return Err(AverageError::Empty);
        }

        let mut items = items.to_vec();
        items.sort_by(|a, b| {
            a.mean
                .total_cmp(&b.mean)
                .then(a.sample_count.cmp(&b.sample_count))
                .then(a.std_dev.total_cmp(&b.std_dev))
        });

        let sample_count: usize = items.iter().map(|m| m.sample_count).sum();
        if sample_count == 0 {
            return Err(AverageError::NoSamples);
        }
        let total = sample_count as f64;

        let mean = items
            .iter()
            .map(|m| m.mean * m.sample_count as f64)
            .sum::<f64>()
            / total;

        let squared_deviations = items
            .iter()
            .map(|m| {
                let n = m.sample_count as f64;
                let offset = m.mean - mean;
                n * m.variance() + n * offset * offset
            })
            .sum::<f64>();

        Ok(Self {
            mean,
            sample_count,
            std_dev: (squared_deviations / total).sqrt(),
        })
    }
}

/// A set of named performance measures, e.g. `accuracy` and `recall`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceResult {
    measures: BTreeMap<String, PerformanceMeasure>,
}

impl PerformanceResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a measure, returning the updated result.
    #[must_use]
    pub fn with_measure(mut self, name: impl Into<String>, measure: PerformanceMeasure) -> Self {
        self.insert(name, measure);
        self
    }

    /// Insert or replace a measure.
    pub fn insert(&mut self, name: impl Into<String>, measure: PerformanceMeasure) {
        self.measures.insert(name.into(), measure);
    }

    pub fn get(&self, name: &str) -> Option<&PerformanceMeasure> {
        self.measures.get(name)
    }

    /// Measure names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.measures.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PerformanceMeasure)> {
        self.measures.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}

impl FromIterator<(String, PerformanceMeasure)> for PerformanceResult {
    fn from_iter<I: IntoIterator<Item = (String, PerformanceMeasure)>>(iter: I) -> Self {
        Self {
            measures: iter.into_iter().collect(),
        }
    }
}

impl Average for PerformanceResult {
    /// Average each named measure across all results.
    ///
    /// Every result must carry exactly the same measure names.
    fn average(items: &[Self]) -> Result<Self, AverageError> {
        let first = items.first().ok_or(AverageError::Empty)?;
        let expected: Vec<String> = first.measures.keys().cloned().collect();

        for result in &items[1..] {
            if !result.measures.keys().eq(first.measures.keys()) {
                return Err(AverageError::MismatchedMeasures {
                    expected,
                    found: result.measures.keys().cloned().collect(),
                });
            }
        }

        expected
            .into_iter()
            .map(|name| {
                let column: Vec<PerformanceMeasure> =
                    items.iter().map(|result| result.measures[&name]).collect();
                PerformanceMeasure::average(&column).map(|measure| (name, measure))
            })
            .collect()
    }
}
