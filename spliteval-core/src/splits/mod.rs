//! Split descriptors and the generators that produce them.
//!
//! A [`Split`] partitions the index range of an example set into a training
//! role and a validation role. A [`SplitGenerator`] turns an example count
//! into the ordered list of splits that one evaluation runs over.
//!
//! Generators shipped here:
//! - [`CrossValidationSplitGenerator`] - shuffled k-fold partitioning
//! - [`RandomPermutationAndDivisionSplitGenerator`] - repeated random subsampling
//! - [`LeaveOneOutSplitGenerator`] - one validation example per split
//! - [`FixedSplitGenerator`] - replays a caller-provided list

mod cross_validation;
mod error;
mod fixed;
mod leave_one_out;
mod random_division;

pub use cross_validation::CrossValidationSplitGenerator;
pub use error::{Result, SplitError};
pub use fixed::FixedSplitGenerator;
pub use leave_one_out::LeaveOneOutSplitGenerator;
pub use random_division::RandomPermutationAndDivisionSplitGenerator;

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One partition of an example set into training and validation indices.
///
/// Indices refer to positions in the example slice handed to
/// [`Evaluator::evaluate`](crate::Evaluator::evaluate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Indices of the examples used for training.
    pub training: Vec<usize>,
    /// Indices of the examples used for validation.
    pub validation: Vec<usize>,
}

impl Split {
    /// Create a split from its training and validation indices.
    #[must_use]
    pub fn new(training: Vec<usize>, validation: Vec<usize>) -> Self {
        Self {
            training,
            validation,
        }
    }

    /// Create a split that only validates (no training role).
    #[must_use]
    pub fn validation_only(validation: Vec<usize>) -> Self {
        Self::new(Vec::new(), validation)
    }

    /// Indices of the examples used for training.
    pub fn training(&self) -> &[usize] {
        &self.training
    }

    /// Indices of the examples used for validation.
    pub fn validation(&self) -> &[usize] {
        &self.validation
    }

    /// Iterate over every index referenced by the split, training first.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.training.iter().chain(self.validation.iter()).copied()
    }

    /// Total number of indices referenced by the split.
    #[must_use]
    pub fn len(&self) -> usize {
        self.training.len() + self.validation.len()
    }

    /// Returns true if the split references no example at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.training.is_empty() && self.validation.is_empty()
    }

    /// First index that is not valid for an example set of the given size.
    #[must_use]
    pub fn first_out_of_range(&self, example_count: usize) -> Option<usize> {
        self.indices().find(|&index| index >= example_count)
    }
}

/// Produces the splits that one evaluation runs over.
///
/// Called exactly once per [`Evaluator::evaluate`](crate::Evaluator::evaluate)
/// with the size of the example set.
///
/// # Contract
///
/// - Returns an empty list only when `example_count == 0`.
/// - For `example_count > 0`, returns at least one split, and every index
///   of every split lies in `0..example_count`.
/// - Generators that cannot honour their configuration for the given
///   count return a [`SplitError`] instead.
///
/// Stochastic generators may return different splits on each call.
pub trait SplitGenerator: Send + Sync {
    /// Generate the splits for an example set of `example_count` examples.
    fn generate_splits(&self, example_count: usize) -> Result<Vec<Split>>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Seeded random source shared by the stochastic generators.
///
/// The generator advances across calls, so consecutive evaluations draw
/// fresh splits while a fixed seed keeps the whole sequence reproducible.
#[derive(Debug)]
pub(crate) struct SeededShuffler {
    seed: u64,
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub(crate) fn seed(&self) -> u64 {
        self.seed
    }

    /// Return `0..count` in a random order.
    pub(crate) fn permutation(&self, count: usize) -> Result<Vec<usize>> {
        let mut indices: Vec<usize> = (0..count).collect();
        let mut rng = self.rng.lock().map_err(|_| SplitError::RngPoisoned)?;
        indices.shuffle(&mut *rng);
        Ok(indices)
    }

    /// Produce `count` independent permutations under a single lock.
    pub(crate) fn permutations(&self, count: usize, length: usize) -> Result<Vec<Vec<usize>>> {
        let mut rng = self.rng.lock().map_err(|_| SplitError::RngPoisoned)?;
        Ok((0..count)
            .map(|_| {
                let mut indices: Vec<usize> = (0..length).collect();
                indices.shuffle(&mut *rng);
                indices
            })
            .collect())
    }
}
