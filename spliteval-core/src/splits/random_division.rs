//! Repeated random subsampling.

use super::{Result, SeededShuffler, Split, SplitError, SplitGenerator};

/// Generates `split_count` independent random train/validation divisions.
///
/// Each split shuffles the whole index range and assigns the first
/// `round(ratio * n)` indices to training and the rest to validation.
/// Unlike cross-validation, an example may be validated in several splits
/// or in none.
#[derive(Debug)]
pub struct RandomPermutationAndDivisionSplitGenerator {
    split_count: usize,
    ratio: f64,
    shuffler: SeededShuffler,
}

impl RandomPermutationAndDivisionSplitGenerator {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// - [`SplitError::InvalidSplitCount`] when `split_count == 0`
    /// - [`SplitError::InvalidRatio`] when `ratio` is not in `(0, 1)`
    pub fn new(split_count: usize, ratio: f64, seed: u64) -> Result<Self> {
        if split_count == 0 {
            return Err(SplitError::InvalidSplitCount(split_count));
        }
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(SplitError::InvalidRatio(ratio));
        }
        Ok(Self {
            split_count,
            ratio,
            shuffler: SeededShuffler::new(seed),
        })
    }

    /// Number of splits per call.
    pub fn split_count(&self) -> usize {
        self.split_count
    }

    /// Fraction of the examples assigned to training.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Seed the generator was created with.
    pub fn seed(&self) -> u64 {
        self.shuffler.seed()
    }

    fn training_size(&self, example_count: usize) -> usize {
        (self.ratio * example_count as f64).round() as usize
    }
}

impl SplitGenerator for RandomPermutationAndDivisionSplitGenerator {
    fn generate_splits(&self, example_count: usize) -> Result<Vec<Split>> {
        if example_count == 0 {
            return Ok(Vec::new());
        }

        let training_size = self.training_size(example_count);
        if training_size == 0 || training_size >= example_count {
            return Err(SplitError::NotEnoughExamples {
                example_count,
                requirement: format!(
                    "divide at ratio {} into non-empty training and validation sets",
                    self.ratio
                ),
            });
        }

        let splits = self
            .shuffler
            .permutations(self.split_count, example_count)?
            .into_iter()
            .map(|permutation| {
                let (training, validation) = permutation.split_at(training_size);
                let mut training = training.to_vec();
                let mut validation = validation.to_vec();
                training.sort_unstable();
                validation.sort_unstable();
                Split::new(training, validation)
            })
            .collect();

        Ok(splits)
    }

    fn name(&self) -> &str {
        "random_division"
    }
}
