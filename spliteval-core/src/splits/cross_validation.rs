//! Shuffled k-fold cross-validation.

use super::{Result, SeededShuffler, Split, SplitError, SplitGenerator};

/// Splits examples into `folds` folds after a seeded shuffle.
///
/// Fold sizes differ by at most one. Split `i` validates on fold `i` and
/// trains on all other folds, so every example is validated exactly once
/// per call.
#[derive(Debug)]
pub struct CrossValidationSplitGenerator {
    folds: usize,
    shuffler: SeededShuffler,
}

impl CrossValidationSplitGenerator {
    /// Create a generator with the given fold count and seed.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidFoldCount`] when `folds < 2`.
    pub fn new(folds: usize, seed: u64) -> Result<Self> {
        if folds < 2 {
            return Err(SplitError::InvalidFoldCount { folds });
        }
        Ok(Self {
            folds,
            shuffler: SeededShuffler::new(seed),
        })
    }

    /// Number of folds (and therefore splits) per call.
    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Seed the generator was created with.
    pub fn seed(&self) -> u64 {
        self.shuffler.seed()
    }
}

impl SplitGenerator for CrossValidationSplitGenerator {
    fn generate_splits(&self, example_count: usize) -> Result<Vec<Split>> {
        if example_count == 0 {
            return Ok(Vec::new());
        }
        if example_count < self.folds {
            return Err(SplitError::NotEnoughExamples {
                example_count,
                requirement: format!("fill {} folds", self.folds),
            });
        }

        let permutation = self.shuffler.permutation(example_count)?;
        let base = example_count / self.folds;
        let remainder = example_count % self.folds;

        let mut bounds = Vec::with_capacity(self.folds);
        let mut start = 0;
        for fold in 0..self.folds {
            let size = base + usize::from(fold < remainder);
            bounds.push((start, start + size));
            start += size;
        }

        let splits = bounds
            .iter()
            .map(|&(start, end)| {
                let mut validation = permutation[start..end].to_vec();
                let mut training: Vec<usize> = permutation[..start]
                    .iter()
                    .chain(permutation[end..].iter())
                    .copied()
                    .collect();
                validation.sort_unstable();
                training.sort_unstable();
                Split::new(training, validation)
            })
            .collect();

        Ok(splits)
    }

    fn name(&self) -> &str {
        "cross_validation"
    }
}
