//! Leave-one-out partitioning.

use super::{Result, Split, SplitGenerator};

/// Deterministic generator with one split per example.
///
/// Split `i` validates on example `i` and trains on every other example.
///
/// Every split owns its own training list of `n - 1` indices, so generating
/// splits for `n` examples allocates `n * (n - 1)` indices in total.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveOneOutSplitGenerator;

impl SplitGenerator for LeaveOneOutSplitGenerator {
    fn generate_splits(&self, example_count: usize) -> Result<Vec<Split>> {
        Ok((0..example_count)
            .map(|held_out| {
                let training = (0..example_count).filter(|&i| i != held_out).collect();
                Split::new(training, vec![held_out])
            })
            .collect())
    }

    fn name(&self) -> &str {
        "leave_one_out"
    }
}
