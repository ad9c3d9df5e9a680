//! Caller-provided splits.

use super::{Result, Split, SplitGenerator};

/// Replays a fixed list of splits regardless of the example count.
///
/// Useful for hand-built partitions such as a predefined test set. The
/// splits are not checked against the example count here; the evaluator's
/// split validation catches out-of-range indices.
#[derive(Debug, Clone, Default)]
pub struct FixedSplitGenerator {
    splits: Vec<Split>,
}

impl FixedSplitGenerator {
    pub fn new(splits: Vec<Split>) -> Self {
        Self { splits }
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }
}

impl SplitGenerator for FixedSplitGenerator {
    fn generate_splits(&self, example_count: usize) -> Result<Vec<Split>> {
        if example_count == 0 {
            return Ok(Vec::new());
        }
        Ok(self.splits.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
