//! Core type definitions for the evaluation engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one `evaluate` call.
///
/// Attached to the tracing span of the call so that the log lines of
/// concurrent evaluations can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub Uuid);

impl EvaluationId {
    /// Create a new evaluation ID with a UUIDv7 (time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
