//! Configuration and error types for result grouping.
//!
//! This module defines the public configuration surface for the grouping
//! engine. It performs no I/O and reads no environment, so a grouping call is
//! a pure function of `(items, blacklist, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Similarity at or above which two embeddings are considered the same entity.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

/// What to do when two embeddings of different length are compared.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Fail the whole call with [`GroupingError::DimensionMismatch`].
    #[default]
    Abort,
    /// Treat the offending pair as dissimilar and keep clustering.
    Skip,
}

/// Configuration for a grouping pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupingConfig {
    /// Minimum cosine similarity for an item to join an existing group.
    ///
    /// Values outside `[0, 1]` are accepted: above 1 every item becomes a
    /// singleton, at or below -1 everything merges into the first group.
    #[serde(default = "GroupingConfig::default_threshold")]
    pub similarity_threshold: f32,
    /// Handling of embeddings with differing dimensionality.
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,
    /// Upper bound on raw input length per call. `None` disables the check.
    #[serde(default)]
    pub max_items: Option<usize>,
    /// Run independent batch requests on the Rayon pool.
    ///
    /// Only consulted by [`crate::group_batch`]; a single call is always
    /// sequential.
    #[serde(default)]
    pub use_parallel: bool,
}

impl GroupingConfig {
    pub(crate) fn default_threshold() -> f32 {
        DEFAULT_SIMILARITY_THRESHOLD
    }

    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the dimension mismatch policy.
    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    /// Bound the number of raw items accepted per call.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), GroupingError> {
        if self.similarity_threshold.is_nan() {
            return Err(GroupingError::InvalidConfig(
                "similarity_threshold must not be NaN".into(),
            ));
        }
        if self.max_items == Some(0) {
            return Err(GroupingError::InvalidConfig(
                "max_items must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            mismatch_policy: MismatchPolicy::Abort,
            max_items: None,
            use_parallel: false,
        }
    }
}

/// Errors returned by the grouping engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GroupingError {
    /// Two embeddings of different length were compared.
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("invalid grouping config: {0}")]
    InvalidConfig(String),

    #[error("input of {len} items exceeds max_items={max}")]
    InputTooLarge { len: usize, max: usize },
}
