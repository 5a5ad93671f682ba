//! # UCFP Result Grouping (`grouping`)
//!
//! ## Purpose
//!
//! `grouping` consolidates scored search results that likely show the same
//! underlying entity (for example one face appearing in several hits) into
//! ordered groups, and reduces results that cannot be compared into a
//! deduplicated, quality-ranked list.
//!
//! ## Contract
//!
//! - The crate never produces embeddings or quality scores; callers supply
//!   them on each [`ResultItem`].
//! - A call is a pure function of `(items, blacklist, config)` with no I/O
//!   and no state shared between calls. The only process-wide hook is the
//!   optional [`GroupingMetrics`] observer.
//!
//! Invariant: the same items in the same order with the same
//! [`GroupingConfig`] always produce the same [`GroupedResults`].
//!
//! ## Pipeline
//!
//! 1.  **Filter**: drop items with a missing/empty id or a blacklisted id.
//!     The survivors' count is reported as `total_results`.
//! 2.  **Order**: stable sort by upstream `similarity`, highest first.
//! 3.  **Partition**: split into items with and without an embedding.
//! 4.  **Cluster**: each embedding item joins the first existing group that
//!     holds any member with cosine similarity at or above the threshold,
//!     else it opens a new group. Pair similarities are memoized per call
//!     under an unordered id key.
//! 5.  **Rank**: groups by `(max quality, size)` descending; items without
//!     an embedding are deduplicated by id, then by thumbnail URL, then
//!     sorted by quality.
//!
//! ## Example Usage
//!
//! ```
//! use std::collections::HashSet;
//! use grouping::{group, ResultItem};
//!
//! let items = vec![
//!     ResultItem::new("a").with_similarity(0.9).with_embedding(vec![1.0, 0.0]).with_quality(5.0),
//!     ResultItem::new("b").with_similarity(0.85).with_embedding(vec![1.0, 0.0]).with_quality(3.0),
//!     ResultItem::new("c").with_similarity(0.5).with_embedding(vec![0.0, 1.0]).with_quality(9.0),
//! ];
//!
//! let out = group(items, &HashSet::new(), 0.8).unwrap();
//!
//! assert_eq!(out.total_results, 3);
//! assert_eq!(out.groups.len(), 2);
//! assert_eq!(out.groups[0].ids().collect::<Vec<_>>(), vec!["c"]);
//! assert_eq!(out.groups[1].ids().collect::<Vec<_>>(), vec!["a", "b"]);
//! ```
//!
//! ## Errors
//!
//! Only a dimension mismatch between two compared embeddings is reported
//! from the clustering itself. By default it aborts the call; opt into
//! [`MismatchPolicy::Skip`] to treat such pairs as dissimilar instead.

pub mod cache;
pub mod cluster;
pub mod config;
mod engine;
pub mod metrics;
pub mod partition;
pub mod rank;
pub mod similarity;
pub mod types;

pub use crate::cache::{PairCache, PairCacheStats};
pub use crate::cluster::{cluster_items, GreedyClusterer};
pub use crate::config::{
    GroupingConfig, GroupingError, MismatchPolicy, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use crate::engine::{group, group_batch, group_request, group_with_config};
pub use crate::metrics::{set_grouping_metrics, GroupingMetrics, GroupingSummary};
pub use crate::partition::{filter_items, order_by_similarity, partition, Partition};
pub use crate::rank::{dedupe_ungrouped, rank_groups};
pub use crate::similarity::cosine_similarity;
pub use crate::types::{EmptyGroupError, Group, GroupRequest, GroupedResults, ResultItem};
