//! Umbrella crate for UCFP result grouping.
//!
//! Re-exports the `grouping` engine and adds deployment-side configuration
//! loading, so services can depend on a single crate.
//!
//! ```
//! use std::collections::HashSet;
//! use result_grouping::{group_with_config, GroupingFileConfig, ResultItem};
//!
//! let file = GroupingFileConfig::from_yaml("version: \"1.0\"\ngrouping:\n  similarity_threshold: 0.9\n")?;
//! let out = group_with_config(
//!     vec![ResultItem::new("frame-1").with_embedding(vec![1.0, 0.0])],
//!     &HashSet::new(),
//!     &file.into_grouping_config(),
//! )?;
//! assert_eq!(out.groups.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, GroupingFileConfig, GroupingYamlConfig};
pub use grouping::{
    cluster_items, cosine_similarity, dedupe_ungrouped, filter_items, group, group_batch,
    group_request, group_with_config, order_by_similarity, partition, rank_groups,
    set_grouping_metrics, EmptyGroupError, GreedyClusterer, Group, GroupRequest, GroupedResults,
    GroupingConfig, GroupingError, GroupingMetrics, GroupingSummary, MismatchPolicy, PairCache,
    PairCacheStats, Partition, ResultItem, DEFAULT_SIMILARITY_THRESHOLD,
};
