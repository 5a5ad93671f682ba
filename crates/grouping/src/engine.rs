use std::collections::HashSet;
use std::time::Instant;

use tracing::{info, warn, Level};

use crate::cluster::GreedyClusterer;
use crate::config::{GroupingConfig, GroupingError};
use crate::metrics::{metrics_recorder, GroupingSummary};
use crate::partition::{filter_items, order_by_similarity, partition, Partition};
use crate::rank::{dedupe_ungrouped, rank_groups};
use crate::types::{GroupRequest, GroupedResults, ResultItem};

#[cfg(test)]
mod tests;

/// Group `items` with the default configuration and the given threshold.
///
/// Items without an id or with a blacklisted id are dropped first. Embedding
/// items are clustered greedily in descending `similarity` order; the rest
/// are deduplicated. Any dimension mismatch fails the whole call.
pub fn group(
    items: Vec<ResultItem>,
    blacklist_ids: &HashSet<String>,
    threshold: f32,
) -> Result<GroupedResults, GroupingError> {
    let cfg = GroupingConfig::default().with_threshold(threshold);
    group_with_config(items, blacklist_ids, &cfg)
}

/// Group `items` under an explicit configuration.
pub fn group_with_config(
    items: Vec<ResultItem>,
    blacklist_ids: &HashSet<String>,
    cfg: &GroupingConfig,
) -> Result<GroupedResults, GroupingError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "grouping.group",
        input_len = items.len(),
        blacklist_len = blacklist_ids.len(),
        threshold = cfg.similarity_threshold,
        policy = ?cfg.mismatch_policy
    );
    let _guard = span.enter();

    let outcome = group_inner(items, blacklist_ids, cfg);
    let latency = start.elapsed();
    let elapsed_micros = latency.as_micros();

    match &outcome {
        Ok((_, summary)) => info!(
            total_results = summary.total_results,
            groups = summary.group_count,
            ungrouped = summary.ungrouped_count,
            cache_hits = summary.cache.hits,
            cache_misses = summary.cache.misses,
            skipped_pairs = summary.skipped_pairs,
            elapsed_micros,
            "grouping_success"
        ),
        Err(err) => warn!(error = %err, elapsed_micros, "grouping_failure"),
    }

    if let Some(recorder) = metrics_recorder() {
        recorder.record_grouping(latency, outcome.as_ref().map(|(_, summary)| summary));
    }

    outcome.map(|(results, _)| results)
}

fn group_inner(
    items: Vec<ResultItem>,
    blacklist_ids: &HashSet<String>,
    cfg: &GroupingConfig,
) -> Result<(GroupedResults, GroupingSummary), GroupingError> {
    cfg.validate()?;
    if let Some(max) = cfg.max_items {
        if items.len() > max {
            return Err(GroupingError::InputTooLarge {
                len: items.len(),
                max,
            });
        }
    }

    let mut filtered = filter_items(items, blacklist_ids);
    // Fixed here; dedup and grouping below never change it.
    let total_results = filtered.len();

    order_by_similarity(&mut filtered);
    let Partition {
        with_embedding,
        without_embedding,
    } = partition(filtered);

    let mut clusterer = GreedyClusterer::new(cfg.similarity_threshold, cfg.mismatch_policy);
    for item in with_embedding {
        clusterer.assign(item)?;
    }
    let cache = clusterer.cache_stats();
    let skipped_pairs = clusterer.skipped_pairs();

    let mut groups = clusterer.finish();
    rank_groups(&mut groups);
    let ungrouped = dedupe_ungrouped(without_embedding);

    let summary = GroupingSummary {
        total_results,
        group_count: groups.len(),
        ungrouped_count: ungrouped.len(),
        cache,
        skipped_pairs,
    };
    Ok((
        GroupedResults {
            groups,
            ungrouped,
            total_results,
        },
        summary,
    ))
}

/// Run a single request; its `threshold`, when set, overrides the config.
pub fn group_request(
    request: GroupRequest,
    cfg: &GroupingConfig,
) -> Result<GroupedResults, GroupingError> {
    let GroupRequest {
        items,
        blacklist_ids,
        threshold,
    } = request;
    match threshold {
        Some(threshold) => {
            let cfg = cfg.clone().with_threshold(threshold);
            group_with_config(items, &blacklist_ids, &cfg)
        }
        None => group_with_config(items, &blacklist_ids, cfg),
    }
}

/// Run independent requests, returning results in request order.
///
/// With the `parallel` feature and `cfg.use_parallel`, requests run on the
/// Rayon pool. Each request still gets its own cache and group list.
pub fn group_batch(
    requests: Vec<GroupRequest>,
    cfg: &GroupingConfig,
) -> Vec<Result<GroupedResults, GroupingError>> {
    #[cfg(feature = "parallel")]
    {
        if cfg.use_parallel {
            use rayon::prelude::*;
            return requests
                .into_par_iter()
                .map(|request| group_request(request, cfg))
                .collect();
        }
    }

    requests
        .into_iter()
        .map(|request| group_request(request, cfg))
        .collect()
}
