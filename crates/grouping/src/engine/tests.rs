use super::*;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::json;

use crate::config::MismatchPolicy;
use crate::metrics::{set_grouping_metrics, GroupingMetrics};
use crate::types::Group;

fn no_blacklist() -> HashSet<String> {
    HashSet::new()
}

fn embedded(id: &str, similarity: f32, embedding: &[f32], quality: f32) -> ResultItem {
    ResultItem::new(id)
        .with_similarity(similarity)
        .with_embedding(embedding.to_vec())
        .with_quality(quality)
}

fn group_ids(groups: &[Group]) -> Vec<Vec<&str>> {
    groups.iter().map(|g| g.ids().collect()).collect()
}

fn ids(items: &[ResultItem]) -> Vec<&str> {
    items.iter().filter_map(ResultItem::valid_id).collect()
}

#[test]
fn empty_input_yields_empty_results() {
    let out = group(Vec::new(), &no_blacklist(), 0.8).expect("empty input");
    assert_eq!(out, GroupedResults::default());
    assert_eq!(out.total_results, 0);
}

#[test]
fn reference_scenario_orders_groups_by_quality() {
    let items = vec![
        embedded("a", 0.9, &[1.0, 0.0], 5.0),
        embedded("b", 0.85, &[1.0, 0.0], 3.0),
        embedded("c", 0.5, &[0.0, 1.0], 9.0),
    ];
    let out = group(items, &no_blacklist(), 0.8).expect("grouping");

    assert_eq!(group_ids(&out.groups), vec![vec!["c"], vec!["a", "b"]]);
    assert!(out.ungrouped.is_empty());
    assert_eq!(out.total_results, 3);
}

#[test]
fn input_order_is_replaced_by_similarity_order() {
    // Same items as the reference scenario, shuffled.
    let items = vec![
        embedded("c", 0.5, &[0.0, 1.0], 9.0),
        embedded("b", 0.85, &[1.0, 0.0], 3.0),
        embedded("a", 0.9, &[1.0, 0.0], 5.0),
    ];
    let out = group(items, &no_blacklist(), 0.8).expect("grouping");
    assert_eq!(group_ids(&out.groups), vec![vec!["c"], vec!["a", "b"]]);
}

#[test]
fn identical_embeddings_form_one_group_of_two() {
    let items = vec![
        embedded("hi", 0.7, &[0.3, 0.4, 0.5], 5.0),
        embedded("lo", 0.6, &[0.3, 0.4, 0.5], 3.0),
    ];
    let out = group(items, &no_blacklist(), 0.8).expect("grouping");
    assert_eq!(out.groups.len(), 1);
    assert_eq!(out.groups[0].len(), 2);
}

#[test]
fn orthogonal_embeddings_form_two_singletons() {
    let items = vec![
        embedded("x", 0.7, &[1.0, 0.0], 1.0),
        embedded("y", 0.6, &[0.0, 1.0], 1.0),
    ];
    let out = group(items, &no_blacklist(), 0.8).expect("grouping");
    assert_eq!(out.groups.len(), 2);
    assert!(out.groups.iter().all(|g| g.len() == 1));
}

#[test]
fn blacklisted_and_idless_items_are_dropped_and_not_counted() {
    let items = vec![
        embedded("keep", 0.9, &[1.0, 0.0], 1.0),
        embedded("banned", 0.8, &[1.0, 0.0], 1.0),
        ResultItem {
            id: None,
            embedding: Some(vec![1.0, 0.0]),
            ..Default::default()
        },
        ResultItem::new("").with_thumbnail_url("empty-id.jpg"),
        ResultItem::new("plain"),
        ResultItem::new("banned"),
    ];
    let blacklist: HashSet<String> = ["banned".to_string()].into_iter().collect();

    let out = group(items, &blacklist, 0.8).expect("grouping");
    assert_eq!(out.total_results, 2);
    assert_eq!(group_ids(&out.groups), vec![vec!["keep"]]);
    assert_eq!(ids(&out.ungrouped), vec!["plain"]);
}

#[test]
fn total_counts_items_before_dedup() {
    let items = vec![
        ResultItem::new("dup"),
        ResultItem::new("dup"),
        ResultItem::new("t1").with_thumbnail_url("same.jpg"),
        ResultItem::new("t2").with_thumbnail_url("same.jpg"),
    ];
    let out = group(items, &no_blacklist(), 0.8).expect("grouping");
    assert_eq!(out.total_results, 4);
    assert_eq!(ids(&out.ungrouped), vec!["dup", "t1"]);
}

#[test]
fn mixed_input_splits_groups_and_ungrouped() {
    let items = vec![
        embedded("face-1", 0.95, &[0.9, 0.1, 0.0], 2.0),
        ResultItem::new("frame-low")
            .with_similarity(0.4)
            .with_quality(1.0)
            .with_thumbnail_url("low.jpg"),
        embedded("face-2", 0.9, &[0.88, 0.12, 0.01], 6.0),
        ResultItem::new("frame-high")
            .with_similarity(0.3)
            .with_quality(7.0)
            .with_thumbnail_url("high.jpg"),
        embedded("face-3", 0.2, &[0.0, 0.0, 1.0], 4.0),
    ];
    let out = group(items, &no_blacklist(), 0.8).expect("grouping");

    assert_eq!(
        group_ids(&out.groups),
        vec![vec!["face-1", "face-2"], vec!["face-3"]]
    );
    assert_eq!(ids(&out.ungrouped), vec!["frame-high", "frame-low"]);
    assert_eq!(out.total_results, 5);
}

#[test]
fn extra_attributes_pass_through_untouched() {
    let item: ResultItem = serde_json::from_value(json!({
        "id": "frame-9",
        "embedding": [1.0, 0.0],
        "episode": "S02E11",
        "caption": { "text": "hello", "lang": "en" }
    }))
    .expect("parse item");
    let out = group(vec![item], &no_blacklist(), 0.8).expect("grouping");

    let member = &out.groups[0].items()[0];
    assert_eq!(member.extra.get("episode"), Some(&json!("S02E11")));
    assert_eq!(
        member.extra.get("caption"),
        Some(&json!({ "text": "hello", "lang": "en" }))
    );
}

#[test]
fn dimension_mismatch_aborts_without_partial_result() {
    let items = vec![
        embedded("a", 0.9, &[1.0, 0.0], 1.0),
        embedded("b", 0.8, &[1.0, 0.0, 0.0], 1.0),
        ResultItem::new("plain"),
    ];
    let err = group(items, &no_blacklist(), 0.8).expect_err("mismatch must fail");
    assert!(matches!(err, GroupingError::DimensionMismatch { .. }));
}

#[test]
fn mismatch_skip_policy_keeps_going() {
    let items = vec![
        embedded("a", 0.9, &[1.0, 0.0], 1.0),
        embedded("b", 0.8, &[1.0, 0.0, 0.0], 2.0),
        embedded("c", 0.7, &[1.0, 0.0], 1.0),
    ];
    let cfg = GroupingConfig::default().with_mismatch_policy(MismatchPolicy::Skip);
    let out = group_with_config(items, &no_blacklist(), &cfg).expect("skip policy");
    assert_eq!(group_ids(&out.groups), vec![vec!["b"], vec!["a", "c"]]);
}

#[test]
fn max_items_bounds_raw_input() {
    let items = vec![ResultItem::new("a"), ResultItem::new("b"), ResultItem::new("c")];
    let cfg = GroupingConfig::default().with_max_items(2);
    let err = group_with_config(items, &no_blacklist(), &cfg).expect_err("too large");
    assert_eq!(err, GroupingError::InputTooLarge { len: 3, max: 2 });
}

#[test]
fn invalid_config_is_rejected() {
    let err = group(vec![ResultItem::new("a")], &no_blacklist(), f32::NAN)
        .expect_err("NaN threshold");
    assert!(matches!(err, GroupingError::InvalidConfig(_)));
}

#[test]
fn request_threshold_overrides_config() {
    let items = vec![
        embedded("a", 0.9, &[1.0, 0.0], 1.0),
        embedded("b", 0.8, &[0.6, 0.8], 1.0),
    ];
    let cfg = GroupingConfig::default();

    let strict = group_request(GroupRequest::new(items.clone()), &cfg).expect("strict");
    assert_eq!(strict.groups.len(), 2);

    let loose = group_request(GroupRequest::new(items).with_threshold(0.5), &cfg).expect("loose");
    assert_eq!(group_ids(&loose.groups), vec![vec!["a", "b"]]);
}

#[test]
fn batch_keeps_request_order() {
    let requests = vec![
        GroupRequest::new(vec![ResultItem::new("one")]),
        GroupRequest::new(vec![ResultItem::new("x"), ResultItem::new("y")]).with_blacklist(["y"]),
        GroupRequest::new(vec![
            embedded("p", 0.5, &[1.0], 1.0),
            embedded("q", 0.4, &[1.0, 0.0], 1.0),
        ]),
    ];
    for parallel in [false, true] {
        let cfg = GroupingConfig::default().with_parallel(parallel);
        let results = group_batch(requests.clone(), &cfg);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().map(|r| r.total_results), Ok(1));
        assert_eq!(results[1].as_ref().map(|r| r.total_results), Ok(1));
        assert!(matches!(
            results[2],
            Err(GroupingError::DimensionMismatch { .. })
        ));
    }
}

#[test]
fn identical_input_gives_identical_output() {
    let build = || {
        (0..40)
            .map(|i| {
                let angle = i as f32 * 0.15;
                embedded(
                    &format!("item-{i}"),
                    1.0 - (i % 7) as f32 * 0.1,
                    &[angle.cos(), angle.sin()],
                    (i % 5) as f32,
                )
            })
            .collect::<Vec<_>>()
    };
    let first = group(build(), &no_blacklist(), 0.9).expect("first run");
    let second = group(build(), &no_blacklist(), 0.9).expect("second run");
    assert_eq!(first, second);
}

struct RecordingMetrics {
    events: Arc<RwLock<Vec<Result<GroupingSummary, GroupingError>>>>,
}

impl RecordingMetrics {
    fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn snapshot(&self) -> Vec<Result<GroupingSummary, GroupingError>> {
        self.events.read().unwrap().clone()
    }
}

impl GroupingMetrics for RecordingMetrics {
    fn record_grouping(
        &self,
        _latency: Duration,
        outcome: Result<&GroupingSummary, &GroupingError>,
    ) {
        self.events
            .write()
            .unwrap()
            .push(outcome.copied().map_err(Clone::clone));
    }
}

#[test]
fn metrics_recorder_observes_groupings() {
    let recorder = Arc::new(RecordingMetrics::new());
    set_grouping_metrics(Some(recorder.clone()));

    let items: Vec<ResultItem> = (0..7)
        .map(|i| ResultItem::new(format!("metrics-{i}")))
        .collect();
    group(items, &no_blacklist(), 0.8).expect("grouping");

    let too_many: Vec<ResultItem> = (0..13).map(|i| ResultItem::new(format!("m-{i}"))).collect();
    let cfg = GroupingConfig::default().with_max_items(12);
    let _ = group_with_config(too_many, &no_blacklist(), &cfg);

    set_grouping_metrics(None);

    let events = recorder.snapshot();
    assert!(events.iter().any(|event| matches!(
        event,
        Ok(summary) if summary.total_results == 7 && summary.ungrouped_count == 7
    )));
    assert!(events
        .iter()
        .any(|event| *event == Err(GroupingError::InputTooLarge { len: 13, max: 12 })));
}
