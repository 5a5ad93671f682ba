use std::collections::HashSet;

use result_grouping::{group, GroupedResults, ResultItem};

fn fixture() -> Vec<ResultItem> {
    (0..80)
        .map(|i| {
            let t = i as f32 * 0.37;
            let item = ResultItem::new(format!("det-{i}"))
                .with_similarity(((i * 7) % 10) as f32 / 10.0)
                .with_quality(((i * 3) % 5) as f32);
            if i % 4 == 0 {
                item.with_thumbnail_url(format!("thumb-{}.jpg", i % 3))
            } else {
                item.with_embedding(vec![t.cos(), t.sin(), (t * 0.5).cos()])
            }
        })
        .collect()
}

fn run() -> GroupedResults {
    let blacklist: HashSet<String> = ["det-5".to_string(), "det-40".to_string()]
        .into_iter()
        .collect();
    group(fixture(), &blacklist, 0.9).expect("grouping")
}

#[test]
fn identical_input_produces_identical_output() {
    let first = run();
    for _ in 0..5 {
        assert_eq!(first, run());
    }
}

#[test]
fn serialized_output_is_byte_identical() {
    let a = serde_json::to_string(&run()).expect("serialize");
    let b = serde_json::to_string(&run()).expect("serialize");
    assert_eq!(a, b);
}

#[test]
fn blacklist_and_counts_hold() {
    let out = run();
    assert_eq!(out.total_results, 78);
    let all_ids: Vec<&str> = out
        .groups
        .iter()
        .flat_map(|g| g.ids())
        .chain(out.ungrouped.iter().filter_map(ResultItem::valid_id))
        .collect();
    assert!(!all_ids.contains(&"det-5"));
    assert!(!all_ids.contains(&"det-40"));
    // 19 thumbnail items left after the blacklist share 3 distinct URLs.
    assert_eq!(out.ungrouped.len(), 3);
}
