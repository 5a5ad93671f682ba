use std::collections::HashSet;
use std::error::Error;

use grouping::{group_with_config, GroupingConfig, MismatchPolicy, ResultItem};
use serde_json::json;

fn main() -> Result<(), Box<dyn Error>> {
    // Three hits of one face, one of another, and two frames without embeddings.
    let items = vec![
        ResultItem::new("frame-101")
            .with_similarity(0.93)
            .with_embedding(vec![0.91, 0.40, 0.05])
            .with_quality(0.7)
            .with_attribute("episode", json!("S01E04")),
        ResultItem::new("frame-233")
            .with_similarity(0.88)
            .with_embedding(vec![0.10, 0.20, 0.97])
            .with_quality(0.9),
        ResultItem::new("frame-102")
            .with_similarity(0.86)
            .with_embedding(vec![0.89, 0.44, 0.07])
            .with_quality(0.4),
        ResultItem::new("frame-517")
            .with_similarity(0.61)
            .with_thumbnail_url("https://cdn.example/517.jpg")
            .with_quality(0.5),
        ResultItem::new("frame-518")
            .with_similarity(0.60)
            .with_thumbnail_url("https://cdn.example/517.jpg")
            .with_quality(0.8),
        ResultItem::new("frame-900")
            .with_similarity(0.55)
            .with_embedding(vec![0.93, 0.36, 0.02])
            .with_quality(0.2),
    ];

    let blacklist: HashSet<String> = ["frame-404".to_string()].into_iter().collect();
    let cfg = GroupingConfig::default()
        .with_threshold(0.85)
        .with_mismatch_policy(MismatchPolicy::Abort);

    let out = group_with_config(items, &blacklist, &cfg)?;

    println!("total results: {}", out.total_results);
    for (idx, group) in out.groups.iter().enumerate() {
        let ids: Vec<&str> = group.ids().collect();
        println!(
            "group {idx}: {ids:?} (max quality {:.2})",
            group.max_quality()
        );
    }
    for item in &out.ungrouped {
        println!("ungrouped: {:?}", item.valid_id());
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
