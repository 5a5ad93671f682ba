use hashbrown::HashSet;

use crate::types::{Group, ResultItem};

/// Order groups by best member quality, then by size, both descending.
/// Ties keep clustering order.
pub fn rank_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| {
        b.max_quality()
            .total_cmp(&a.max_quality())
            .then_with(|| b.len().cmp(&a.len()))
    });
}

fn thumbnail_key(item: &ResultItem) -> Option<&str> {
    item.thumbnail_url.as_deref()
}

/// Keep the first item for each key. Items without a key are always kept.
fn keep_first_by<F>(items: Vec<ResultItem>, key: F) -> Vec<ResultItem>
where
    F: for<'a> Fn(&'a ResultItem) -> Option<&'a str>,
{
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| key(item).is_none_or(|k| seen.insert(k)))
            .collect()
    };
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

/// Dedup items without embeddings and order them by quality.
///
/// First occurrence wins by id, then again by thumbnail URL, so two items
/// with different ids but the same thumbnail collapse into the first one.
/// The result is stable-sorted by quality, highest first.
pub fn dedupe_ungrouped(items: Vec<ResultItem>) -> Vec<ResultItem> {
    let by_id = keep_first_by(items, ResultItem::valid_id);
    let mut by_thumbnail = keep_first_by(by_id, thumbnail_key);
    by_thumbnail.sort_by(|a, b| b.quality_score().total_cmp(&a.quality_score()));
    by_thumbnail
}
