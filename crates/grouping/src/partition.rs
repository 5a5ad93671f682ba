use std::collections::HashSet;

use crate::types::ResultItem;

/// Drop items with a missing or empty id and items whose id is blacklisted.
pub fn filter_items(items: Vec<ResultItem>, blacklist: &HashSet<String>) -> Vec<ResultItem> {
    items
        .into_iter()
        .filter(|item| match item.valid_id() {
            Some(id) => !blacklist.contains(id),
            None => false,
        })
        .collect()
}

/// Stable sort by upstream similarity, highest first. Missing scores sort as 0.
///
/// Clustering is order-dependent, so this comparator decides group membership.
pub fn order_by_similarity(items: &mut [ResultItem]) {
    items.sort_by(|a, b| b.similarity_score().total_cmp(&a.similarity_score()));
}

/// Items split by whether they carry an embedding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub with_embedding: Vec<ResultItem>,
    pub without_embedding: Vec<ResultItem>,
}

/// Split items by embedding presence, preserving relative order on each side.
pub fn partition(items: Vec<ResultItem>) -> Partition {
    let (with_embedding, without_embedding) = items
        .into_iter()
        .partition(|item| item.embedding.is_some());
    Partition {
        with_embedding,
        without_embedding,
    }
}
