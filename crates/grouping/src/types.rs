use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// A single scored result handed to the grouping engine.
///
/// Only `id`, `embedding`, `similarity`, `quality` and `thumbnail_url` are
/// read. Every other attribute lands in `extra` and is carried through to the
/// output untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    /// Unique identifier. Items without a non-empty id are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Embedding vector; absent items cannot be clustered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Upstream relevance score. Only fixes processing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    /// Ranking signal for groups and ungrouped items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
    /// Secondary dedup key for items without an embedding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Opaque attributes, never inspected.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ResultItem {
    /// Create an item with the given id and nothing else.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_similarity(mut self, similarity: f32) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The id if present and non-empty.
    pub fn valid_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Processing-order score; missing counts as 0.
    pub fn similarity_score(&self) -> f32 {
        score_key(self.similarity)
    }

    /// Ranking score; missing counts as 0.
    pub fn quality_score(&self) -> f32 {
        score_key(self.quality)
    }
}

/// Map an optional score onto a totally ordered key.
///
/// Missing and NaN collapse to 0 and `-0.0` to `0.0`, so `f32::total_cmp`
/// orders these keys the same way `<` would.
pub(crate) fn score_key(score: Option<f32>) -> f32 {
    match score {
        Some(v) if !v.is_nan() => v + 0.0,
        _ => 0.0,
    }
}

/// Returned when a group would be built from no items.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("a group must contain at least one item")]
pub struct EmptyGroupError;

/// Items judged to represent the same entity, in join order.
///
/// Never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<ResultItem>", into = "Vec<ResultItem>")]
pub struct Group {
    items: Vec<ResultItem>,
}

impl Group {
    pub(crate) fn singleton(item: ResultItem) -> Self {
        Self { items: vec![item] }
    }

    pub(crate) fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Highest member quality, missing qualities counted as 0.
    pub fn max_quality(&self) -> f32 {
        self.items
            .iter()
            .map(ResultItem::quality_score)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Ids of the members in join order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().filter_map(ResultItem::valid_id)
    }

    pub fn into_items(self) -> Vec<ResultItem> {
        self.items
    }
}

impl TryFrom<Vec<ResultItem>> for Group {
    type Error = EmptyGroupError;

    fn try_from(items: Vec<ResultItem>) -> Result<Self, Self::Error> {
        if items.is_empty() {
            return Err(EmptyGroupError);
        }
        Ok(Self { items })
    }
}

impl From<Group> for Vec<ResultItem> {
    fn from(group: Group) -> Self {
        group.items
    }
}

/// Output of a grouping pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupedResults {
    /// Ranked groups of embedding-bearing items.
    pub groups: Vec<Group>,
    /// Deduplicated, ranked items without an embedding.
    pub ungrouped: Vec<ResultItem>,
    /// Items that survived the input filter, before dedup or grouping.
    pub total_results: usize,
}

impl GroupedResults {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.ungrouped.is_empty()
    }
}

/// A serializable grouping request, used by batch callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    pub items: Vec<ResultItem>,
    #[serde(default)]
    pub blacklist_ids: HashSet<String>,
    /// Overrides the configured threshold when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

impl GroupRequest {
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn with_blacklist<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}
