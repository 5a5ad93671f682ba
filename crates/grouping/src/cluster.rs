//! Single-pass greedy clustering over embedding-bearing items.
//!
//! Items are consumed in caller order. Each one joins the first existing
//! group (in creation order) holding any member whose similarity to it is at
//! or above the threshold, otherwise it opens a new group at the end. This is
//! single-linkage and order-dependent: the same items in another order can
//! produce different groups.

use tracing::{debug, warn};

use crate::cache::{PairCache, PairCacheStats};
use crate::config::{GroupingError, MismatchPolicy};
use crate::types::{Group, ResultItem};

pub struct GreedyClusterer {
    threshold: f32,
    policy: MismatchPolicy,
    groups: Vec<Group>,
    cache: PairCache,
    skipped_pairs: usize,
}

impl GreedyClusterer {
    pub fn new(threshold: f32, policy: MismatchPolicy) -> Self {
        Self {
            threshold,
            policy,
            groups: Vec::new(),
            cache: PairCache::new(),
            skipped_pairs: 0,
        }
    }

    /// Place `item` and return the index of the group it landed in.
    ///
    /// An item without an embedding cannot match anything and always opens
    /// a new group. Under [`MismatchPolicy::Abort`] a dimension mismatch
    /// leaves the clusterer unchanged and returns the error.
    pub fn assign(&mut self, item: ResultItem) -> Result<usize, GroupingError> {
        let target = match item.embedding.as_deref() {
            Some(embedding) => {
                self.find_group(item.valid_id().unwrap_or_default(), embedding)?
            }
            None => None,
        };

        match target {
            Some(idx) => {
                self.groups[idx].push(item);
                Ok(idx)
            }
            None => {
                debug!(
                    item_id = ?item.valid_id(),
                    group_index = self.groups.len(),
                    "grouping_new_group"
                );
                self.groups.push(Group::singleton(item));
                Ok(self.groups.len() - 1)
            }
        }
    }

    fn find_group(&mut self, id: &str, embedding: &[f32]) -> Result<Option<usize>, GroupingError> {
        for (idx, group) in self.groups.iter().enumerate() {
            for member in group.items() {
                let Some(member_embedding) = member.embedding.as_deref() else {
                    continue;
                };
                let member_id = member.valid_id().unwrap_or_default();
                match self.cache.similarity(id, embedding, member_id, member_embedding) {
                    Ok(sim) if sim >= self.threshold => return Ok(Some(idx)),
                    Ok(_) => {}
                    Err(GroupingError::DimensionMismatch { left, right })
                        if self.policy == MismatchPolicy::Skip =>
                    {
                        self.skipped_pairs += 1;
                        warn!(
                            item_id = %id,
                            member_id = %member_id,
                            left,
                            right,
                            "grouping_skipped_mismatched_pair"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(None)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn cache_stats(&self) -> PairCacheStats {
        self.cache.stats()
    }

    /// Pairs ignored under [`MismatchPolicy::Skip`].
    pub fn skipped_pairs(&self) -> usize {
        self.skipped_pairs
    }

    /// Groups in creation order.
    pub fn finish(self) -> Vec<Group> {
        self.groups
    }
}

/// Cluster `items` in the given order.
pub fn cluster_items(
    items: Vec<ResultItem>,
    threshold: f32,
    policy: MismatchPolicy,
) -> Result<Vec<Group>, GroupingError> {
    let mut clusterer = GreedyClusterer::new(threshold, policy);
    for item in items {
        clusterer.assign(item)?;
    }
    Ok(clusterer.finish())
}
