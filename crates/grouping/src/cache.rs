//! Per-call memo of pairwise embedding similarity.
//!
//! Keys are unordered id pairs stored as `(min, max)`, so `(a, b)` and
//! `(b, a)` resolve to one entry. A cache lives for one clustering pass and
//! is dropped with it.

use std::hash::{Hash, Hasher};

use hashbrown::{Equivalent, HashMap};

use crate::config::GroupingError;
use crate::similarity::cosine_similarity;

/// Hit/miss counters for a [`PairCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Borrowed view of a cache key, used for allocation-free lookups.
///
/// Hashes exactly like `(String, String)`.
struct PairRef<'a>(&'a str, &'a str);

impl Hash for PairRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        self.1.hash(state);
    }
}

impl Equivalent<(String, String)> for PairRef<'_> {
    fn equivalent(&self, key: &(String, String)) -> bool {
        self.0 == key.0 && self.1 == key.1
    }
}

fn canonical<'a>(a: &'a str, b: &'a str) -> PairRef<'a> {
    if a <= b {
        PairRef(a, b)
    } else {
        PairRef(b, a)
    }
}

#[derive(Debug, Default)]
pub struct PairCache {
    entries: HashMap<(String, String), f32>,
    stats: PairCacheStats,
}

impl PairCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached similarity for the pair, in either order.
    pub fn get(&self, id_a: &str, id_b: &str) -> Option<f32> {
        self.entries.get(&canonical(id_a, id_b)).copied()
    }

    /// Similarity of two identified embeddings, computed at most once per
    /// unordered id pair. Failures are returned and not cached.
    pub fn similarity(
        &mut self,
        id_a: &str,
        a: &[f32],
        id_b: &str,
        b: &[f32],
    ) -> Result<f32, GroupingError> {
        let key = canonical(id_a, id_b);
        if let Some(&sim) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(sim);
        }

        let sim = cosine_similarity(a, b)?;
        self.stats.misses += 1;
        self.entries.insert((key.0.to_owned(), key.1.to_owned()), sim);
        Ok(sim)
    }

    pub fn stats(&self) -> PairCacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
