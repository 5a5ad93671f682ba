// Metrics hooks for the `grouping` crate.
//
// Callers install a global `GroupingMetrics` implementation via
// [`set_grouping_metrics`], then every grouping call reports its latency and
// outcome. This keeps instrumentation decoupled from any specific metrics
// backend. The recorder only observes; it never holds grouping state.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::cache::PairCacheStats;
use crate::config::GroupingError;

/// Counts describing a successful grouping call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingSummary {
    pub total_results: usize,
    pub group_count: usize,
    pub ungrouped_count: usize,
    pub cache: PairCacheStats,
    pub skipped_pairs: usize,
}

/// Metrics observer for grouping calls.
pub trait GroupingMetrics: Send + Sync {
    /// Record the outcome of one grouping call.
    ///
    /// `latency` is the wall-clock time spent inside the call.
    fn record_grouping(
        &self,
        latency: Duration,
        outcome: Result<&GroupingSummary, &GroupingError>,
    );
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn GroupingMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn GroupingMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn GroupingMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global grouping metrics recorder.
///
/// This is typically called once during service startup.
pub fn set_grouping_metrics(recorder: Option<Arc<dyn GroupingMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
