use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;

/// Global runtime metrics for the leaderboard.
///
/// Purpose:
/// - Track backend volume (pages / rows read)
/// - Track degraded reads (page failures)
/// - Track rows dropped at the ingestion boundary
/// - Track load outcomes
///
/// Design:
/// - Lock-free (Atomics)
/// - Cumulative for the process lifetime
#[derive(Default)]
pub struct RuntimeMetrics {
    // Backend
    pub pages_fetched: AtomicUsize,
    pub rows_fetched: AtomicUsize,
    pub page_failures: AtomicUsize,

    // Ingestion
    pub rows_quarantined: AtomicUsize,
    pub votes_ignored: AtomicUsize,

    // Loads
    pub loads_completed: AtomicUsize,
    pub loads_failed: AtomicUsize,
}

impl RuntimeMetrics {
    /// One-line summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "pages={} rows={} page_err={} quarantined={} ignored_votes={} loads={} load_err={}",
            self.pages_fetched.load(Ordering::Relaxed),
            self.rows_fetched.load(Ordering::Relaxed),
            self.page_failures.load(Ordering::Relaxed),
            self.rows_quarantined.load(Ordering::Relaxed),
            self.votes_ignored.load(Ordering::Relaxed),
            self.loads_completed.load(Ordering::Relaxed),
            self.loads_failed.load(Ordering::Relaxed),
        )
    }
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));
