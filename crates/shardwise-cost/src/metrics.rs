//! Diagnostics shared by the cost model and its components.
//!
//! Components count cache hits/misses locally and flush them here on
//! `finish()`. Counters are advisory; they never influence cost values.

use std::sync::atomic::{AtomicU64, Ordering};

/// Local per-component hit/miss counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evaluations: AtomicU64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one component's counts for the pass that just finished.
    pub fn record(&self, component: &'static str, stats: CacheStats) {
        self.cache_hits.fetch_add(stats.hits, Ordering::Relaxed);
        self.cache_misses.fetch_add(stats.misses, Ordering::Relaxed);
        tracing::trace!(
            component,
            hits = stats.hits,
            misses = stats.misses,
            "cache stats"
        );
    }

    pub fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn totals(&self) -> CacheStats {
        CacheStats {
            hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.evaluations.store(0, Ordering::Relaxed);
    }
}
