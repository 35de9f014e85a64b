//! Skew cost: how unevenly load spreads across nodes over time.
//!
//! The workload's time span is cut into `skew_intervals` equal buckets. For
//! each scored collection and bucket we route the bucket's operations with the
//! collection's shard key and tally operations per node (a broadcast counts
//! once on every node). The imbalance of a bucket is the coefficient of
//! variation of those tallies. The cost is the mean imbalance over every
//! (collection, bucket) pair that saw at least one operation.

use std::sync::Arc;

use shardwise_core::design::Design;
use shardwise_core::id::CollectionId;

use crate::cache::CostCache;
use crate::component::{scored_collections, CostComponent};
use crate::error::Result;
use crate::estimator::Routing;
use crate::metrics::Diagnostics;
use crate::state::State;

/// Per bucket: imbalance, or `None` when the bucket had no operations.
pub type BucketImbalance = Vec<Option<f64>>;

pub struct SkewCostComponent {
    cache: CostCache<BucketImbalance>,
    diagnostics: Arc<Diagnostics>,
}

impl SkewCostComponent {
    pub fn new(diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            cache: CostCache::new(),
            diagnostics,
        }
    }

    pub fn cached_buckets(&self, collection: &str) -> Option<&BucketImbalance> {
        self.cache.peek(CollectionId::for_name(collection))
    }

    /// Per-bucket imbalance of `collection` under `design`'s shard key.
    pub fn collection_buckets(
        state: &State,
        design: &Design,
        collection: &str,
        span: (f64, f64),
    ) -> Result<BucketImbalance> {
        let estimator = state.estimator();
        let nodes = estimator.nodes() as usize;
        let intervals = state.config().skew_intervals.max(1) as usize;
        let shard_key = design.shard_key(collection);

        let mut tallies = vec![vec![0u64; nodes]; intervals];
        let mut seen = vec![false; intervals];
        for op in state.workload().operations_on(collection) {
            let bucket = state.interval_of(op.query_time, span);
            seen[bucket] = true;
            match estimator.route(shard_key, op)? {
                Routing::Single(node) => tallies[bucket][node as usize] += 1,
                Routing::Broadcast => tallies[bucket].iter_mut().for_each(|n| *n += 1),
            }
        }

        Ok(tallies
            .iter()
            .zip(seen)
            .map(|(counts, seen)| seen.then(|| coefficient_of_variation(counts)))
            .collect())
    }
}

/// Population standard deviation over mean; zero for empty or all-zero input.
pub fn coefficient_of_variation(counts: &[u64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt() / mean
}

impl CostComponent for SkewCostComponent {
    fn name(&self) -> &'static str {
        "skew"
    }

    fn get_cost(&mut self, state: &State, design: &Design) -> Result<f64> {
        let Some(span) = state.workload().time_span() else {
            return Ok(0.0);
        };

        let mut sum = 0.0;
        let mut pairs = 0u64;
        for name in scored_collections(design) {
            let buckets = self
                .cache
                .get_or_try_insert_with(CollectionId::for_name(name), || {
                    Self::collection_buckets(state, design, name, span)
                })?;
            for imbalance in buckets.iter().flatten() {
                sum += imbalance;
                pairs += 1;
            }
        }

        let cost = if pairs == 0 { 0.0 } else { sum / pairs as f64 };
        tracing::debug!(pairs, cost, "skew cost");
        Ok(cost)
    }

    fn invalidate_cache(&mut self, _design: &Design, collection: &str) {
        self.cache.invalidate(CollectionId::for_name(collection));
    }

    fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }

    fn reset(&mut self) {
        self.cache.clear();
    }

    fn finish(&mut self) {
        let stats = self.cache.take_stats();
        self.diagnostics.record(self.name(), stats);
    }
}
