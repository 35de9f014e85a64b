//! Network cost: average number of nodes contacted per operation.
//!
//! Per collection we cache, for each operation type, how many operations were
//! seen and how many node contacts they needed under the collection's shard
//! key. The total is the contact sum over every scored collection divided by
//! the operation count, so 1.0 means every operation was routed to a single
//! node and `nodes` means every operation was broadcast.

use std::collections::BTreeMap;
use std::sync::Arc;

use shardwise_core::design::Design;
use shardwise_core::id::CollectionId;
use shardwise_core::workload::{OpType, Workload};

use crate::cache::CostCache;
use crate::component::{scored_collections, CostComponent};
use crate::error::Result;
use crate::estimator::NodeEstimator;
use crate::metrics::Diagnostics;
use crate::state::State;

/// Routing totals for one operation type on one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpClassCost {
    pub operations: u64,
    pub nodes_contacted: u64,
}

pub type CollectionNetworkCost = BTreeMap<OpType, OpClassCost>;

pub struct NetworkCostComponent {
    cache: CostCache<CollectionNetworkCost>,
    diagnostics: Arc<Diagnostics>,
}

impl NetworkCostComponent {
    pub fn new(diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            cache: CostCache::new(),
            diagnostics,
        }
    }

    /// Cached per-operation-type totals for one collection.
    pub fn cached_breakdown(&self, collection: &str) -> Option<&CollectionNetworkCost> {
        self.cache.peek(CollectionId::for_name(collection))
    }

    /// Walk `collection`'s operations and tally node contacts per op type.
    pub fn walk_collection(
        workload: &Workload,
        collection: &str,
        shard_key: &[String],
        estimator: NodeEstimator,
    ) -> CollectionNetworkCost {
        let mut classes = CollectionNetworkCost::new();
        for op in workload.operations_on(collection) {
            let class = classes.entry(op.op_type).or_default();
            class.operations += 1;
            class.nodes_contacted += u64::from(estimator.estimate(shard_key, &op.predicates));
        }
        classes
    }
}

impl CostComponent for NetworkCostComponent {
    fn name(&self) -> &'static str {
        "network"
    }

    fn get_cost(&mut self, state: &State, design: &Design) -> Result<f64> {
        let workload = state.workload();
        let estimator = state.estimator();

        let mut operations = 0u64;
        let mut contacted = 0u64;
        for name in scored_collections(design) {
            let shard_key = design.shard_key(name);
            let classes = self
                .cache
                .get_or_try_insert_with(CollectionId::for_name(name), || {
                    Ok::<_, crate::error::Error>(Self::walk_collection(
                        workload, name, shard_key, estimator,
                    ))
                })?;
            for class in classes.values() {
                operations += class.operations;
                contacted += class.nodes_contacted;
            }
        }

        let cost = if operations == 0 {
            0.0
        } else {
            contacted as f64 / operations as f64
        };
        tracing::debug!(operations, contacted, cost, "network cost");
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
