//! Disk cost: how far the working set overflows cluster memory.
//!
//! Each collection needs its data pages plus one index-overhead term per index
//! (`doc_count * address_size * fields_in_index` bytes). Embedded collections
//! count zero: their bytes already live in the parent's inflated
//! `avg_doc_size`. While the total fits in `nodes * pages_per_node` the cost is
//! zero; past that it grows linearly with the overage ratio.

use std::sync::Arc;

use shardwise_core::catalog::{pages_for, Catalog};
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::error::DesignError;
use shardwise_core::id::CollectionId;

use crate::cache::CostCache;
use crate::component::{scored_collections, CostComponent};
use crate::error::Result;
use crate::metrics::Diagnostics;
use crate::state::State;

pub struct DiskCostComponent {
    cache: CostCache<u64>,
    diagnostics: Arc<Diagnostics>,
}

impl DiskCostComponent {
    pub fn new(diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            cache: CostCache::new(),
            diagnostics,
        }
    }

    /// Cached page estimate for one collection, if computed and still valid.
    pub fn cached_pages(&self, collection: &str) -> Option<u64> {
        self.cache.peek(CollectionId::for_name(collection)).copied()
    }

    /// Data pages plus index pages for `name` under `design`.
    pub fn collection_pages(
        catalog: &Catalog,
        design: &Design,
        name: &str,
        cfg: &CostModelConfig,
    ) -> Result<u64> {
        let collection = catalog
            .get(name)
            .ok_or_else(|| DesignError::UnknownCollection(name.to_string()))?;

        let mut pages = pages_for(collection.data_bytes(), cfg.page_size);
        for index in design.indexes(name).into_iter().flatten() {
            let index_bytes = collection
                .doc_count
                .saturating_mul(cfg.address_size)
                .saturating_mul(index.len() as u64);
            pages = pages.saturating_add(pages_for(index_bytes, cfg.page_size));
        }
        Ok(pages)
    }
}

/// Zero within budget, `(total - budget) / budget` above it.
pub fn overage_cost(total_pages: u64, budget_pages: u64) -> f64 {
    if total_pages <= budget_pages {
        return 0.0;
    }
    if budget_pages == 0 {
        return total_pages as f64;
    }
    (total_pages - budget_pages) as f64 / budget_pages as f64
}

impl CostComponent for DiskCostComponent {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn get_cost(&mut self, state: &State, design: &Design) -> Result<f64> {
        let cfg = state.config();
        let catalog = state.catalog();

        let mut total_pages = 0u64;
        for name in scored_collections(design) {
            let pages = *self
                .cache
                .get_or_try_insert_with(CollectionId::for_name(name), || {
                    Self::collection_pages(catalog, design, name, cfg)
                })?;
            total_pages = total_pages.saturating_add(pages);
        }

        let budget = cfg.memory_budget_pages();
        let cost = overage_cost(total_pages, budget);
        tracing::debug!(total_pages, budget, cost, "disk cost");
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
