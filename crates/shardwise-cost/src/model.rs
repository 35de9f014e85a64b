//! The cost model: three weighted components behind one `overall_cost` call.
//!
//! Per call the model:
//! 1. validates the design against the original catalog,
//! 2. recombines the workload if the design's denormalization map changed
//!    (which invalidates every cached entry),
//! 3. invalidates the collections whose placement differs from the last
//!    evaluated design,
//! 4. asks each component for its cost and returns the weighted mean.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use shardwise_core::catalog::Catalog;
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::workload::Workload;
use shardwise_workload::WorkloadCombiner;

use crate::component::CostComponent;
use crate::disk::DiskCostComponent;
use crate::error::Result;
use crate::network::NetworkCostComponent;
use crate::skew::SkewCostComponent;
use crate::state::State;

/// Component costs and their weighted total for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub disk: f64,
    pub network: f64,
    pub skew: f64,
    pub total: f64,
}

pub struct CostModel {
    state: State,
    disk: DiskCostComponent,
    network: NetworkCostComponent,
    skew: SkewCostComponent,
    last_design: Option<Design>,
    last_breakdown: Option<CostBreakdown>,
    /// Denormalization map the active workload was combined for; `None`
    /// until the first evaluation.
    active_denormalization: Option<BTreeMap<String, String>>,
}

impl CostModel {
    pub fn new(catalog: Catalog, workload: Workload, config: CostModelConfig) -> Result<Self> {
        Ok(Self::with_state(State::new(catalog, workload, config)?))
    }

    pub fn with_state(state: State) -> Self {
        let diagnostics = state.diagnostics().clone();
        Self {
            disk: DiskCostComponent::new(diagnostics.clone()),
            network: NetworkCostComponent::new(diagnostics.clone()),
            skew: SkewCostComponent::new(diagnostics),
            state,
            last_design: None,
            last_breakdown: None,
            active_denormalization: None,
        }
    }

    /// Independent model for a parallel search branch: cloned state, fresh
    /// counters, empty caches.
    pub fn fork(&self) -> Self {
        let mut forked = Self::with_state(self.state.fork());
        forked.active_denormalization = self.active_denormalization.clone();
        forked
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn disk(&self) -> &DiskCostComponent {
        &self.disk
    }

    pub fn network(&self) -> &NetworkCostComponent {
        &self.network
    }

    pub fn skew(&self) -> &SkewCostComponent {
        &self.skew
    }

    pub fn last_design(&self) -> Option<&Design> {
        self.last_design.as_ref()
    }

    pub fn last_cost(&self) -> Option<f64> {
        self.last_breakdown.map(|b| b.total)
    }

    pub fn last_breakdown(&self) -> Option<CostBreakdown> {
        self.last_breakdown
    }

    /// Weighted, normalized cost of `design`.
    pub fn overall_cost(&mut self, design: &Design) -> Result<f64> {
        // Weights were validated when the state was built.
        let cfg = self.state.config().clone();
        let weight_sum = cfg.weight_sum();
        design.validate(self.state.original_catalog())?;

        let started = Instant::now();
        match self.evaluate(design, &cfg, weight_sum) {
            Ok(breakdown) => {
                self.last_design = Some(design.clone());
                self.last_breakdown = Some(breakdown);
                self.state.diagnostics().record_evaluation();
                self.finish_components();
                tracing::info!(
                    cost = breakdown.total,
                    disk = breakdown.disk,
                    network = breakdown.network,
                    skew = breakdown.skew,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "overall cost"
                );
                Ok(breakdown.total)
            }
            Err(e) => {
                // Some entries may now hold values for `design`; force the
                // next call to recompute everything it scores.
                self.last_design = None;
                self.finish_components();
                Err(e)
            }
        }
    }

    fn evaluate(&mut self, design: &Design, cfg: &CostModelConfig, weight_sum: f64) -> Result<CostBreakdown> {
        self.sync_denormalization(design)?;

        let delta = design.delta_collections(self.last_design.as_ref());
        tracing::debug!(changed = delta.len(), "design delta");
        for name in &delta {
            self.invalidate_cache(design, name);
        }

        let disk = self.disk.get_cost(&self.state, design)?;
        let network = self.network.get_cost(&self.state, design)?;
        let skew = self.skew.get_cost(&self.state, design)?;

        let total = (cfg.weight_disk * disk + cfg.weight_network * network + cfg.weight_skew * skew)
            / weight_sum;
        Ok(CostBreakdown {
            disk,
            network,
            skew,
            total,
        })
    }

    /// Swap in the combined (or original) workload and catalog when the
    /// design's denormalization map differs from the active one.
    fn sync_denormalization(&mut self, design: &Design) -> Result<()> {
        let wanted = design.denormalization_map();
        if self.active_denormalization.as_ref() == Some(&wanted) {
            return Ok(());
        }

        if wanted.is_empty() {
            self.state.restore_original_workload();
            self.state.restore_original_catalog();
        } else {
            let combiner =
                WorkloadCombiner::new(self.state.original_catalog(), self.state.original_workload());
            let workload = combiner.process(design)?;
            let catalog = combiner.combine_catalog(design, self.state.config().page_size)?;
            self.state.update_workload(workload);
            self.state.update_catalog(catalog);
        }
        tracing::debug!(embedded = wanted.len(), "active workload replaced");

        self.active_denormalization = Some(wanted);
        self.disk.invalidate_all();
        self.network.invalidate_all();
        self.skew.invalidate_all();
        self.last_design = None;
        Ok(())
    }

    /// Drop `collection`'s cached contribution in every component.
    pub fn invalidate_cache(&mut self, design: &Design, collection: &str) {
        self.disk.invalidate_cache(design, collection);
        self.network.invalidate_cache(design, collection);
        self.skew.invalidate_cache(design, collection);
    }

    /// Clear counters and every cache. For independent runs, not for
    /// incremental search.
    pub fn reset(&mut self) {
        self.state.reset();
        self.disk.reset();
        self.network.reset();
        self.skew.reset();
        self.last_design = None;
        self.last_breakdown = None;
    }

    fn finish_components(&mut self) {
        self.disk.finish();
        self.network.finish();
        self.skew.finish();
    }
}
