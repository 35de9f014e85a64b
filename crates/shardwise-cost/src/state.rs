//! Shared evaluation state: configuration, catalog, workload and diagnostics.
//!
//! The original catalog and workload are kept alongside the active ones so a
//! design that removes denormalization can restore them. Cost components read
//! the state; only the model (through the combiner) swaps what is active.

use std::sync::Arc;

use shardwise_core::catalog::Catalog;
use shardwise_core::config::CostModelConfig;
use shardwise_core::workload::Workload;

use crate::error::Result;
use crate::estimator::NodeEstimator;
use crate::metrics::Diagnostics;

#[derive(Debug, Clone)]
pub struct State {
    config: CostModelConfig,
    original_catalog: Catalog,
    combined_catalog: Option<Catalog>,
    original_workload: Workload,
    combined_workload: Option<Workload>,
    diagnostics: Arc<Diagnostics>,
}

impl State {
    /// Validates `config`; a bad configuration never reaches evaluation.
    pub fn new(catalog: Catalog, workload: Workload, config: CostModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            original_catalog: catalog,
            combined_catalog: None,
            original_workload: workload,
            combined_workload: None,
            diagnostics: Arc::new(Diagnostics::new()),
        })
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    pub fn estimator(&self) -> NodeEstimator {
        NodeEstimator::new(self.config.nodes)
    }

    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Catalog the components should read (combined if one is active).
    pub fn catalog(&self) -> &Catalog {
        self.combined_catalog.as_ref().unwrap_or(&self.original_catalog)
    }

    pub fn original_catalog(&self) -> &Catalog {
        &self.original_catalog
    }

    /// Workload the components should read (combined if one is active).
    pub fn workload(&self) -> &Workload {
        self.combined_workload
            .as_ref()
            .unwrap_or(&self.original_workload)
    }

    pub fn original_workload(&self) -> &Workload {
        &self.original_workload
    }

    pub fn is_combined(&self) -> bool {
        self.combined_workload.is_some()
    }

    /// Substitute a combined workload for evaluation.
    pub fn update_workload(&mut self, workload: Workload) {
        self.combined_workload = Some(workload);
    }

    pub fn restore_original_workload(&mut self) {
        self.combined_workload = None;
    }

    /// Substitute a combined (denormalization-inflated) catalog.
    pub fn update_catalog(&mut self, catalog: Catalog) {
        self.combined_catalog = Some(catalog);
    }

    pub fn restore_original_catalog(&mut self) {
        self.combined_catalog = None;
    }

    /// Clear diagnostic counters. Caches live in the components and are untouched.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }

    /// Copy for an independent evaluation branch, with its own counters.
    pub fn fork(&self) -> Self {
        Self {
            diagnostics: Arc::new(Diagnostics::new()),
            ..self.clone()
        }
    }

    /// Bucket index in `0..skew_intervals` for timestamp `t` within `span`.
    pub fn interval_of(&self, t: f64, span: (f64, f64)) -> usize {
        let intervals = self.config.skew_intervals.max(1) as usize;
        let (lo, hi) = span;
        let width = (hi - lo) / intervals as f64;
        if width <= 0.0 || !width.is_finite() {
            return 0;
        }
        let idx = ((t - lo) / width).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(intervals - 1)
        }
    }
}
