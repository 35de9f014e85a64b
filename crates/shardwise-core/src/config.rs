//! Cost-model configuration that callers can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::error::{Error, Result};

/// Largest accepted node count.
pub const MAX_NODES: u32 = 1 << 16;

/// Largest accepted number of skew buckets.
pub const MAX_SKEW_INTERVALS: u32 = 1 << 16;

/// Largest `nodes * skew_intervals` grid the skew component may tally.
pub const MAX_SKEW_CELLS: u64 = 1 << 24;

/// Weights, cluster shape and sizing constants for one cost model.
///
/// There is a single disk/network/skew weight triple. Callers that want a
/// second weighting (for example a different mix while searching) build a
/// second model with its own config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// Disk cost coefficient.
    #[serde(alias = "weightDisk")]
    pub weight_disk: f64,

    /// Network cost coefficient.
    #[serde(alias = "weightNetwork")]
    pub weight_network: f64,

    /// Skew cost coefficient.
    #[serde(alias = "weightSkew")]
    pub weight_skew: f64,

    /// Number of nodes (shards) in the cluster.
    pub nodes: u32,

    /// Memory available per node, in MB.
    #[serde(alias = "maxMemoryMB", alias = "max_memory")]
    pub max_memory_mb: u64,

    /// Bytes needed to index one key of one document.
    #[serde(alias = "addressSize")]
    pub address_size: u64,

    /// Number of equal-width time buckets for the skew cost.
    #[serde(alias = "skewIntervals")]
    pub skew_intervals: u32,

    #[serde(alias = "pageSize")]
    pub page_size: u64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            weight_disk: 1.0,
            weight_network: 1.0,
            weight_skew: 1.0,
            nodes: 1,
            max_memory_mb: 1024,
            address_size: 64,
            skew_intervals: 10,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CostModelConfig {
    pub fn weight_sum(&self) -> f64 {
        self.weight_disk + self.weight_network + self.weight_skew
    }

    /// Pages that fit in one node's memory.
    pub fn memory_pages_per_node(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.max_memory_mb.saturating_mul(1024 * 1024) / self.page_size
    }

    /// Pages that fit in memory across the whole cluster.
    pub fn memory_budget_pages(&self) -> u64 {
        self.memory_pages_per_node()
            .saturating_mul(u64::from(self.nodes))
    }

    /// Reject configurations the cost model cannot evaluate against.
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("weight_disk", self.weight_disk),
            ("weight_network", self.weight_network),
            ("weight_skew", self.weight_skew),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::Config(format!("{name} must be a non-negative number, got {w}")));
            }
        }
        if self.weight_sum() <= 0.0 {
            return Err(Error::Config("cost weights must sum to more than zero".into()));
        }
        if self.nodes < 1 {
            return Err(Error::Config("nodes must be at least 1".into()));
        }
        if self.skew_intervals < 1 {
            return Err(Error::Config("skew_intervals must be at least 1".into()));
        }
        if self.nodes > MAX_NODES {
            return Err(Error::Config(format!("nodes must be at most {MAX_NODES}, got {}", self.nodes)));
        }
        if self.skew_intervals > MAX_SKEW_INTERVALS {
            return Err(Error::Config(format!(
                "skew_intervals must be at most {MAX_SKEW_INTERVALS}, got {}",
                self.skew_intervals
            )));
        }
        let cells = u64::from(self.nodes) * u64::from(self.skew_intervals);
        if cells > MAX_SKEW_CELLS {
            return Err(Error::Config(format!(
                "nodes * skew_intervals must be at most {MAX_SKEW_CELLS}, got {cells}"
            )));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be greater than zero".into()));
        }
        if self.max_memory_mb == 0 {
            return Err(Error::Config("max_memory_mb must be greater than zero".into()));
        }
        Ok(())
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SHARDWISE_WEIGHT_DISK`, `SHARDWISE_WEIGHT_NETWORK`, `SHARDWISE_WEIGHT_SKEW`
    /// - `SHARDWISE_NODES`: number of nodes
    /// - `SHARDWISE_MAX_MEMORY_MB`: per-node memory in MB
    /// - `SHARDWISE_ADDRESS_SIZE`: bytes per indexed key
    /// - `SHARDWISE_SKEW_INTERVALS`: skew bucket count
    /// - `SHARDWISE_PAGE_SIZE`: page size in bytes
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = env_parse::<f64>("SHARDWISE_WEIGHT_DISK") {
            cfg.weight_disk = v;
        }
        if let Some(v) = env_parse::<f64>("SHARDWISE_WEIGHT_NETWORK") {
            cfg.weight_network = v;
        }
        if let Some(v) = env_parse::<f64>("SHARDWISE_WEIGHT_SKEW") {
            cfg.weight_skew = v;
        }
        if let Some(v) = env_parse::<u32>("SHARDWISE_NODES") {
            cfg.nodes = v;
        }
        if let Some(v) = env_parse::<u64>("SHARDWISE_MAX_MEMORY_MB") {
            cfg.max_memory_mb = v;
        }
        if let Some(v) = env_parse::<u64>("SHARDWISE_ADDRESS_SIZE") {
            cfg.address_size = v;
        }
        if let Some(v) = env_parse::<u32>("SHARDWISE_SKEW_INTERVALS") {
            cfg.skew_intervals = v;
        }
        if let Some(v) = env_parse::<u64>("SHARDWISE_PAGE_SIZE") {
            cfg.page_size = v;
        }

        cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CostModelConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_weight_sum_is_rejected() {
        let cfg = CostModelConfig {
            weight_disk: 0.0,
            weight_network: 0.0,
            weight_skew: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn negative_weight_nodes_and_intervals_are_rejected() {
        let neg = CostModelConfig {
            weight_skew: -1.0,
            weight_disk: 5.0,
            ..Default::default()
        };
        assert!(neg.validate().is_err());

        let no_nodes = CostModelConfig {
            nodes: 0,
            ..Default::default()
        };
        assert!(no_nodes.validate().is_err());

        let no_buckets = CostModelConfig {
            skew_intervals: 0,
            ..Default::default()
        };
        assert!(no_buckets.validate().is_err());
    }

    #[test]
    fn oversized_skew_grid_is_rejected() {
        let huge_intervals = CostModelConfig {
            skew_intervals: 4_000_000_000,
            ..Default::default()
        };
        assert!(matches!(huge_intervals.validate(), Err(Error::Config(_))));

        let huge_nodes = CostModelConfig {
            nodes: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(huge_nodes.validate(), Err(Error::Config(_))));

        let wide_grid = CostModelConfig {
            nodes: MAX_NODES,
            skew_intervals: MAX_SKEW_INTERVALS,
            ..Default::default()
        };
        assert!(matches!(wide_grid.validate(), Err(Error::Config(_))));

        let at_limit = CostModelConfig {
            nodes: 1 << 12,
            skew_intervals: 1 << 12,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn budget_pages_scale_with_nodes() {
        let cfg = CostModelConfig {
            nodes: 8,
            max_memory_mb: 1024,
            ..Default::default()
        };
        assert_eq!(cfg.memory_pages_per_node(), 262_144);
        assert_eq!(cfg.memory_budget_pages(), 8 * 262_144);
    }

    #[test]
    fn camel_case_names_are_accepted() {
        let cfg: CostModelConfig = serde_json::from_str(
            r#"{"weightDisk":2.0,"weightNetwork":1.0,"weightSkew":0.5,"nodes":4,"maxMemoryMB":64,"addressSize":8,"skewIntervals":5}"#,
        )
        .unwrap();
        assert_eq!(cfg.weight_disk, 2.0);
        assert_eq!(cfg.max_memory_mb, 64);
        assert_eq!(cfg.skew_intervals, 5);
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
    }
}
