//! YAML/JSON problem documents: configuration, catalog, workload and named
//! candidate designs in one file.
//!
//! Example:
//! ```yaml
//! config: { nodes: 4, max_memory_mb: 512 }
//! collections:
//!   - { name: articles, fields: [_id, author], doc_count: 10000, avg_doc_size: 1024 }
//! sessions:
//!   - session_id: 1
//!     start_time: 0
//!     end_time: 1
//!     operations:
//!       - { collection: articles, type: query, predicates: { author: equality }, query_time: 0 }
//! designs:
//!   - name: by_author
//!     collections:
//!       articles: { shard_key: [author] }
//! ```

use serde::{Deserialize, Serialize};

use shardwise_core::catalog::{Catalog, Collection};
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::error::Error as CoreError;
use shardwise_core::workload::{Session, Workload};

use crate::error::{Error, Result};
use crate::stats::derive_interesting_fields;

/// Partial configuration; only the keys present override the base config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, alias = "weightDisk")]
    pub weight_disk: Option<f64>,
    #[serde(default, alias = "weightNetwork")]
    pub weight_network: Option<f64>,
    #[serde(default, alias = "weightSkew")]
    pub weight_skew: Option<f64>,
    #[serde(default)]
    pub nodes: Option<u32>,
    #[serde(default, alias = "maxMemoryMB")]
    pub max_memory_mb: Option<u64>,
    #[serde(default, alias = "addressSize")]
    pub address_size: Option<u64>,
    #[serde(default, alias = "skewIntervals")]
    pub skew_intervals: Option<u32>,
    #[serde(default, alias = "pageSize")]
    pub page_size: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut CostModelConfig) {
        if let Some(v) = self.weight_disk {
            cfg.weight_disk = v;
        }
        if let Some(v) = self.weight_network {
            cfg.weight_network = v;
        }
        if let Some(v) = self.weight_skew {
            cfg.weight_skew = v;
        }
        if let Some(v) = self.nodes {
            cfg.nodes = v;
        }
        if let Some(v) = self.max_memory_mb {
            cfg.max_memory_mb = v;
        }
        if let Some(v) = self.address_size {
            cfg.address_size = v;
        }
        if let Some(v) = self.skew_intervals {
            cfg.skew_intervals = v;
        }
        if let Some(v) = self.page_size {
            cfg.page_size = v;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignDoc {
    pub name: String,
    #[serde(default)]
    pub collections: Design,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProblemDoc {
    #[serde(default)]
    config: ConfigOverrides,
    collections: Vec<Collection>,
    #[serde(default)]
    sessions: Vec<Session>,
    #[serde(default)]
    designs: Vec<DesignDoc>,
    /// When set, recompute each collection's interesting fields from the
    /// workload with this minimum predicate ratio.
    #[serde(default)]
    interesting_ratio: Option<f64>,
}

/// A fully loaded problem. `config` holds only the document's overrides; the
/// caller layers them over defaults or environment settings.
#[derive(Debug, Clone)]
pub struct Problem {
    pub config: ConfigOverrides,
    pub catalog: Catalog,
    pub workload: Workload,
    pub designs: Vec<DesignDoc>,
}

impl Problem {
    pub fn design(&self, name: &str) -> Result<&Design> {
        self.designs
            .iter()
            .find(|d| d.name == name)
            .map(|d| &d.collections)
            .ok_or_else(|| Error::UnknownDesign(name.to_string()))
    }

    /// Layer the document's overrides over `base`.
    pub fn config_over(&self, base: CostModelConfig) -> CostModelConfig {
        let mut cfg = base;
        self.config.apply(&mut cfg);
        cfg
    }
}

pub fn parse_yaml_problem(src: &str) -> Result<Problem> {
    let doc: ProblemDoc = serde_yaml::from_str(src)?;
    build(doc)
}

pub fn parse_json_problem(src: &str) -> Result<Problem> {
    let doc: ProblemDoc = serde_json::from_str(src)?;
    build(doc)
}

fn build(doc: ProblemDoc) -> Result<Problem> {
    let mut page_cfg = CostModelConfig::default();
    doc.config.apply(&mut page_cfg);

    let mut catalog = Catalog::new();
    for mut c in doc.collections {
        if c.max_pages == 0 {
            c.refresh_pages(page_cfg.page_size);
        }
        if catalog.insert(c).is_some() {
            return Err(Error::Parse("duplicate collection name".into()));
        }
    }

    for s in &doc.sessions {
        if !s.is_monotonic() {
            return Err(CoreError::Workload(format!(
                "session {} has decreasing timestamps",
                s.session_id
            ))
            .into());
        }
    }
    let workload = Workload::new(doc.sessions);

    if let Some(ratio) = doc.interesting_ratio {
        derive_interesting_fields(&mut catalog, &workload, ratio);
    }

    Ok(Problem {
        config: doc.config,
        catalog,
        workload,
        designs: doc.designs,
    })
}
