//! Shared fixture for the cost-model integration tests.
//!
//! Two collections, `NUM_SESSIONS` sessions, and one query per collection per
//! session filtering by equality on the even-numbered fields. Each collection
//! holds 10M documents of 1 KiB, so the data alone overflows an 8-node, 1 GiB
//! per node cluster.
#![allow(dead_code)]

use shardwise_core::catalog::{Catalog, Collection};
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::workload::{OpType, Operation, Session, Workload};
use shardwise_cost::CostModel;
use shardwise_workload::derive_interesting_fields;

pub const COLLECTION_NAMES: [&str; 2] = ["articles", "comments"];
pub const NUM_DOCUMENTS: u64 = 10_000_000;
pub const AVG_DOC_SIZE: u64 = 1024;
pub const NUM_SESSIONS: u64 = 100;
pub const NUM_FIELDS: usize = 6;
pub const NUM_NODES: u32 = 8;
pub const NUM_INTERVALS: u32 = 10;

pub fn field_name(f: usize) -> String {
    format!("field{:02}", f)
}

pub fn make_config() -> CostModelConfig {
    CostModelConfig {
        max_memory_mb: 1024,
        skew_intervals: NUM_INTERVALS,
        address_size: 64,
        nodes: NUM_NODES,
        ..Default::default()
    }
}

/// Sessions with one equality query per collection; timestamps advance by one
/// per operation and by two between sessions.
pub fn make_workload() -> Workload {
    let mut sessions = Vec::new();
    let mut timestamp = 1_000.0;
    for i in 0..NUM_SESSIONS {
        let mut session = Session::new(i, timestamp);
        for (j, name) in COLLECTION_NAMES.iter().enumerate() {
            let query_id = (i << 16) + j as u64;
            let mut op = Operation::new(*name, OpType::Query, timestamp)
                .with_query_id(query_id)
                .with_sizes(64, AVG_DOC_SIZE);
            for f in (0..NUM_FIELDS).step_by(2) {
                op = op.with_value(field_name(f), (i * 31 + f as u64 * 7) % 101);
            }
            timestamp += 1.0;
            session.push(op.with_response_time(timestamp));
        }
        timestamp += 2.0;
        sessions.push(session);
    }
    Workload::new(sessions)
}

/// Catalog sized to `NUM_DOCUMENTS` per collection, with interesting fields
/// derived from `workload`.
pub fn make_catalog(workload: &Workload) -> Catalog {
    let mut fields = vec!["_id".to_string()];
    fields.extend((0..NUM_FIELDS).map(field_name));

    let mut catalog: Catalog = COLLECTION_NAMES
        .iter()
        .map(|name| Collection::new(*name, fields.clone()).with_stats(NUM_DOCUMENTS, AVG_DOC_SIZE))
        .collect();
    for collection in catalog.iter_mut() {
        collection.refresh_pages(make_config().page_size);
    }
    derive_interesting_fields(&mut catalog, workload, 1.0);
    catalog
}

pub fn make_model() -> CostModel {
    let workload = make_workload();
    let catalog = make_catalog(&workload);
    CostModel::new(catalog, workload, make_config()).expect("fixture config is valid")
}

pub fn interesting(catalog: &Catalog, name: &str) -> Vec<String> {
    catalog
        .get(name)
        .map(|c| c.interesting.clone())
        .unwrap_or_default()
}

/// Every collection sharded on its interesting fields.
pub fn design_on_interesting(catalog: &Catalog) -> Design {
    let mut design = Design::new();
    for name in COLLECTION_NAMES {
        design.add_collection(name);
        design.add_shard_key(name, interesting(catalog, name));
    }
    design
}

/// First collection on its interesting fields, the rest on `_id`.
pub fn design_mixed(catalog: &Catalog) -> Design {
    let mut design = Design::new();
    for (i, name) in COLLECTION_NAMES.iter().enumerate() {
        design.add_collection(*name);
        if i == 0 {
            design.add_shard_key(name, interesting(catalog, name));
        } else {
            design.add_shard_key(name, ["_id"]);
        }
    }
    design
}
