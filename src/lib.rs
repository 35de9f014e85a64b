//! shardwise: cost model for sharded document-database designs.
//!
//! Facade over the workspace crates:
//! - `shardwise_core`: catalog, workload, design and configuration types.
//! - `shardwise_workload`: denormalization combining and problem documents.
//! - `shardwise_cost`: the disk/network/skew cost model.

pub use shardwise_core;
pub use shardwise_cost;
pub use shardwise_workload;

pub use shardwise_core::prelude::*;
pub use shardwise_cost::{CostBreakdown, CostModel};
pub use shardwise_workload::{parse_json_problem, parse_yaml_problem, Problem};
