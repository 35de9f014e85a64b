#![forbid(unsafe_code)]
//! shardwise-core: the pure data model shared by every shardwise crate.
//!
//! - `catalog`: collections and their size statistics.
//! - `workload`: captured sessions and operations with predicate metadata.
//! - `design`: candidate placements (shard key, indexes, denormalization).
//! - `config`: cost-model configuration with validation and env overrides.
//!
//! No logging, no I/O, no caches here. Cost evaluation lives in `shardwise-cost`.

pub mod catalog;
pub mod config;
pub mod design;
pub mod error;
pub mod hash;
pub mod id;
pub mod prelude;
pub mod workload;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
