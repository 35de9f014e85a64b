#![forbid(unsafe_code)]
//! shardwise-cost: weighted cost model for candidate designs.
//!
//! Responsibilities:
//! - Route operations to nodes for a shard key (`estimator`).
//! - Score a design with three components (disk, network, skew), each keeping
//!   per-collection cached sub-costs (`cache`).
//! - Combine the components into one normalized cost and invalidate only the
//!   collections a new design changed (`model`).
//!
//! Evaluation is synchronous and single-threaded. For parallel search, give
//! each branch its own model via `CostModel::fork`.

pub mod cache;
pub mod component;
pub mod disk;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod model;
pub mod network;
pub mod skew;
pub mod state;

pub use cache::CostCache;
pub use component::CostComponent;
pub use disk::DiskCostComponent;
pub use error::{Error, Result};
pub use estimator::{NodeEstimator, Routing};
pub use metrics::{CacheStats, Diagnostics};
pub use model::{CostBreakdown, CostModel};
pub use network::NetworkCostComponent;
pub use skew::SkewCostComponent;
pub use state::State;
