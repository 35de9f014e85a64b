//! Convenient re-exports for downstream crates.

pub use crate::catalog::{Catalog, Collection, DEFAULT_PAGE_SIZE};
pub use crate::config::CostModelConfig;
pub use crate::design::{Design, Placement};
pub use crate::error::{DesignError, Error, Result};
pub use crate::id::CollectionId;
pub use crate::workload::{OpType, Operation, PredicateKind, Session, Workload};
