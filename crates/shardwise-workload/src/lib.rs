#![forbid(unsafe_code)]
//! shardwise-workload: workload rewriting and loading.
//!
//! - `combiner`: folds operations on denormalized (embedded) collections into
//!   their parent, and inflates the parent's catalog entry to match.
//! - `stats`: predicate-frequency statistics (interesting fields).
//! - `dsl`: YAML/JSON problem documents (config + catalog + sessions + designs).

pub mod combiner;
pub mod dsl;
pub mod error;
pub mod stats;

pub use combiner::WorkloadCombiner;
pub use dsl::yaml::{parse_json_problem, parse_yaml_problem, Problem};
pub use error::{Error, Result};
pub use stats::{derive_interesting_fields, predicate_frequencies};
