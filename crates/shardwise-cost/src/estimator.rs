//! Shard routing estimates.
//!
//! A router can only narrow an operation to one shard when every shard-key
//! field is constrained by equality. Anything else (missing field, range
//! predicate, unsharded collection) is a broadcast to every node.

use std::collections::BTreeMap;

use shardwise_core::hash::hash_serde;
use shardwise_core::workload::{Operation, PredicateKind};

use crate::error::Result;

/// Where an operation is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Exactly one node, by index in `0..nodes`.
    Single(u32),
    Broadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEstimator {
    nodes: u32,
}

impl NodeEstimator {
    pub fn new(nodes: u32) -> Self {
        Self { nodes: nodes.max(1) }
    }

    pub fn nodes(&self) -> u32 {
        self.nodes
    }

    /// Number of nodes an operation with these predicates must contact.
    pub fn estimate(&self, shard_key: &[String], predicates: &BTreeMap<String, PredicateKind>) -> u32 {
        if Self::is_targeted(shard_key, predicates) {
            1
        } else {
            self.nodes
        }
    }

    /// Concrete routing for `op`. Targeted operations land on the node chosen
    /// by hashing their shard-key values; without captured values the query id
    /// stands in for them.
    pub fn route(&self, shard_key: &[String], op: &Operation) -> Result<Routing> {
        if !Self::is_targeted(shard_key, &op.predicates) {
            return Ok(Routing::Broadcast);
        }
        if self.nodes == 1 {
            return Ok(Routing::Single(0));
        }
        let values: Option<Vec<&serde_json::Value>> = shard_key
            .iter()
            .map(|f| op.predicate_values.get(f))
            .collect();
        let digest = match values {
            Some(values) => hash_serde(&values)?,
            None => hash_serde(&(op.collection.as_str(), op.query_id))?,
        };
        let node = digest.prefix_u64() % u64::from(self.nodes);
        // `node < nodes <= u32::MAX`
        Ok(Routing::Single(node as u32))
    }

    fn is_targeted(shard_key: &[String], predicates: &BTreeMap<String, PredicateKind>) -> bool {
        !shard_key.is_empty()
            && shard_key
                .iter()
                .all(|f| predicates.get(f) == Some(&PredicateKind::Equality))
    }
}

impl Routing {
    pub fn node_count(self, nodes: u32) -> u32 {
        match self {
            Routing::Single(_) => 1,
            Routing::Broadcast => nodes,
        }
    }
}
