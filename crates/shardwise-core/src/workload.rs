//! Captured workload: sessions of timestamped operations.
//!
//! Timestamps are seconds (fractional allowed) and must be monotonic within a
//! session. Only predicate *kinds* matter for routing; predicate *values* are
//! optional and only used to pick a concrete node for skew accounting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    Query,
    Insert,
    Update,
    Delete,
}

impl OpType {
    pub fn as_str(self) -> &'static str {
        match self {
            OpType::Query => "query",
            OpType::Insert => "insert",
            OpType::Update => "update",
            OpType::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    Equality,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub collection: String,
    #[serde(rename = "type")]
    pub op_type: OpType,
    #[serde(default)]
    pub query_id: u64,
    #[serde(default)]
    pub predicates: BTreeMap<String, PredicateKind>,
    /// Equality values by field, when the capture kept them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub predicate_values: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub request_size: u64,
    #[serde(default)]
    pub response_size: u64,
    pub query_time: f64,
    #[serde(default)]
    pub response_time: f64,
}

impl Operation {
    pub fn new(collection: impl Into<String>, op_type: OpType, query_time: f64) -> Self {
        Self {
            collection: collection.into(),
            op_type,
            query_id: 0,
            predicates: BTreeMap::new(),
            predicate_values: BTreeMap::new(),
            request_size: 0,
            response_size: 0,
            query_time,
            response_time: query_time,
        }
    }

    pub fn with_predicate(mut self, field: impl Into<String>, kind: PredicateKind) -> Self {
        self.predicates.insert(field.into(), kind);
        self
    }

    /// Equality predicate with its value.
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let field = field.into();
        self.predicates.insert(field.clone(), PredicateKind::Equality);
        self.predicate_values.insert(field, value.into());
        self
    }

    pub fn with_query_id(mut self, query_id: u64) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn with_sizes(mut self, request_size: u64, response_size: u64) -> Self {
        self.request_size = request_size;
        self.response_size = response_size;
        self
    }

    pub fn with_response_time(mut self, response_time: f64) -> Self {
        self.response_time = response_time;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: u64,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Session {
    pub fn new(session_id: u64, start_time: f64) -> Self {
        Self {
            session_id,
            start_time,
            end_time: start_time,
            operations: Vec::new(),
        }
    }

    /// Append an operation and stretch `end_time` to cover it.
    pub fn push(&mut self, op: Operation) {
        self.end_time = self.end_time.max(op.response_time).max(op.query_time);
        self.operations.push(op);
    }

    /// True when query timestamps never decrease.
    pub fn is_monotonic(&self) -> bool {
        self.operations
            .windows(2)
            .all(|w| w[0].query_time <= w[1].query_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workload {
    pub sessions: Vec<Session>,
}

impl Workload {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.sessions.iter().flat_map(|s| s.operations.iter())
    }

    pub fn operations_on<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a Operation> {
        self.operations().filter(move |op| op.collection == collection)
    }

    pub fn operation_count(&self) -> usize {
        self.sessions.iter().map(|s| s.operations.len()).sum()
    }

    /// `[min, max]` over operation query timestamps, `None` when empty.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        self.operations().fold(None, |acc, op| match acc {
            None => Some((op.query_time, op.query_time)),
            Some((lo, hi)) => Some((lo.min(op.query_time), hi.max(op.query_time))),
        })
    }

    /// Drop every operation on `collection`. Returns how many were removed.
    pub fn remove_collection(&mut self, collection: &str) -> usize {
        let mut removed = 0;
        for s in &mut self.sessions {
            let before = s.operations.len();
            s.operations.retain(|op| op.collection != collection);
            removed += before - s.operations.len();
        }
        removed
    }
}
