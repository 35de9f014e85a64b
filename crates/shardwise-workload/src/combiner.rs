//! Denormalization-aware workload rewriting.
//!
//! When a design embeds collection `B` inside `A`, a logical request that used
//! to issue one query against `A` and one against `B` becomes a single query
//! against `A`. The combiner performs that rewrite on a captured workload:
//!
//! - a query on an embedded collection is folded into the most recent query on
//!   its root collection in the same session, or into the next one when the
//!   child was queried first; its predicates are merged under `child.field`
//!   keys and its response bytes are added to the parent's;
//! - any other operation on an embedded collection (or a query whose session
//!   has no root query at all) is re-targeted at the root, with inserts becoming
//!   updates of the parent document;
//! - operations on collections that are not embedded pass through untouched.
//!
//! The original workload is never modified; callers keep it so a later design
//! without denormalization can restore it.

use std::collections::BTreeMap;

use shardwise_core::catalog::Catalog;
use shardwise_core::design::Design;
use shardwise_core::error::DesignError;
use shardwise_core::workload::{OpType, Operation, Session, Workload};

use crate::error::Result;

pub struct WorkloadCombiner<'a> {
    catalog: &'a Catalog,
    workload: &'a Workload,
}

impl<'a> WorkloadCombiner<'a> {
    pub fn new(catalog: &'a Catalog, workload: &'a Workload) -> Self {
        Self { catalog, workload }
    }

    /// Rewrite the workload for `design`'s denormalization choices.
    pub fn process(&self, design: &Design) -> Result<Workload> {
        let mut folded = 0usize;
        let mut retargeted = 0usize;
        let mut sessions = Vec::with_capacity(self.workload.sessions.len());

        for session in &self.workload.sessions {
            let mut out = Session {
                session_id: session.session_id,
                start_time: session.start_time,
                end_time: session.end_time,
                operations: Vec::with_capacity(session.operations.len()),
            };

            // Child queries waiting for a later root query, keyed by its index.
            let mut deferred: BTreeMap<usize, Vec<&Operation>> = BTreeMap::new();

            for (i, op) in session.operations.iter().enumerate() {
                if !design.is_denormalized(&op.collection) {
                    let mut op = op.clone();
                    for child in deferred.remove(&i).into_iter().flatten() {
                        fold_into(&mut op, child);
                        folded += 1;
                    }
                    out.operations.push(op);
                    continue;
                }
                let root = design
                    .denormalization_root(&op.collection)
                    .ok_or_else(|| DesignError::DenormalizationCycle(op.collection.clone()))
                    .map_err(shardwise_core::error::Error::from)?;

                if op.op_type != OpType::Query {
                    out.operations.push(retarget(op, root));
                    retargeted += 1;
                    continue;
                }

                let earlier = out
                    .operations
                    .iter_mut()
                    .rev()
                    .find(|o| o.collection == root && o.op_type == OpType::Query);
                if let Some(parent_op) = earlier {
                    fold_into(parent_op, op);
                    folded += 1;
                    continue;
                }

                let later = session.operations[i + 1..]
                    .iter()
                    .position(|o| o.collection == root && o.op_type == OpType::Query);
                match later {
                    Some(offset) => deferred.entry(i + 1 + offset).or_default().push(op),
                    None => {
                        out.operations.push(retarget(op, root));
                        retargeted += 1;
                    }
                }
            }
            sessions.push(out);
        }

        tracing::debug!(folded, retargeted, "combined workload for design");
        Ok(Workload::new(sessions))
    }

    /// Catalog in which every denormalization root carries the bytes of the
    /// collections embedded in it. Embedded collections keep their own entry
    /// unchanged; cost components skip them.
    pub fn combine_catalog(&self, design: &Design, page_size: u64) -> Result<Catalog> {
        let mut combined = self.catalog.clone();
        let mut touched = Vec::new();

        for child_name in design.collections() {
            if !design.is_denormalized(child_name) {
                continue;
            }
            let root = design
                .denormalization_root(child_name)
                .ok_or_else(|| DesignError::DenormalizationCycle(child_name.to_string()))
                .map_err(shardwise_core::error::Error::from)?;
            let child = self
                .catalog
                .get(child_name)
                .ok_or_else(|| DesignError::UnknownCollection(child_name.to_string()))
                .map_err(shardwise_core::error::Error::from)?;
            let embedded_bytes = child.data_bytes();

            let parent = combined
                .get_mut(root)
                .ok_or_else(|| DesignError::UnknownParent {
                    collection: child_name.to_string(),
                    parent: root.to_string(),
                })
                .map_err(shardwise_core::error::Error::from)?;
            // An empty root still holds the embedded documents in one document.
            parent.doc_count = parent.doc_count.max(1);
            let per_parent = embedded_bytes.div_ceil(parent.doc_count);
            parent.avg_doc_size = parent.avg_doc_size.saturating_add(per_parent);
            touched.push(root.to_string());
        }

        for name in touched {
            if let Some(parent) = combined.get_mut(&name) {
                parent.refresh_pages(page_size);
            }
        }
        Ok(combined)
    }
}

fn namespaced(collection: &str, field: &str) -> String {
    format!("{collection}.{field}")
}

fn fold_into(parent: &mut Operation, child: &Operation) {
    for (field, kind) in &child.predicates {
        parent
            .predicates
            .entry(namespaced(&child.collection, field))
            .or_insert(*kind);
    }
    for (field, value) in &child.predicate_values {
        parent
            .predicate_values
            .entry(namespaced(&child.collection, field))
            .or_insert_with(|| value.clone());
    }
    parent.response_size = parent.response_size.saturating_add(child.response_size);
    parent.response_time = parent.response_time.max(child.response_time);
}

fn retarget(child: &Operation, root: &str) -> Operation {
    let op_type = match child.op_type {
        // Adding an embedded document updates its parent.
        OpType::Insert => OpType::Update,
        other => other,
    };
    Operation {
        collection: root.to_string(),
        op_type,
        query_id: child.query_id,
        predicates: child
            .predicates
            .iter()
            .map(|(f, k)| (namespaced(&child.collection, f), *k))
            .collect(),
        predicate_values: child
            .predicate_values
            .iter()
            .map(|(f, v)| (namespaced(&child.collection, f), v.clone()))
            .collect(),
        request_size: child.request_size,
        response_size: child.response_size,
        query_time: child.query_time,
        response_time: child.response_time,
    }
}
