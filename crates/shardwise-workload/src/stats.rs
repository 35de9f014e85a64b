//! Predicate-frequency statistics over a captured workload.

use std::collections::BTreeMap;

use shardwise_core::catalog::Catalog;
use shardwise_core::workload::Workload;

/// Per collection: (operation count, field -> number of operations filtering on it).
pub fn predicate_frequencies(workload: &Workload) -> BTreeMap<String, (u64, BTreeMap<String, u64>)> {
    let mut out: BTreeMap<String, (u64, BTreeMap<String, u64>)> = BTreeMap::new();
    for op in workload.operations() {
        let entry = out.entry(op.collection.clone()).or_default();
        entry.0 += 1;
        for field in op.predicates.keys() {
            *entry.1.entry(field.clone()).or_default() += 1;
        }
    }
    out
}

/// Mark as "interesting" every catalog field referenced by at least
/// `min_ratio` of its collection's operations, most frequent first (ties by
/// name). Collections with no operations get an empty list.
pub fn derive_interesting_fields(catalog: &mut Catalog, workload: &Workload, min_ratio: f64) {
    let freqs = predicate_frequencies(workload);
    for collection in catalog.iter_mut() {
        let Some((ops, fields)) = freqs.get(&collection.name) else {
            collection.interesting.clear();
            continue;
        };
        let threshold = (*ops as f64) * min_ratio;
        let mut ranked: Vec<(&String, u64)> = fields
            .iter()
            .filter(|(f, n)| collection.has_field(f) && (**n as f64) >= threshold)
            .map(|(f, n)| (f, *n))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        collection.interesting = ranked.into_iter().map(|(f, _)| f.clone()).collect();
    }
}
