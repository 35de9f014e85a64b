//! Disk cost component tests

mod test_data_gen;

use std::sync::Arc;

use shardwise_core::catalog::{Catalog, Collection};
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::workload::Workload;
use shardwise_cost::{CostComponent, CostModel, Diagnostics, DiskCostComponent, State};
use test_data_gen::*;

const PAGE: u64 = 4096;

/// Two nodes with 1 MB each: 256 pages per node, 512 in total.
fn small_config() -> CostModelConfig {
    CostModelConfig {
        nodes: 2,
        max_memory_mb: 1,
        page_size: PAGE,
        address_size: 8,
        ..Default::default()
    }
}

fn state_with_pages(data_pages: u64) -> State {
    let catalog: Catalog = [Collection::new("events", ["_id", "kind"]).with_stats(data_pages, PAGE)]
        .into_iter()
        .collect();
    State::new(catalog, Workload::default(), small_config()).unwrap()
}

fn events_design() -> Design {
    let mut design = Design::new();
    design.add_collection("events");
    design
}

#[test]
fn test_disk_cost_zero_within_budget() {
    assert_eq!(small_config().memory_budget_pages(), 512);

    let mut component = DiskCostComponent::new(Arc::new(Diagnostics::new()));
    for pages in [0, 1, 511, 512] {
        component.reset();
        let cost = component
            .get_cost(&state_with_pages(pages), &events_design())
            .unwrap();
        assert_eq!(cost, 0.0, "{} pages fit in a 512 page budget", pages);
    }
}

#[test]
fn test_disk_cost_positive_just_above_budget() {
    let mut component = DiskCostComponent::new(Arc::new(Diagnostics::new()));
    let cost = component
        .get_cost(&state_with_pages(513), &events_design())
        .unwrap();
    assert_eq!(cost, 1.0 / 512.0);
}

#[test]
fn test_disk_cost_grows_with_overage() {
    let mut last = 0.0;
    for pages in [600, 1024, 4096] {
        let mut component = DiskCostComponent::new(Arc::new(Diagnostics::new()));
        let cost = component
            .get_cost(&state_with_pages(pages), &events_design())
            .unwrap();
        assert!(cost > last);
        last = cost;
    }
}

#[test]
fn test_indexes_add_pages() {
    let state = state_with_pages(512);
    let mut component = DiskCostComponent::new(Arc::new(Diagnostics::new()));
    let plain = events_design();
    assert_eq!(component.get_cost(&state, &plain).unwrap(), 0.0);
    assert_eq!(component.cached_pages("events"), Some(512));

    // 512 docs * 8 bytes * 2 fields = 8192 bytes = 2 pages.
    let mut indexed = plain.clone();
    indexed.add_index("events", ["_id", "kind"]);
    component.invalidate_cache(&indexed, "events");
    assert!(component.get_cost(&state, &indexed).unwrap() > 0.0);
    assert_eq!(component.cached_pages("events"), Some(514));
}

#[test]
fn test_fixture_overflows_cluster_memory() {
    let mut model = make_model();
    let catalog = model.state().original_catalog().clone();
    model.overall_cost(&design_mixed(&catalog)).unwrap();

    let per_collection = (NUM_DOCUMENTS * AVG_DOC_SIZE).div_ceil(make_config().page_size);
    assert_eq!(model.disk().cached_pages(COLLECTION_NAMES[0]), Some(per_collection));

    let budget = make_config().memory_budget_pages();
    let expected = (2 * per_collection - budget) as f64 / budget as f64;
    assert_eq!(model.last_breakdown().unwrap().disk, expected);
}

#[test]
fn test_denormalized_child_is_not_double_counted() {
    // Parent 100 docs, child 300 docs of 1 KiB. Embedding spreads the child's
    // bytes over the parent's documents.
    let catalog: Catalog = [
        Collection::new("posts", ["_id"]).with_stats(100, 1024),
        Collection::new("replies", ["_id", "post"]).with_stats(300, 1024),
    ]
    .into_iter()
    .collect();
    let config = CostModelConfig {
        page_size: 1024,
        ..Default::default()
    };
    let mut model = CostModel::new(catalog, Workload::default(), config).unwrap();

    let mut flat = Design::new();
    flat.add_collection("posts");
    flat.add_collection("replies");
    model.overall_cost(&flat).unwrap();
    assert_eq!(model.disk().cached_pages("posts"), Some(100));
    assert_eq!(model.disk().cached_pages("replies"), Some(300));

    let mut nested = flat.clone();
    nested.set_denormalization_parent("replies", Some("posts"));
    model.overall_cost(&nested).unwrap();
    assert_eq!(model.disk().cached_pages("posts"), Some(400));
    assert_eq!(model.disk().cached_pages("replies"), None);
}
