//! CostModel evaluation, caching and error tests

mod test_data_gen;

use shardwise_core::catalog::Catalog;
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::error::{DesignError, Error as CoreError};
use shardwise_core::workload::Workload;
use shardwise_cost::{CostModel, Error};
use test_data_gen::*;

fn fixture_catalog() -> Catalog {
    make_catalog(&make_workload())
}

#[test]
fn test_overall_cost_is_idempotent() {
    let mut model = make_model();
    let design = design_mixed(&fixture_catalog());

    let first = model.overall_cost(&design).expect("first evaluation");
    let second = model.overall_cost(&design).expect("second evaluation");
    assert_eq!(first.to_bits(), second.to_bits());
    assert_eq!(model.last_cost(), Some(second));
}

#[test]
fn test_delta_recompute_matches_full_recompute() {
    let catalog = fixture_catalog();
    let d0 = design_on_interesting(&catalog);
    let d1 = design_mixed(&catalog);
    assert_eq!(
        d1.delta_collections(Some(&d0)).into_iter().collect::<Vec<_>>(),
        vec![COLLECTION_NAMES[1].to_string()]
    );

    let mut delta = make_model();
    delta.overall_cost(&d0).unwrap();
    let incremental = delta.overall_cost(&d1).unwrap();

    let mut full = make_model();
    full.overall_cost(&d0).unwrap();
    full.reset();
    let recomputed = full.overall_cost(&d1).unwrap();

    assert_eq!(incremental.to_bits(), recomputed.to_bits());
    assert_eq!(delta.last_breakdown(), full.last_breakdown());
}

#[test]
fn test_explicit_over_invalidation_is_harmless() {
    let catalog = fixture_catalog();
    let design = design_mixed(&catalog);
    let mut model = make_model();
    let before = model.overall_cost(&design).unwrap();

    model.invalidate_cache(&design, COLLECTION_NAMES[0]);
    model.invalidate_cache(&design, "never_cached");
    assert_eq!(model.overall_cost(&design).unwrap(), before);
}

#[test]
fn test_repeated_evaluation_hits_the_cache() {
    let design = design_mixed(&fixture_catalog());
    let mut model = make_model();
    model.overall_cost(&design).unwrap();
    let after_first = model.state().diagnostics().totals();
    assert_eq!(after_first.hits, 0);
    assert!(after_first.misses > 0);

    model.overall_cost(&design).unwrap();
    let after_second = model.state().diagnostics().totals();
    assert!(after_second.hits > after_first.hits);
    assert_eq!(after_second.misses, after_first.misses);
    assert_eq!(model.state().diagnostics().evaluations(), 2);
}

#[test]
fn test_weights_select_components() {
    let workload = make_workload();
    let catalog = make_catalog(&workload);
    let design = design_mixed(&catalog);
    let config = CostModelConfig {
        weight_disk: 0.0,
        weight_skew: 0.0,
        weight_network: 2.0,
        ..make_config()
    };
    let mut model = CostModel::new(catalog, workload, config).unwrap();
    let total = model.overall_cost(&design).unwrap();
    let breakdown = model.last_breakdown().unwrap();
    assert_eq!(total, breakdown.network);
    assert!(breakdown.disk > 0.0);
}

#[test]
fn test_zero_weight_sum_fails_before_evaluation() {
    let config = CostModelConfig {
        weight_disk: 0.0,
        weight_network: 0.0,
        weight_skew: 0.0,
        ..Default::default()
    };
    let err = CostModel::new(Catalog::new(), Workload::default(), config)
        .err()
        .expect("zero weights must be rejected");
    assert!(matches!(err, Error::Core(CoreError::Config(_))));
    assert!(!err.is_infeasible());
}

#[test]
fn test_invalid_node_and_interval_counts_are_rejected() {
    for config in [
        CostModelConfig {
            nodes: 0,
            ..Default::default()
        },
        CostModelConfig {
            skew_intervals: 0,
            ..Default::default()
        },
    ] {
        assert!(CostModel::new(Catalog::new(), Workload::default(), config).is_err());
    }
}

#[test]
fn test_unknown_collection_is_infeasible() {
    let mut model = make_model();
    let mut design = design_mixed(&fixture_catalog());
    design.add_collection("ghosts");
    let err = model.overall_cost(&design).unwrap_err();
    assert!(err.is_infeasible());
    assert!(matches!(
        err,
        Error::Core(CoreError::Design(DesignError::UnknownCollection(ref name))) if name == "ghosts"
    ));
    assert!(model.last_design().is_none());
}

#[test]
fn test_unknown_shard_key_field_is_infeasible() {
    let mut model = make_model();
    let mut design = Design::new();
    design.add_shard_key(COLLECTION_NAMES[0], ["no_such_field"]);
    let err = model.overall_cost(&design).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(CoreError::Design(DesignError::UnknownField { role: "shard key", .. }))
    ));
}

#[test]
fn test_denormalization_cycle_is_infeasible() {
    let mut model = make_model();
    let mut design = Design::new();
    design.set_denormalization_parent(COLLECTION_NAMES[0], Some(COLLECTION_NAMES[1]));
    design.set_denormalization_parent(COLLECTION_NAMES[1], Some(COLLECTION_NAMES[0]));
    let err = model.overall_cost(&design).unwrap_err();
    assert!(err.is_infeasible());
    assert!(matches!(
        err,
        Error::Core(CoreError::Design(DesignError::DenormalizationCycle(_)))
    ));
}

#[test]
fn test_infeasible_design_keeps_previous_result() {
    let mut model = make_model();
    let good = design_mixed(&fixture_catalog());
    let cost = model.overall_cost(&good).unwrap();

    let mut bad = good.clone();
    bad.add_index(COLLECTION_NAMES[0], ["missing"]);
    assert!(model.overall_cost(&bad).is_err());

    assert_eq!(model.last_design(), Some(&good));
    assert_eq!(model.last_cost(), Some(cost));
    assert_eq!(model.overall_cost(&good).unwrap(), cost);
}

#[test]
fn test_forked_models_are_independent() {
    let catalog = fixture_catalog();
    let mut model = make_model();
    let base = model.overall_cost(&design_mixed(&catalog)).unwrap();

    let mut branch = model.fork();
    let other = branch.overall_cost(&design_on_interesting(&catalog)).unwrap();
    assert!(other < base);

    assert_eq!(model.last_cost(), Some(base));
    assert_eq!(model.state().diagnostics().evaluations(), 1);
    assert_eq!(branch.state().diagnostics().evaluations(), 1);
}

#[test]
fn test_reset_clears_diagnostics_and_history() {
    let design = design_mixed(&fixture_catalog());
    let mut model = make_model();
    let cost = model.overall_cost(&design).unwrap();

    model.reset();
    assert!(model.last_design().is_none());
    assert_eq!(model.state().diagnostics().totals().misses, 0);
    assert_eq!(model.disk().cached_pages(COLLECTION_NAMES[0]), None);
    assert_eq!(model.overall_cost(&design).unwrap(), cost);
}

#[test]
fn test_embedding_into_unplaced_parent_is_infeasible() {
    let mut model = make_model();
    let parent = COLLECTION_NAMES[0];
    let child = COLLECTION_NAMES[1];

    let mut orphan = Design::new();
    orphan.set_denormalization_parent(child, Some(parent));
    let err = model.overall_cost(&orphan).unwrap_err();
    assert!(err.is_infeasible());
    assert!(matches!(
        err,
        Error::Core(CoreError::Design(DesignError::ParentNotInDesign { ref parent, .. }))
            if parent == COLLECTION_NAMES[0]
    ));
    assert!(model.last_cost().is_none());

    // Placing the parent makes the same embedding scoreable, at a real cost.
    orphan.add_collection(parent);
    let cost = model.overall_cost(&orphan).unwrap();
    assert!(cost > 0.0);
    assert!(model.last_breakdown().unwrap().network > 0.0);
}
