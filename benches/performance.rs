use criterion::{criterion_group, criterion_main, Criterion};
use shardwise_core::catalog::{Catalog, Collection};
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_core::workload::{OpType, Operation, Session, Workload};
use shardwise_cost::CostModel;

const COLLECTIONS: usize = 12;
const SESSIONS: u64 = 500;

fn collection_name(c: usize) -> String {
    format!("coll{:02}", c)
}

fn make_problem() -> (Catalog, Workload) {
    let catalog: Catalog = (0..COLLECTIONS)
        .map(|c| {
            Collection::new(collection_name(c), ["_id", "owner", "kind"])
                .with_stats(1_000_000, 512)
        })
        .collect();

    let mut sessions = Vec::with_capacity(SESSIONS as usize);
    let mut t = 0.0;
    for s in 0..SESSIONS {
        let mut session = Session::new(s, t);
        for c in 0..COLLECTIONS {
            let op = Operation::new(collection_name(c), OpType::Query, t)
                .with_value("owner", (s * 13 + c as u64) % 97)
                .with_query_id((s << 16) + c as u64);
            session.push(op);
            t += 1.0;
        }
        sessions.push(session);
    }
    (catalog, Workload::new(sessions))
}

fn make_design(flip: usize) -> Design {
    let mut design = Design::new();
    for c in 0..COLLECTIONS {
        let name = collection_name(c);
        if c == flip {
            design.add_shard_key(&name, ["_id"]);
        } else {
            design.add_shard_key(&name, ["owner"]);
        }
        design.add_index(&name, ["kind"]);
    }
    design
}

fn config() -> CostModelConfig {
    CostModelConfig {
        nodes: 16,
        skew_intervals: 20,
        ..Default::default()
    }
}

fn bench_overall_cost(c: &mut Criterion) {
    let (catalog, workload) = make_problem();
    let d0 = make_design(0);
    let d1 = make_design(1);

    let mut full = CostModel::new(catalog.clone(), workload.clone(), config()).unwrap();
    c.bench_function("overall_cost_full", |b| {
        b.iter(|| {
            full.reset();
            let _ = full.overall_cost(&d1).unwrap();
        })
    });

    // Alternating between two designs re-walks two collections per call.
    let mut delta = CostModel::new(catalog, workload, config()).unwrap();
    let mut flip = false;
    c.bench_function("overall_cost_delta", |b| {
        b.iter(|| {
            flip = !flip;
            let design = if flip { &d0 } else { &d1 };
            let _ = delta.overall_cost(design).unwrap();
        })
    });
}

criterion_group!(cost_model, bench_overall_cost);
criterion_main!(cost_model);
