//! shardwise CLI: score candidate designs from a problem document.

use clap::{Parser, Subcommand};
use shardwise_core::config::CostModelConfig;
use shardwise_core::design::Design;
use shardwise_cost::{CostModel, DiskCostComponent};
use shardwise_workload::{parse_json_problem, parse_yaml_problem, Problem};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shardwise")]
#[command(about = "Cost model for sharded document-database designs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the designs of a problem document
    Evaluate {
        /// Path to the problem document (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        problem: PathBuf,

        /// Only evaluate the design with this name
        #[arg(short, long)]
        design: Option<String>,

        /// Number of nodes (overrides config)
        #[arg(long)]
        nodes: Option<u32>,

        /// Per-node memory in MB (overrides config)
        #[arg(long)]
        max_memory_mb: Option<u64>,
    },

    /// Check a problem document and every design in it
    Validate {
        #[arg(short, long)]
        problem: PathBuf,
    },

    /// Show per-collection cost details for one design
    Explain {
        #[arg(short, long)]
        problem: PathBuf,

        #[arg(short, long)]
        design: String,

        #[arg(long)]
        nodes: Option<u32>,

        #[arg(long)]
        max_memory_mb: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            problem,
            design,
            nodes,
            max_memory_mb,
        } => {
            if let Err(e) = evaluate(&problem, design.as_deref(), nodes, max_memory_mb) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { problem } => {
            if let Err(e) = validate(&problem) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
            println!("✓ Problem is valid");
        }
        Commands::Explain {
            problem,
            design,
            nodes,
            max_memory_mb,
        } => {
            if let Err(e) = explain(&problem, &design, nodes, max_memory_mb) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_problem(path: &Path) -> Result<Problem, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(path)?;
    let problem = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json_problem(&src)?,
        _ => parse_yaml_problem(&src)?,
    };
    tracing::debug!(
        path = %path.display(),
        collections = problem.catalog.len(),
        operations = problem.workload.operation_count(),
        designs = problem.designs.len(),
        "loaded problem"
    );
    Ok(problem)
}

/// Environment first, then the document, then command-line flags.
fn layered_config(problem: &Problem, nodes: Option<u32>, max_memory_mb: Option<u64>) -> CostModelConfig {
    let mut config = problem.config_over(CostModelConfig::from_env());
    apply_cli_overrides(&mut config, nodes, max_memory_mb);
    config
}

fn apply_cli_overrides(cfg: &mut CostModelConfig, nodes: Option<u32>, max_memory_mb: Option<u64>) {
    if let Some(n) = nodes {
        cfg.nodes = n;
    }
    if let Some(mb) = max_memory_mb {
        cfg.max_memory_mb = mb;
    }
}

fn evaluate(
    path: &Path,
    only: Option<&str>,
    nodes: Option<u32>,
    max_memory_mb: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let problem = load_problem(path)?;
    let config = layered_config(&problem, nodes, max_memory_mb);

    let designs: Vec<(&str, &Design)> = match only {
        Some(name) => vec![(name, problem.design(name)?)],
        None => problem
            .designs
            .iter()
            .map(|d| (d.name.as_str(), &d.collections))
            .collect(),
    };
    if designs.is_empty() {
        return Err("problem document has no designs".into());
    }

    let mut model = CostModel::new(problem.catalog.clone(), problem.workload.clone(), config)?;
    println!("{:<24} {:>10} {:>10} {:>10} {:>10}", "design", "cost", "disk", "network", "skew");
    for (name, design) in designs {
        match model.overall_cost(design) {
            Ok(_) => {
                if let Some(b) = model.last_breakdown() {
                    println!(
                        "{:<24} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                        name, b.total, b.disk, b.network, b.skew
                    );
                }
            }
            Err(e) if e.is_infeasible() => println!("{:<24} infeasible: {}", name, e),
            Err(e) => return Err(e.into()),
        }
    }

    let totals = model.state().diagnostics().totals();
    println!();
    println!(
        "Cache: {} hits, {} misses ({:.1}% hit ratio)",
        totals.hits,
        totals.misses,
        totals.hit_ratio() * 100.0
    );
    Ok(())
}

fn validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let problem = load_problem(path)?;
    problem.config_over(CostModelConfig::default()).validate()?;
    for doc in &problem.designs {
        doc.collections
            .validate(&problem.catalog)
            .map_err(|e| format!("design {}: {}", doc.name, e))?;
    }
    Ok(())
}

fn explain(
    path: &Path,
    name: &str,
    nodes: Option<u32>,
    max_memory_mb: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let problem = load_problem(path)?;
    let config = layered_config(&problem, nodes, max_memory_mb);
    let design = problem.design(name)?.clone();

    let mut model = CostModel::new(problem.catalog.clone(), problem.workload.clone(), config)?;
    let cost = model.overall_cost(&design)?;
    let state = model.state();
    let cfg = state.config();

    println!("Design {} ({})", name, design.fingerprint()?.to_hex());
    println!("==========================");
    println!();
    println!(
        "Cluster: {} nodes, {} MB per node, {} pages budget",
        cfg.nodes,
        cfg.max_memory_mb,
        cfg.memory_budget_pages()
    );
    println!(
        "Weights: disk {} / network {} / skew {}",
        cfg.weight_disk, cfg.weight_network, cfg.weight_skew
    );
    println!();

    for collection in design.collections() {
        println!("{}", collection);
        if let Some(parent) = design.denormalization_parent(collection) {
            println!("  embedded in {}", parent);
            continue;
        }
        println!("  shard key: {:?}", design.shard_key(collection));
        let pages = match model.disk().cached_pages(collection) {
            Some(p) => p,
            None => DiskCostComponent::collection_pages(state.catalog(), &design, collection, cfg)?,
        };
        println!("  pages: {}", pages);
        if let Some(classes) = model.network().cached_breakdown(collection) {
            for (op_type, class) in classes {
                println!(
                    "  {}: {} ops, {} node contacts",
                    op_type.as_str(),
                    class.operations,
                    class.nodes_contacted
                );
            }
        }
        if let Some(buckets) = model.skew().cached_buckets(collection) {
            let rendered: Vec<String> = buckets
                .iter()
                .map(|b| b.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v)))
                .collect();
            println!("  skew by interval: [{}]", rendered.join(", "));
        }
    }

    if let Some(b) = model.last_breakdown() {
        println!();
        println!("Disk:    {:.4}", b.disk);
        println!("Network: {:.4}", b.network);
        println!("Skew:    {:.4}", b.skew);
    }
    println!("Total:   {:.4}", cost);
    Ok(())
}
