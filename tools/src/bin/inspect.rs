//! # `inspect`
//!
//! Loads unified instances (plain or compressed) and prints a short summary
//! of each, or the full instances as JSON lines.

use clap::Parser;
use itertools::Itertools;
use unibench::{instances::Instance, loader};
use unibench_tools::utils::{self, Verbosity};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The instance files or glob patterns to load
    #[arg(required = true)]
    paths: Vec<String>,
    /// Print every instance as one line of JSON
    #[arg(long)]
    json: bool,
    /// The number of edges or values to show in the summary
    #[arg(long, default_value_t = 5)]
    preview: usize,
    #[command(flatten)]
    verbosity: Verbosity,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.verbosity.init();

    let paths = utils::expand_inputs(&args.paths)?;
    let batch = loader::load_many(&paths);

    for inst in &batch.instances {
        if args.json {
            println!("{}", serde_json::to_string(inst)?);
        } else {
            print_summary(inst, args.preview);
        }
    }

    for (path, reason) in &batch.failures {
        eprintln!("{}: {reason}", path.display());
    }
    anyhow::ensure!(
        batch.is_complete(),
        "{} of {} files could not be loaded",
        batch.failures.len(),
        paths.len()
    );
    Ok(())
}

fn print_summary(inst: &Instance, preview: usize) {
    println!("{} ({})", inst.name(), inst.kind());
    if let Some(problem) = inst.meta().problem() {
        println!("  problem: {problem}");
    }
    match inst {
        Instance::Graph(graph) => {
            println!(
                "  n = {}, m = {}, k = {}, total weight = {}",
                graph.n(),
                graph.m(),
                graph.k(),
                graph.total_weight()
            );
            let degrees = graph.degrees();
            if let Some(max) = degrees.iter().max() {
                println!("  max degree = {max}");
            }
            println!(
                "  edges: {}",
                graph.edges().iter().take(preview).format(", ")
            );
        }
        Instance::NumberPartitioning(npp) => {
            println!("  n = {}, k = {}, sum = {}", npp.n(), npp.k(), npp.sum());
            println!(
                "  values: {}",
                npp.values().iter().take(preview).format(", ")
            );
        }
    }
}
