//! # `col2uni`
//!
//! Converts DIMACS graph coloring benchmarks (`.col` and binary `.col.b`) to
//! unified graph coloring instances. Outputs are sorted into size category
//! subdirectories. Graphs with the same node and edge count as an already
//! converted graph of the same category are skipped.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use unibench::{
    instances::fio::dimacs,
    types::{Problem, SizeCategory},
};
use unibench_tools::utils::{self, Verbosity};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The `.col` or `.col.b` files or glob patterns to convert
    #[arg(required = true)]
    inputs: Vec<String>,
    /// The directory to write the unified instances to
    #[arg(short, long)]
    out_dir: PathBuf,
    /// The number of colors, 0 if unknown
    #[arg(short, long, default_value_t = 0)]
    k: usize,
    #[command(flatten)]
    verbosity: Verbosity,
}

enum Outcome {
    Written(PathBuf, SizeCategory),
    Duplicate,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.verbosity.init();

    let inputs = utils::expand_inputs(&args.inputs)?;
    let mut signatures = HashSet::new();
    let mut counts = [0usize; SizeCategory::ALL.len()];
    let mut failed = 0;

    for input in &inputs {
        match convert(input, &args, &mut signatures) {
            Ok(Outcome::Written(path, category)) => {
                counts[category as usize] += 1;
                tracing::info!("saved {}", path.display());
            }
            Ok(Outcome::Duplicate) => {}
            Err(err) => {
                failed += 1;
                tracing::error!("failed to convert {}: {err:#}", input.display());
            }
        }
    }

    for category in SizeCategory::ALL {
        println!("{category}: {} files", counts[category as usize]);
    }
    println!("total: {} files", counts.iter().sum::<usize>());
    anyhow::ensure!(failed == 0, "{failed} files could not be converted");
    Ok(())
}

fn convert(
    input: &Path,
    args: &Args,
    signatures: &mut HashSet<(SizeCategory, usize, usize)>,
) -> anyhow::Result<Outcome> {
    let raw = dimacs::read_col_path(input)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let category = SizeCategory::for_graph(raw.n);
    if !signatures.insert((category, raw.n, raw.m())) {
        tracing::info!(
            "skipping {}: graph with n = {} and m = {} already converted in category {category}",
            input.display(),
            raw.n,
            raw.m()
        );
        return Ok(Outcome::Duplicate);
    }
    let name = utils::instance_stem(input);
    let out_path = utils::output_path(&args.out_dir, Some(category), &name)?;
    let mut writer = BufWriter::new(
        File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?,
    );
    raw.write_unified(&mut writer, Problem::GraphColoring, &name, args.k)?;
    writer.flush()?;
    Ok(Outcome::Written(out_path, category))
}
