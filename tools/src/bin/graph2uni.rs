//! # `graph2uni`
//!
//! Converts graph partitioning benchmarks to unified graph partitioning
//! instances. DIMACS10 METIS files (`.graph`, optionally bzip2 compressed)
//! and Matrix Market files (`.mtx`) are supported. Matrices that do not
//! yield a single off-diagonal edge are skipped.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use unibench::{
    instances::fio::{self, metis, mtx, unified::RawGraph},
    types::Problem,
};
use unibench_tools::utils::{self, Verbosity};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The `.graph`, `.graph.bz2` or `.mtx` files or glob patterns to convert
    #[arg(required = true)]
    inputs: Vec<String>,
    /// The directory to write the unified instances to
    #[arg(short, long)]
    out_dir: PathBuf,
    /// The number of parts
    #[arg(short, long, default_value_t = 2)]
    k: usize,
    #[command(flatten)]
    verbosity: Verbosity,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.verbosity.init();

    let inputs = utils::expand_inputs(&args.inputs)?;
    let mut written = 0;
    let mut failed = 0;
    for input in &inputs {
        match convert(input, &args) {
            Ok(true) => written += 1,
            Ok(false) => tracing::warn!("skipping {}: no edges", input.display()),
            Err(err) => {
                failed += 1;
                tracing::error!("failed to convert {}: {err:#}", input.display());
            }
        }
    }

    println!("converted {written} of {} files", inputs.len());
    anyhow::ensure!(failed == 0, "{failed} files could not be converted");
    Ok(())
}

fn is_matrix_market(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mtx"))
}

/// Converts one file, returning `false` if it was skipped
fn convert(input: &Path, args: &Args) -> anyhow::Result<bool> {
    let reader = fio::open_compressed_uncompressed_read(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let raw: RawGraph = if is_matrix_market(input) {
        let raw = mtx::parse_matrix(reader)
            .with_context(|| format!("failed to parse matrix {}", input.display()))?;
        if raw.edges.is_empty() {
            return Ok(false);
        }
        raw
    } else {
        metis::parse_graph(reader)
            .with_context(|| format!("failed to parse graph {}", input.display()))?
    };
    let name = utils::instance_stem(input);
    let out_path = utils::output_path(&args.out_dir, None, &name)?;
    let mut writer = BufWriter::new(
        File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?,
    );
    raw.write_unified(&mut writer, Problem::GraphPartitioning, &name, args.k)?;
    writer.flush()?;
    tracing::info!(
        "saved {} (n = {}, m = {})",
        out_path.display(),
        raw.n,
        raw.m()
    );
    Ok(true)
}
