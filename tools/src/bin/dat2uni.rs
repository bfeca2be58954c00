//! # `dat2uni`
//!
//! Converts number partitioning benchmarks in the `.dat` format of Pedroso
//! and Kubo (first line `n k`, then one number per line) to unified number
//! partitioning instances, sorted into size category subdirectories.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use unibench::{instances::fio::pk, types::SizeCategory};
use unibench_tools::utils::{self, Verbosity};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The `.dat` files or glob patterns to convert
    #[arg(required = true)]
    inputs: Vec<String>,
    /// The directory to write the unified instances to
    #[arg(short, long)]
    out_dir: PathBuf,
    #[command(flatten)]
    verbosity: Verbosity,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.verbosity.init();

    let inputs = utils::expand_inputs(&args.inputs)?;
    let mut failed = 0;
    for input in &inputs {
        if let Err(err) = convert(input, &args.out_dir) {
            failed += 1;
            tracing::error!("failed to convert {}: {err:#}", input.display());
        }
    }

    println!("converted {} of {} files", inputs.len() - failed, inputs.len());
    anyhow::ensure!(failed == 0, "{failed} files could not be converted");
    Ok(())
}

fn convert(input: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let raw = pk::parse_dat(file).with_context(|| format!("failed to parse {}", input.display()))?;
    let category = SizeCategory::for_numbers(raw.values.len());
    let name = utils::instance_stem(input);
    let out_path = utils::output_path(out_dir, Some(category), &name)?;
    let mut writer = BufWriter::new(
        File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?,
    );
    raw.write_unified(&mut writer, &name)?;
    writer.flush()?;
    tracing::info!(
        "saved {} (n = {}, category {category})",
        out_path.display(),
        raw.values.len()
    );
    Ok(())
}
