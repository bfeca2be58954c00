//! # `compress`
//!
//! Compresses dataset files for distribution. Files up to 2 GiB are stored as
//! a tar archive with a single member compressed with xz, larger files as
//! gzip streams. Files in a size category directory (`tiny`, `small`, ...)
//! keep that directory in the output.
//!
//! Progress is written to a state file after every file, so an interrupted
//! run can be resumed by running the same command again. The state file is
//! removed once all files are compressed.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use unibench::{
    instances::fio::{self, Container},
    types::SizeCategory,
};
use unibench_tools::{
    checkpoint::CompressState,
    utils::{self, Verbosity},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The files or glob patterns to compress
    #[arg(required = true)]
    inputs: Vec<String>,
    /// The directory to write the compressed files to
    #[arg(short, long)]
    out_dir: PathBuf,
    /// The state file for resuming [default: <OUT_DIR>/compression_state.json]
    #[arg(long)]
    state: Option<PathBuf>,
    #[command(flatten)]
    verbosity: Verbosity,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.verbosity.init();

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let state_path = args
        .state
        .clone()
        .unwrap_or_else(|| args.out_dir.join("compression_state.json"));
    let mut state = CompressState::load(&state_path)?;
    if !state.completed.is_empty() {
        tracing::info!(
            "resuming, {} files already compressed",
            state.completed.len()
        );
    }

    let inputs = utils::expand_inputs(&args.inputs)?;
    let total = inputs.len();
    let mut failed = 0;
    for (idx, input) in inputs.iter().enumerate() {
        if state.is_completed(input) {
            tracing::debug!("skipping {}, already compressed", input.display());
            continue;
        }
        match compress(input, &args.out_dir) {
            Ok((dst, bytes_in, bytes_out)) => {
                tracing::info!(
                    "[{}/{total}] {} -> {}",
                    idx + 1,
                    input.display(),
                    dst.display()
                );
                state.mark_completed(input.clone(), bytes_in, bytes_out);
            }
            Err(err) => {
                failed += 1;
                tracing::error!("failed to compress {}: {err:#}", input.display());
                state.mark_failed(input.clone(), format!("{err:#}"));
            }
        }
        state.save(&state_path)?;
    }

    println!(
        "compressed {} files, {} -> {} bytes ({:.1}% saved)",
        state.completed.len(),
        state.bytes_in,
        state.bytes_out,
        state.ratio()
    );
    anyhow::ensure!(
        failed == 0,
        "{failed} files could not be compressed, progress kept in {}",
        state_path.display()
    );
    CompressState::remove(&state_path)?;
    Ok(())
}

/// Gets the output directory, keeping a size category parent directory
fn target_dir(input: &Path, out_dir: &Path) -> PathBuf {
    let category = input
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .and_then(|name| SizeCategory::ALL.into_iter().find(|cat| cat.as_str() == name));
    match category {
        Some(category) => out_dir.join(category.as_str()),
        None => out_dir.to_path_buf(),
    }
}

fn compress(input: &Path, out_dir: &Path) -> anyhow::Result<(PathBuf, u64, u64)> {
    let meta =
        fs::metadata(input).with_context(|| format!("failed to stat {}", input.display()))?;
    anyhow::ensure!(meta.is_file(), "{} is not a file", input.display());
    let container = Container::for_size(meta.len());
    let dir = target_dir(input, out_dir);
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let file_name = input
        .file_name()
        .with_context(|| format!("{} is not a file", input.display()))?;
    let dst = container.append_extension(dir.join(file_name));
    let bytes_in = fio::compress_file(input, &dst)
        .with_context(|| format!("failed to write {}", dst.display()))?;
    let bytes_out = fs::metadata(&dst)?.len();
    tracing::debug!("{container:?}: {bytes_in} -> {bytes_out} bytes");
    Ok((dst, bytes_in, bytes_out))
}
