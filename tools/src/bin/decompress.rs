//! # `decompress`
//!
//! Restores files written by `compress`: `.xz` tar archives (or bare xz
//! streams), `.gz` and `.bz2` streams. The output keeps the file name with the
//! container extension stripped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use unibench::instances::fio::{self, Container};
use unibench_tools::utils::{self, Verbosity};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The compressed files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,
    /// The directory to write the decompressed files to
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Delete each compressed file after it was restored
    #[arg(long)]
    delete: bool,
    #[command(flatten)]
    verbosity: Verbosity,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.verbosity.init();

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let inputs = utils::expand_inputs(&args.inputs)?;
    let mut failed = 0;
    for input in &inputs {
        match decompress(input, &args.out_dir) {
            Ok((dst, bytes)) => {
                tracing::info!("{} -> {} ({bytes} bytes)", input.display(), dst.display());
                if args.delete {
                    fs::remove_file(input)
                        .with_context(|| format!("failed to delete {}", input.display()))?;
                }
            }
            Err(err) => {
                failed += 1;
                tracing::error!("failed to decompress {}: {err:#}", input.display());
            }
        }
    }
    anyhow::ensure!(failed == 0, "{failed} files could not be decompressed");
    Ok(())
}

fn decompress(input: &Path, out_dir: &Path) -> anyhow::Result<(PathBuf, u64)> {
    if Container::from_path(input) == Container::Plain {
        tracing::warn!("{} has no known container extension", input.display());
    }
    let plain = Container::strip_extension(input);
    let file_name = plain
        .file_name()
        .with_context(|| format!("{} is not a file", input.display()))?;
    let dst = out_dir.join(file_name);
    anyhow::ensure!(
        dst != input,
        "refusing to overwrite {} with itself",
        input.display()
    );
    let bytes = fio::decompress_file(input, &dst)
        .with_context(|| format!("failed to restore {}", dst.display()))?;
    Ok((dst, bytes))
}
