//! # Shared Helpers for the Tools

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unibench::types::SizeCategory;

/// Suffixes stripped from input file names to get the instance name
const RAW_SUFFIXES: [&str; 8] = [
    ".col.b",
    ".col",
    ".graph.bz2",
    ".graph",
    ".mtx",
    ".dat",
    ".txt",
    ".b",
];

/// Verbosity flag shared by all tools
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct Verbosity {
    /// Increase the log level (`-v` for debug, `-vv` for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Verbosity {
    /// The log filter directive for the verbosity level
    #[must_use]
    pub fn filter(self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Installs the global log subscriber
    ///
    /// `RUST_LOG` takes precedence over the verbosity flag.
    pub fn init(self) {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.filter())))
            .init();
    }
}

/// Expands input arguments that may be glob patterns
///
/// Paths are returned in pattern order, each path only once. A plain path
/// is kept even if it does not exist, so that the caller reports it. A glob
/// pattern matching nothing is logged and skipped.
///
/// # Errors
///
/// If a pattern is malformed or a matched path can not be read.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern '{pattern}'"))? {
            let path = entry.context("failed to read glob match")?;
            matched = true;
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
        if !matched {
            if pattern.contains(&['*', '?', '['][..]) {
                tracing::warn!("'{pattern}' did not match any file");
            } else if seen.insert(PathBuf::from(pattern)) {
                paths.push(PathBuf::from(pattern));
            }
        }
    }
    Ok(paths)
}

/// Gets the instance name from a raw or unified file name
///
/// One known format suffix is stripped, other names lose their last
/// extension.
#[must_use]
pub fn instance_stem<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    for suffix in RAW_SUFFIXES {
        if let Some(stem) = file_name.strip_suffix(suffix) {
            if !stem.is_empty() {
                return stem.to_owned();
            }
        }
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or(file_name)
}

/// Builds the output path `<out_dir>[/<category>]/<stem>.txt`, creating the
/// directory if needed
///
/// # Errors
///
/// If the output directory can not be created.
pub fn output_path<P: AsRef<Path>>(
    out_dir: P,
    category: Option<SizeCategory>,
    stem: &str,
) -> anyhow::Result<PathBuf> {
    let mut dir = out_dir.as_ref().to_path_buf();
    if let Some(category) = category {
        dir.push(category.as_str());
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    Ok(dir.join(format!("{stem}.txt")))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use unibench::types::SizeCategory;

    #[test]
    fn stems() {
        assert_eq!(super::instance_stem("raw/myciel3.col"), "myciel3");
        assert_eq!(super::instance_stem("raw/myciel3.col.b"), "myciel3");
        assert_eq!(super::instance_stem("DIMACS10/add20.graph.bz2"), "add20");
        assert_eq!(super::instance_stem("bcsstk01.mtx"), "bcsstk01");
        assert_eq!(super::instance_stem("n010.dat"), "n010");
        assert_eq!(super::instance_stem("archive.tar"), "archive");
    }

    #[test]
    fn output_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = super::output_path(dir.path(), Some(SizeCategory::Small), "g").unwrap();
        assert_eq!(path, dir.path().join("small").join("g.txt"));
        assert!(dir.path().join("small").is_dir());
        let flat = super::output_path(dir.path(), None, "h").unwrap();
        assert_eq!(flat, dir.path().join("h.txt"));
    }

    #[test]
    fn globs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.col", "a.col", "c.dat"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let col = format!("{}/*.col", dir.path().display());
        let dat = format!("{}/c.dat", dir.path().display());
        let missing = format!("{}/*.mtx", dir.path().display());
        let paths = super::expand_inputs(&[col.clone(), dat, missing, col]).unwrap();
        let names: Vec<&Path> = paths.iter().map(|p| Path::new(p.file_name().unwrap())).collect();
        assert_eq!(names, vec![Path::new("a.col"), Path::new("b.col"), Path::new("c.dat")]);
    }

    #[test]
    fn missing_plain_path_kept() {
        let paths = super::expand_inputs(&["/definitely/not/here.col"]).unwrap();
        assert_eq!(paths, vec![std::path::PathBuf::from("/definitely/not/here.col")]);
    }

    #[test]
    fn bad_glob() {
        assert!(super::expand_inputs(&["[*"]).is_err());
    }

    #[test]
    fn verbosity_filters() {
        assert_eq!(super::Verbosity { verbose: 0 }.filter(), "info");
        assert_eq!(super::Verbosity { verbose: 1 }.filter(), "debug");
        assert_eq!(super::Verbosity { verbose: 4 }.filter(), "trace");
    }
}
