//! # Resumable Progress for Batch Compression
//!
//! The state is persisted as JSON after every file. Saving writes a temporary
//! file next to the state file and renames it over the old state, so an
//! interrupted run leaves either the old or the new state behind.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Progress of a batch compression run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressState {
    /// Input files that were compressed successfully
    pub completed: BTreeSet<PathBuf>,
    /// Input files that failed with the error message of the last attempt
    pub failed: BTreeMap<PathBuf, String>,
    /// Total number of input bytes compressed so far
    pub bytes_in: u64,
    /// Total number of output bytes written so far
    pub bytes_out: u64,
}

impl CompressState {
    /// Loads the state from a file, starting fresh if it does not exist
    ///
    /// # Errors
    ///
    /// If the file exists but can not be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read state {}", path.display()))
            }
        };
        serde_json::from_str(&raw).with_context(|| format!("corrupt state file {}", path.display()))
    }

    /// Atomically replaces the state file with the current state
    ///
    /// # Errors
    ///
    /// If the temporary file can not be written or renamed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temporary state in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("failed to replace state {}", path.display()))?;
        Ok(())
    }

    /// Deletes the state file if it exists
    ///
    /// # Errors
    ///
    /// If the file exists but can not be removed.
    pub fn remove<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }

    /// Checks whether a file was already compressed
    #[must_use]
    pub fn is_completed<P: AsRef<Path>>(&self, file: P) -> bool {
        self.completed.contains(file.as_ref())
    }

    /// Records a successfully compressed file
    pub fn mark_completed<P: Into<PathBuf>>(&mut self, file: P, bytes_in: u64, bytes_out: u64) {
        let file = file.into();
        self.failed.remove(&file);
        self.completed.insert(file);
        self.bytes_in += bytes_in;
        self.bytes_out += bytes_out;
    }

    /// Records a failed file
    pub fn mark_failed<P: Into<PathBuf>, S: ToString>(&mut self, file: P, reason: S) {
        self.failed.insert(file.into(), reason.to_string());
    }

    /// Space saved relative to the input in percent
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = (1. - self.bytes_out as f64 / self.bytes_in as f64) * 100.;
        ratio
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::CompressState;

    #[test]
    fn fresh_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let state = CompressState::load(dir.path().join("state.json")).unwrap();
        assert_eq!(state, CompressState::default());
    }

    #[test]
    fn save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut state = CompressState::default();
        state.mark_failed("a.txt", "broken");
        state.mark_completed("a.txt", 100, 25);
        state.mark_failed("b.txt", "io error");
        state.save(&path).unwrap();
        let loaded = CompressState::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert!(loaded.is_completed("a.txt"));
        assert!(!loaded.is_completed(Path::new("b.txt")));
        assert!(loaded.failed.get(Path::new("a.txt")).is_none());
        assert!((loaded.ratio() - 75.).abs() < 1e-9);
    }

    #[test]
    fn overwrite_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut state = CompressState::default();
        state.save(&path).unwrap();
        state.mark_completed("x.txt", 1, 1);
        state.save(&path).unwrap();
        assert_eq!(CompressState::load(&path).unwrap().completed.len(), 1);
        // no temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        CompressState::remove(&path).unwrap();
        assert!(!path.exists());
        CompressState::remove(&path).unwrap();
    }

    #[test]
    fn corrupt_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(CompressState::load(&path).is_err());
    }
}
