//! # Parsing Matrix Market Files
//!
//! Sparse matrices of the SuiteSparse collection are interpreted as graphs:
//! every off-diagonal non-zero `(row, col, value)` becomes an undirected edge
//! with weight `|value|`, truncated to an integer. Only the coordinate format
//! is supported.
//!
//! ## References
//!
//! - [Matrix Market exchange formats](https://math.nist.gov/MatrixMarket/formats.html)

use std::io::{self, BufRead, BufReader, Read};

use thiserror::Error;
use tracing::debug;

use crate::instances::EdgeNormalizer;

use super::unified::RawGraph;

/// Errors occuring within the Matrix Market parsing module
#[derive(Error, Debug)]
pub enum Error {
    /// The matrix is stored in the dense array format
    #[error("array format matrices are not supported")]
    ArrayFormat,
    /// The file does not have a size line
    #[error("no size line")]
    NoSizeLine,
    /// Invalid size line
    #[error("invalid size line: {0}")]
    SizeLine(String),
    /// IO error reading file
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SizeLine(l0), Self::SizeLine(r0)) => l0 == r0,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// Parses a coordinate format matrix from a reader (typically a (compressed)
/// file) as a graph with `max(rows, cols)` nodes
///
/// Diagonal entries and entries that fail to parse are skipped. Entries for
/// the same unordered pair are merged, keeping the weight seen last.
///
/// # Errors
///
/// If reading fails, the banner declares the array format or the size line is
/// missing or malformed.
pub fn parse_matrix<R: Read>(reader: R) -> Result<RawGraph, Error> {
    let mut lines = BufReader::new(reader).lines();
    let (rows, cols) = loop {
        let Some(line) = lines.next() else {
            return Err(Error::NoSizeLine);
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.starts_with('%') {
            if is_array_banner(trimmed) {
                return Err(Error::ArrayFormat);
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        break parse_size_line(trimmed).ok_or_else(|| Error::SizeLine(line.clone()))?;
    };

    let mut norm = EdgeNormalizer::new();
    let mut skipped = 0;
    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        match parse_entry(trimmed) {
            Some((row, col, weight)) => norm.add(row, col, weight),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("skipped {skipped} invalid matrix entries");
    }
    Ok(RawGraph {
        n: rows.max(cols),
        edges: norm
            .into_edges()
            .into_iter()
            .map(|e| (e.u, e.v, e.w))
            .collect(),
    })
}

fn is_array_banner(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    tokens
        .next()
        .is_some_and(|tok| tok.eq_ignore_ascii_case("%%MatrixMarket"))
        && tokens.any(|tok| tok.eq_ignore_ascii_case("array"))
}

fn parse_size_line(line: &str) -> Option<(usize, usize)> {
    let mut tokens = line.split_whitespace();
    let rows = tokens.next()?.parse().ok()?;
    let cols = tokens.next()?.parse().ok()?;
    Some((rows, cols))
}

fn parse_entry(line: &str) -> Option<(usize, usize, i64)> {
    let mut tokens = line.split_whitespace();
    let row = tokens.next()?.parse().ok()?;
    let col = tokens.next()?.parse().ok()?;
    let weight = match tokens.next() {
        #[allow(clippy::cast_possible_truncation)]
        Some(value) => value.parse::<f64>().ok()?.abs().trunc() as i64,
        None => 1,
    };
    Some((row, col, weight))
}
