//! # Common Types for Benchmark Instances
//!
//! Edges, problem identifiers and size categories shared by the instance
//! representations and the file parsers.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The hasher used in this crate
#[cfg(feature = "fxhash")]
pub type RsHasher = rustc_hash::FxHasher;
/// The hasher used in this crate
#[cfg(not(feature = "fxhash"))]
pub type RsHasher = std::collections::hash_map::DefaultHasher;

/// The hash map used in this crate
pub type RsHashMap<K, V> =
    std::collections::HashMap<K, V, std::hash::BuildHasherDefault<RsHasher>>;

/// A weighted, undirected edge
///
/// Inside of instances, node indices are 0-based and `u < v` always holds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct Edge {
    /// The smaller endpoint
    pub u: usize,
    /// The larger endpoint
    pub v: usize,
    /// The edge weight
    pub w: i64,
}

impl Edge {
    /// Creates a new edge in canonical orientation
    ///
    /// Returns [`None`] for self-loops.
    #[must_use]
    pub fn new(u: usize, v: usize, w: i64) -> Option<Edge> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Some(Edge { u, v, w }),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(Edge { u: v, v: u, w }),
        }
    }

    /// Gets the key identifying the unordered node pair
    #[must_use]
    pub fn key(&self) -> (usize, usize) {
        (self.u, self.v)
    }
}

impl From<(usize, usize, i64)> for Edge {
    /// Converts a triple without canonicalizing it
    fn from((u, v, w): (usize, usize, i64)) -> Self {
        Edge { u, v, w }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.u, self.v, self.w)
    }
}

/// The problem families that instances are stored for
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Problem {
    /// Graph partitioning into `k` blocks
    GraphPartitioning,
    /// Graph coloring with `k` colors
    GraphColoring,
    /// Number partitioning into `k` subsets
    NumberPartitioning,
}

impl Problem {
    /// Gets the identifier used in the `problem` header field
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Problem::GraphPartitioning => "graph_partitioning",
            Problem::GraphColoring => "graph_coloring",
            Problem::NumberPartitioning => "number_partitioning",
        }
    }

    /// Checks whether instances of the problem are graphs
    #[must_use]
    pub fn is_graph(self) -> bool {
        !matches!(self, Problem::NumberPartitioning)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown problem identifier
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("unknown problem identifier: {0}")]
pub struct UnknownProblem(String);

impl FromStr for Problem {
    type Err = UnknownProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "graph_partitioning" => Ok(Problem::GraphPartitioning),
            "graph_coloring" => Ok(Problem::GraphColoring),
            "number_partitioning" => Ok(Problem::NumberPartitioning),
            other => Err(UnknownProblem(other.to_owned())),
        }
    }
}

/// Size classes that processed datasets are sorted into
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeCategory {
    /// Fewer than 1 000 nodes, or at most 100 values
    Tiny,
    /// Fewer than 10 000 nodes, or at most 1 000 values
    Small,
    /// Fewer than 100 000 nodes, or at most 10 000 values
    Medium,
    /// Fewer than 1 000 000 nodes, or more than 10 000 values
    Large,
    /// At least 1 000 000 nodes
    XLarge,
}

impl SizeCategory {
    /// All categories from smallest to largest
    pub const ALL: [SizeCategory; 5] = [
        SizeCategory::Tiny,
        SizeCategory::Small,
        SizeCategory::Medium,
        SizeCategory::Large,
        SizeCategory::XLarge,
    ];

    /// Classifies a graph by its number of nodes
    #[must_use]
    pub fn for_graph(n: usize) -> SizeCategory {
        match n {
            0..=999 => SizeCategory::Tiny,
            1_000..=9_999 => SizeCategory::Small,
            10_000..=99_999 => SizeCategory::Medium,
            100_000..=999_999 => SizeCategory::Large,
            _ => SizeCategory::XLarge,
        }
    }

    /// Classifies a number partitioning instance by its number of values
    ///
    /// Number lists are never classified as [`SizeCategory::XLarge`].
    #[must_use]
    pub fn for_numbers(n: usize) -> SizeCategory {
        match n {
            0..=100 => SizeCategory::Tiny,
            101..=1_000 => SizeCategory::Small,
            1_001..=10_000 => SizeCategory::Medium,
            _ => SizeCategory::Large,
        }
    }

    /// Gets the directory name of the category
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SizeCategory::Tiny => "tiny",
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
            SizeCategory::XLarge => "xlarge",
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
