//! # Benchmark Instance Representations
//!
//! Typed in-memory representations of the instances stored in the unified
//! text format. Graph partitioning and graph coloring instances are both
//! represented by [`GraphInstance`], number partitioning instances by
//! [`NppInstance`]. [`Instance`] is the sum of the two and is what the
//! [loader](crate::loader) returns when the kind of a file is not known in
//! advance.

use std::{fmt, io, path::Path};

use thiserror::Error;

use crate::types::Problem;

pub mod fio;

mod graph;
pub use graph::{EdgeNormalizer, GraphInstance};

mod npp;
pub use npp::NppInstance;

/// Errors for instances violating hard invariants
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum InvalidInstance {
    /// The declared number of nodes of a graph is not positive
    #[error("number of nodes must be positive, got {0}")]
    NonPositiveNodes(i64),
    /// A number partitioning instance does not have any values
    #[error("number partitioning instance has no values")]
    NoValues,
}

/// The two kinds of instances
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    /// A weighted undirected graph
    Graph,
    /// A list of integers to partition
    NumberPartitioning,
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKind::Graph => write!(f, "graph"),
            InstanceKind::NumberPartitioning => write!(f, "number partitioning"),
        }
    }
}

impl From<Problem> for InstanceKind {
    fn from(value: Problem) -> Self {
        if value.is_graph() {
            InstanceKind::Graph
        } else {
            InstanceKind::NumberPartitioning
        }
    }
}

/// An instance of any of the supported problems
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instance {
    /// A graph partitioning or graph coloring instance
    Graph(GraphInstance),
    /// A number partitioning instance
    NumberPartitioning(NppInstance),
}

impl Instance {
    /// Gets the kind of the instance
    #[must_use]
    pub fn kind(&self) -> InstanceKind {
        match self {
            Instance::Graph(_) => InstanceKind::Graph,
            Instance::NumberPartitioning(_) => InstanceKind::NumberPartitioning,
        }
    }

    /// Gets the display name of the instance
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Instance::Graph(graph) => graph.name(),
            Instance::NumberPartitioning(npp) => npp.name(),
        }
    }

    /// Gets the header metadata of the instance
    #[must_use]
    pub fn meta(&self) -> &fio::header::Header {
        match self {
            Instance::Graph(graph) => graph.meta(),
            Instance::NumberPartitioning(npp) => npp.meta(),
        }
    }

    /// Gets the number of nodes or values, respectively
    #[must_use]
    pub fn n(&self) -> usize {
        match self {
            Instance::Graph(graph) => graph.n(),
            Instance::NumberPartitioning(npp) => npp.n(),
        }
    }

    /// Gets the graph, if the instance is one
    #[must_use]
    pub fn as_graph(&self) -> Option<&GraphInstance> {
        match self {
            Instance::Graph(graph) => Some(graph),
            Instance::NumberPartitioning(_) => None,
        }
    }

    /// Gets the number partitioning instance, if the instance is one
    #[must_use]
    pub fn as_npp(&self) -> Option<&NppInstance> {
        match self {
            Instance::Graph(_) => None,
            Instance::NumberPartitioning(npp) => Some(npp),
        }
    }

    /// Converts the instance into a graph, if it is one
    #[must_use]
    pub fn into_graph(self) -> Option<GraphInstance> {
        match self {
            Instance::Graph(graph) => Some(graph),
            Instance::NumberPartitioning(_) => None,
        }
    }

    /// Converts the instance into a number partitioning instance, if it is one
    #[must_use]
    pub fn into_npp(self) -> Option<NppInstance> {
        match self {
            Instance::Graph(_) => None,
            Instance::NumberPartitioning(npp) => Some(npp),
        }
    }

    /// Parses an instance of unknown kind from the text of a unified format
    /// file. See [`crate::loader::detect_and_parse`] for how the kind is
    /// determined.
    ///
    /// # Errors
    ///
    /// If neither parser accepts the text
    pub fn from_unified_str(raw: &str, default_name: &str) -> Result<Self, fio::ParsingError> {
        crate::loader::detect_and_parse(raw, default_name)
    }

    /// Writes the instance in the unified format
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn to_unified<W: io::Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        match self {
            Instance::Graph(graph) => graph.to_unified(writer),
            Instance::NumberPartitioning(npp) => npp.to_unified(writer),
        }
    }

    /// Writes the instance in the unified format to a file. With feature
    /// `compression`, the container is chosen by the file extension.
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn to_unified_path<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let mut buf = Vec::new();
        self.to_unified(&mut buf)?;
        fio::write_container(path, &buf)
    }
}

impl From<GraphInstance> for Instance {
    fn from(value: GraphInstance) -> Self {
        Instance::Graph(value)
    }
}

impl From<NppInstance> for Instance {
    fn from(value: NppInstance) -> Self {
        Instance::NumberPartitioning(value)
    }
}

/// Gets the file name of a path as the fallback display name of an instance
pub(crate) fn file_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
