//! # Graph Instance Representation

use std::{io, path::Path};

use tracing::warn;

use crate::types::{Edge, RsHashMap};

use super::{
    fio::{self, header::Header},
    InvalidInstance,
};

/// Collects undirected edges into canonical form
///
/// Self-loops are dropped, every edge is oriented such that `u < v`, and
/// repeated node pairs are merged with the weight seen last. Edges keep the
/// position of the first occurrence of their node pair.
#[derive(Debug, Default, Clone)]
pub struct EdgeNormalizer {
    edges: Vec<Edge>,
    index: RsHashMap<(usize, usize), usize>,
    self_loops: usize,
    duplicates: usize,
}

impl EdgeNormalizer {
    /// Creates a new, empty normalizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge between 0-based nodes `u` and `v`
    pub fn add(&mut self, u: usize, v: usize, w: i64) {
        let Some(edge) = Edge::new(u, v, w) else {
            self.self_loops += 1;
            return;
        };
        if let Some(&idx) = self.index.get(&edge.key()) {
            self.duplicates += 1;
            self.edges[idx].w = w;
            return;
        }
        self.index.insert(edge.key(), self.edges.len());
        self.edges.push(edge);
    }

    /// Gets the number of self-loops that were dropped
    #[must_use]
    pub fn self_loops(&self) -> usize {
        self.self_loops
    }

    /// Gets the number of edges that overwrote an earlier edge
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Gets the number of distinct edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Checks whether no edge has been collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Gets the normalized edges
    #[must_use]
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

impl Extend<Edge> for EdgeNormalizer {
    fn extend<T: IntoIterator<Item = Edge>>(&mut self, iter: T) {
        iter.into_iter().for_each(|e| self.add(e.u, e.v, e.w));
    }
}

/// A weighted, undirected, simple graph
///
/// The number of edges `m` is always the number of edges actually present;
/// the value declared in the file header is only kept in [`GraphInstance::meta`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphInstance {
    name: String,
    n: usize,
    edges: Vec<Edge>,
    meta: Header,
}

impl GraphInstance {
    /// Creates a new graph from 0-based edges, normalizing them
    ///
    /// # Errors
    ///
    /// If `n` is zero
    pub fn new<S, I>(name: S, n: usize, edges: I, meta: Header) -> Result<Self, InvalidInstance>
    where
        S: Into<String>,
        I: IntoIterator<Item = Edge>,
    {
        let mut norm = EdgeNormalizer::new();
        norm.extend(edges);
        Self::from_normalized(name, n, norm, meta)
    }

    /// Creates a new graph from edges collected in a normalizer
    ///
    /// # Errors
    ///
    /// If `n` is zero
    pub fn from_normalized<S: Into<String>>(
        name: S,
        n: usize,
        edges: EdgeNormalizer,
        meta: Header,
    ) -> Result<Self, InvalidInstance> {
        if n == 0 {
            return Err(InvalidInstance::NonPositiveNodes(0));
        }
        let graph = GraphInstance {
            name: name.into(),
            n,
            edges: edges.into_edges(),
            meta,
        };
        if let Some(max) = graph.max_node() {
            if max >= n {
                // some corpora have off-by-one metadata, so this is not fatal
                warn!(
                    "node index out of range in '{}': max index {max}, n = {n}",
                    graph.name
                );
            }
        }
        Ok(graph)
    }

    /// Gets the display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the declared number of nodes
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Gets the number of edges
    #[must_use]
    pub fn m(&self) -> usize {
        self.edges.len()
    }

    /// Gets the edges with 0-based node indices
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Gets the header metadata
    #[must_use]
    pub fn meta(&self) -> &Header {
        &self.meta
    }

    /// Gets the number of blocks or colors from the header, `0` if unknown
    #[must_use]
    pub fn k(&self) -> usize {
        self.meta.k().unwrap_or(0)
    }

    /// Gets the largest node index appearing in an edge
    #[must_use]
    pub fn max_node(&self) -> Option<usize> {
        self.edges.iter().map(|e| e.v).max()
    }

    /// Checks whether any edge has a weight other than 1
    #[must_use]
    pub fn is_weighted(&self) -> bool {
        self.edges.iter().any(|e| e.w != 1)
    }

    /// Gets the sum of all edge weights
    #[must_use]
    pub fn total_weight(&self) -> i64 {
        self.edges.iter().map(|e| e.w).sum()
    }

    /// Computes the degree of every node
    ///
    /// Nodes with index at least `n` are not counted.
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        let mut deg = vec![0; self.n];
        for e in &self.edges {
            if e.v < self.n {
                deg[e.u] += 1;
                deg[e.v] += 1;
            }
        }
        deg
    }

    /// Decomposes the graph into its parts
    #[must_use]
    pub fn into_parts(self) -> (String, usize, Vec<Edge>, Header) {
        (self.name, self.n, self.edges, self.meta)
    }

    /// Parses a graph from a reader in the unified format
    ///
    /// # Errors
    ///
    /// If reading fails or the input is not a valid unified graph file
    pub fn from_unified<R: io::Read>(
        mut reader: R,
        default_name: &str,
    ) -> Result<Self, fio::ParsingError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Ok(fio::unified::parse_graph(&raw, default_name)?)
    }

    /// Parses a graph from a unified format file. With feature `compression`
    /// supports gzip, bzip2 and (tar-wrapped) xz compression, detected by the
    /// file extension.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not a valid unified graph file
    pub fn from_unified_path<P: AsRef<Path>>(path: P) -> Result<Self, fio::ParsingError> {
        let raw = fio::read_text(&path)?;
        Ok(fio::unified::parse_graph(&raw, &super::file_name(path))?)
    }

    /// Writes the graph in the unified format with 1-based node indices
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn to_unified<W: io::Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        fio::unified::write_graph(writer, self)
    }

    /// Writes the graph in the unified format to a file. With feature
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
