//! # Parsing DIMACS10 (METIS) Graph Files
//!
//! The graph partitioning benchmarks of the 10th DIMACS challenge use the
//! METIS adjacency list format. After `%` comment lines, the first line holds
//! `n m [fmt [ncon]]`. Every following line `i` lists the neighbors of node
//! `i`, so a node without neighbors is a blank line.
//!
//! The optional `fmt` field is a string of up to three binary digits. The
//! last one signals edge weights (every neighbor is followed by a weight), the
//! middle one `ncon` vertex weights and the first one a vertex size at the
//! start of each line.
//!
//! ## References
//!
//! - [DIMACS10 file format](https://www.cc.gatech.edu/dimacs10/downloads.shtml)

use std::{
    io::{self, BufRead, BufReader, Read},
    str::FromStr,
};

use thiserror::Error;
use tracing::warn;

use super::unified::RawGraph;

/// Errors occuring within the METIS parsing module
#[derive(Error, Debug)]
pub enum Error {
    /// The file does not have a size line
    #[error("no size line")]
    NoSizeLine,
    /// Invalid size line
    #[error("invalid size line: {0}")]
    SizeLine(String),
    /// Invalid token in an adjacency line
    #[error("invalid token '{token}' in adjacency list of node {node}")]
    Token {
        /// The node whose adjacency list contains the token
        node: usize,
        /// The offending token
        token: String,
    },
    /// IO error reading file
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SizeLine(l0), Self::SizeLine(r0)) => l0 == r0,
            (
                Self::Token {
                    node: l_node,
                    token: l_token,
                },
                Self::Token {
                    node: r_node,
                    token: r_token,
                },
            ) => l_node == r_node && l_token == r_token,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// The layout of an adjacency line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Layout {
    vertex_size: bool,
    vertex_weights: usize,
    edge_weights: bool,
}

impl Layout {
    fn from_tokens(fmt: Option<&str>, ncon: Option<&str>) -> Option<Layout> {
        let Some(fmt) = fmt else {
            return Some(Layout::default());
        };
        if fmt.len() > 3 || !fmt.bytes().all(|b| b == b'0' || b == b'1') {
            return None;
        }
        let flag = |pos: usize| fmt.len() > pos && fmt.as_bytes()[fmt.len() - 1 - pos] == b'1';
        let vertex_weights = if flag(1) {
            match ncon {
                Some(ncon) => ncon.parse().ok()?,
                None => 1,
            }
        } else {
            0
        };
        Some(Layout {
            vertex_size: flag(2),
            vertex_weights,
            edge_weights: flag(0),
        })
    }

    fn skip(self) -> usize {
        usize::from(self.vertex_size) + self.vertex_weights
    }
}

/// Parses a METIS graph from a reader (typically a (compressed) file)
///
/// Only pairs `(i, j)` with `j > i` are kept, as every undirected edge is
/// listed in both adjacency lists. Node indices are counted from the first
/// line after the size line, with comment lines not counting.
///
/// # Errors
///
/// If reading fails, the size line is missing or malformed or an adjacency
/// list contains a token that is not an integer.
pub fn parse_graph<R: Read>(reader: R) -> Result<RawGraph, Error> {
    let mut lines = BufReader::new(reader).lines();
    let (n, m_declared, layout) = loop {
        let Some(line) = lines.next() else {
            return Err(Error::NoSizeLine);
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.starts_with('%') || trimmed.is_empty() {
            continue;
        }
        break parse_size_line(trimmed).ok_or_else(|| Error::SizeLine(line.clone()))?;
    };

    let mut edges = Vec::with_capacity(m_declared.min(1 << 20));
    let mut node = 0;
    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.starts_with('%') {
            continue;
        }
        node += 1;
        let mut tokens = trimmed.split_whitespace().skip(layout.skip());
        while let Some(token) = tokens.next() {
            let neighbor: usize = parse_token(token, node)?;
            let weight: i64 = if layout.edge_weights {
                match tokens.next() {
                    Some(token) => parse_token(token, node)?,
                    None => {
                        return Err(Error::Token {
                            node,
                            token: String::new(),
                        })
                    }
                }
            } else {
                1
            };
            if neighbor > node {
                edges.push((node, neighbor, weight));
            }
        }
    }

    if node < n {
        warn!("adjacency list covers {node} of {n} nodes");
    }
    if edges.len() != m_declared {
        warn!(
            "edge count mismatch: declared {m_declared}, found {}",
            edges.len()
        );
    }
    Ok(RawGraph { n, edges })
}

fn parse_size_line(line: &str) -> Option<(usize, usize, Layout)> {
    let mut tokens = line.split_whitespace();
    let n = tokens.next()?.parse().ok()?;
    let m = tokens.next()?.parse().ok()?;
    let layout = Layout::from_tokens(tokens.next(), tokens.next())?;
    Some((n, m, layout))
}

fn parse_token<T: FromStr>(token: &str, node: usize) -> Result<T, Error> {
    token.parse().map_err(|_| Error::Token {
        node,
        token: String::from(token),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_graph, parse_size_line, Error, Layout};
    use crate::instances::fio::unified::RawGraph;

    #[test]
    fn size_line() {
        assert_eq!(parse_size_line("4 5"), Some((4, 5, Layout::default())));
        assert_eq!(parse_size_line("4 5 0"), Some((4, 5, Layout::default())));
        assert_eq!(
            parse_size_line("4 5 011 2"),
            Some((
                4,
                5,
                Layout {
                    vertex_size: false,
                    vertex_weights: 2,
                    edge_weights: true
                }
            ))
        );
        assert_eq!(parse_size_line("4"), None);
        assert_eq!(parse_size_line("4 5 2"), None);
    }

    #[test]
    fn parse_pass() {
        let data = "% comment\n% another\n4 4\n2 3\n1 3 4\n1 2\n2\n";
        assert_eq!(
            parse_graph(data.as_bytes()),
            Ok(RawGraph {
                n: 4,
                edges: vec![(1, 2, 1), (1, 3, 1), (2, 3, 1), (2, 4, 1)]
            })
        );
    }

    #[test]
    fn huge_declared_edge_count() {
        let data = "3 18446744073709551615\n2\n1\n\n";
        assert_eq!(
            parse_graph(data.as_bytes()),
            Ok(RawGraph {
                n: 3,
                edges: vec![(1, 2, 1)]
            })
        );
    }

    #[test]
    fn isolated_nodes() {
        let data = "3 1\n\n3\n2\n";
        assert_eq!(
            parse_graph(data.as_bytes()),
            Ok(RawGraph {
                n: 3,
                edges: vec![(2, 3, 1)]
            })
        );
    }

    #[test]
    fn edge_weights() {
        let data = "3 2 1\n2 5\n1 5 3 7\n2 7\n";
        assert_eq!(
            parse_graph(data.as_bytes()),
            Ok(RawGraph {
                n: 3,
                edges: vec![(1, 2, 5), (2, 3, 7)]
            })
        );
    }

    #[test]
    fn vertex_weights() {
        let data = "2 1 10\n4 2\n9 1\n";
        assert_eq!(
            parse_graph(data.as_bytes()),
            Ok(RawGraph {
                n: 2,
                edges: vec![(1, 2, 1)]
            })
        );
    }

    #[test]
    fn parse_fail() {
        assert_eq!(parse_graph("% only\n".as_bytes()), Err(Error::NoSizeLine));
        assert_eq!(
            parse_graph("x 4\n".as_bytes()),
            Err(Error::SizeLine(String::from("x 4")))
        );
        assert_eq!(
            parse_graph("2 1\n2\n1 y\n".as_bytes()),
            Err(Error::Token {
                node: 2,
                token: String::from("y")
            })
        );
    }
}
