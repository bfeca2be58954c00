//! # Unified Text Format
//!
//! The unified format stores every instance as a `# key: value` header (see
//! [`super::header`]) followed by data lines. Graphs start with a size line
//! `n m` followed by one `u v [w]` line per edge with 1-based node indices.
//! Number partitioning instances start with a count line `n` followed by the
//! values, one or more per line.
//!
//! Parsing is lenient with respect to individual data lines: malformed lines
//! are skipped and reported through [`tracing`], inconsistencies with the
//! declared sizes are reported but accepted. Only a missing or malformed
//! size/count line and violations of instance invariants are errors.

use std::{
    io::{self, Write},
    num::ParseIntError,
};

use num_bigint::BigInt;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    instances::{EdgeNormalizer, GraphInstance, InvalidInstance, NppInstance},
    types::Problem,
};

use super::header::{parse_header, write_header, Header};

/// Errors occurring within unified format parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input does not contain any data line
    #[error("no data lines")]
    NoData,
    /// The first data line of a graph is not `n m`
    #[error("invalid size line: '{0}'")]
    SizeLine(String),
    /// The first data line of a number partitioning instance is not a count
    #[error("invalid count line: '{0}'")]
    CountLine(String),
    /// The parsed data violates an instance invariant
    #[error(transparent)]
    Instance(#[from] InvalidInstance),
}

/// Iterates over the trimmed lines that are neither blank nor comments
pub(crate) fn data_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parses a graph from the text of a unified format file
///
/// The name of the instance is taken from the `name` header field and falls
/// back to `default_name`.
///
/// # Errors
///
/// If there is no data line, the size line is malformed or the number of
/// nodes is not positive.
pub fn parse_graph(raw: &str, default_name: &str) -> Result<GraphInstance, Error> {
    let meta = parse_header(raw);
    let name = meta.name().unwrap_or(default_name).to_owned();
    let mut lines = data_lines(raw);
    let size_line = lines.next().ok_or(Error::NoData)?;
    let (n, m_declared) =
        parse_size_line(size_line).ok_or_else(|| Error::SizeLine(size_line.to_owned()))?;
    let n = match usize::try_from(n) {
        Ok(n) if n > 0 => n,
        _ => return Err(InvalidInstance::NonPositiveNodes(n).into()),
    };

    let mut norm = EdgeNormalizer::new();
    for line in lines {
        match parse_edge_line(line) {
            Ok(Some((u, v, w))) => {
                let (Ok(u), Ok(v)) = (
                    usize::try_from(u.saturating_sub(1)),
                    usize::try_from(v.saturating_sub(1)),
                ) else {
                    warn!("skipping edge with node index below 1: '{line}'");
                    continue;
                };
                norm.add(u, v, w);
            }
            Ok(None) => (),
            Err(err) => warn!("skipping invalid edge line '{line}': {err}"),
        }
    }

    if norm.duplicates() > 0 {
        info!("removed {} duplicate edges from '{name}'", norm.duplicates());
    }
    if norm.self_loops() > 0 {
        info!("removed {} self-loops from '{name}'", norm.self_loops());
    }
    if i64::try_from(norm.len()).ok() != Some(m_declared) {
        warn!(
            "edge count mismatch in '{name}': declared {m_declared}, found {}",
            norm.len()
        );
    }
    Ok(GraphInstance::from_normalized(name, n, norm, meta)?)
}

/// Parses a number partitioning instance from the text of a unified format
/// file
///
/// The name of the instance is taken from the `name` header field and falls
/// back to `default_name`.
///
/// # Errors
///
/// If there is no data line, the count line is malformed or negative, or no
/// value is found.
pub fn parse_npp(raw: &str, default_name: &str) -> Result<NppInstance, Error> {
    let meta = parse_header(raw);
    let name = meta.name().unwrap_or(default_name).to_owned();
    let mut lines = data_lines(raw);
    let count_line = lines.next().ok_or(Error::NoData)?;
    let n_declared: usize = count_line
        .parse()
        .map_err(|_| Error::CountLine(count_line.to_owned()))?;

    let mut values = Vec::with_capacity(n_declared.min(1 << 20));
    for line in lines {
        match line
            .split_whitespace()
            .map(str::parse::<BigInt>)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(vals) => values.extend(vals),
            Err(err) => {
                warn!("skipping invalid value line '{line}': {err}");
                continue;
            }
        }
        if values.len() >= n_declared {
            break;
        }
    }
    values.truncate(n_declared);

    if values.len() < n_declared {
        warn!(
            "too few values in '{name}': expected {n_declared}, found {}",
            values.len()
        );
    }
    Ok(NppInstance::new(name, values, meta)?)
}

/// Writes a graph in the unified format
///
/// The `name`, `n` and `m` header fields are set from the instance, all other
/// header fields are written as stored.
///
/// # Errors
///
/// If writing fails
pub fn write_graph<W: Write>(writer: &mut W, graph: &GraphInstance) -> Result<(), io::Error> {
    let header = graph
        .meta()
        .clone()
        .with("name", graph.name())
        .with("n", graph.n())
        .with("m", graph.m());
    write_header(writer, &header)?;
    writeln!(writer, "{} {}", graph.n(), graph.m())?;
    graph
        .edges()
        .iter()
        .try_for_each(|e| writeln!(writer, "{} {} {}", e.u + 1, e.v + 1, e.w))
}

/// Writes a number partitioning instance in the unified format
///
/// The `name` and `n` header fields are set from the instance, all other
/// header fields are written as stored.
///
/// # Errors
///
/// If writing fails
pub fn write_npp<W: Write>(writer: &mut W, npp: &NppInstance) -> Result<(), io::Error> {
    let header = npp
        .meta()
        .clone()
        .with("name", npp.name())
        .with("n", npp.n());
    write_npp_data(writer, &header, npp.values())
}

fn write_npp_data<W: Write>(
    writer: &mut W,
    header: &Header,
    values: &[BigInt],
) -> Result<(), io::Error> {
    write_header(writer, header)?;
    writeln!(writer)?;
    writeln!(writer, "{}", values.len())?;
    values.iter().try_for_each(|val| writeln!(writer, "{val}"))
}

/// A graph as extracted from a raw source format
///
/// Node indices are 1-based and edges are neither canonicalized nor
/// deduplicated. Normalization happens when the unified file is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGraph {
    /// The number of nodes
    pub n: usize,
    /// The edges as `(u, v, w)`
    pub edges: Vec<(usize, usize, i64)>,
}

impl RawGraph {
    /// Gets the number of edges
    #[must_use]
    pub fn m(&self) -> usize {
        self.edges.len()
    }

    /// Writes the graph in the unified format
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn write_unified<W: Write>(
        &self,
        writer: &mut W,
        problem: Problem,
        name: &str,
        k: usize,
    ) -> Result<(), io::Error> {
        let header = Header::new()
            .with("problem", problem)
            .with("name", name)
            .with("n", self.n)
            .with("m", self.m())
            .with("k", k)
            .with("weighted", 0)
            .with("directed", 0);
        write_header(writer, &header)?;
        writeln!(writer, "{} {}", self.n, self.m())?;
        self.edges
            .iter()
            .try_for_each(|(u, v, w)| writeln!(writer, "{u} {v} {w}"))
    }
}

/// A list of numbers as extracted from a raw source format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNumbers {
    /// The values
    pub values: Vec<BigInt>,
    /// The number of subsets
    pub k: usize,
}

impl RawNumbers {
    /// Writes the numbers as a number partitioning instance in the unified
    /// format
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn write_unified<W: Write>(&self, writer: &mut W, name: &str) -> Result<(), io::Error> {
        let header = Header::new()
            .with("problem", Problem::NumberPartitioning)
            .with("name", name)
            .with("n", self.values.len())
            .with("k", self.k);
        write_npp_data(writer, &header, &self.values)
    }
}

/// Parses the first two tokens of a size line
fn parse_size_line(line: &str) -> Option<(i64, i64)> {
    let mut tokens = line.split_whitespace();
    let n = tokens.next()?.parse().ok()?;
    let m = tokens.next()?.parse().ok()?;
    Some((n, m))
}

/// Parses an edge line into `(u, v, w)`, returning [`None`] for lines with
/// fewer than two tokens
fn parse_edge_line(line: &str) -> Result<Option<(i64, i64, i64)>, ParseIntError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Ok(None);
    }
    let u = tokens[0].parse()?;
    let v = tokens[1].parse()?;
    let w = match tokens.get(2) {
        Some(w) => w.parse()?,
        None => 1,
    };
    Ok(Some((u, v, w)))
}

#[cfg(test)]
mod tests {
    use super::{
        parse_edge_line, parse_graph, parse_npp, parse_size_line, write_graph, write_npp, Error,
        RawGraph, RawNumbers,
    };
    use num_bigint::BigInt;

    use crate::{
        instances::InvalidInstance,
        types::{Edge, Problem},
    };

    fn ints(vals: &[i64]) -> Vec<BigInt> {
        vals.iter().copied().map(BigInt::from).collect()
    }

    #[test]
    fn size_line() {
        assert_eq!(parse_size_line("4 3"), Some((4, 3)));
        assert_eq!(parse_size_line("4 3 011"), Some((4, 3)));
        assert_eq!(parse_size_line("4"), None);
        assert_eq!(parse_size_line("four 3"), None);
    }

    #[test]
    fn edge_line() {
        assert_eq!(parse_edge_line("1 2"), Ok(Some((1, 2, 1))));
        assert_eq!(parse_edge_line("1 2 5 extra"), Ok(Some((1, 2, 5))));
        assert_eq!(parse_edge_line("7"), Ok(None));
        assert!(parse_edge_line("1 x").is_err());
        assert!(parse_edge_line("1 2 w").is_err());
    }

    #[test]
    fn graph_basic() {
        let raw = "# problem: graph_partitioning\n# name: path\n4 3\n1 2\n2 3 4\n3 4\n";
        let graph = parse_graph(raw, "fallback").unwrap();
        assert_eq!(graph.name(), "path");
        assert_eq!(graph.n(), 4);
        assert_eq!(graph.m(), 3);
        assert_eq!(
            graph.edges(),
            &[
                Edge { u: 0, v: 1, w: 1 },
                Edge { u: 1, v: 2, w: 4 },
                Edge { u: 2, v: 3, w: 1 }
            ]
        );
        assert_eq!(graph.meta().problem_kind(), Some(Problem::GraphPartitioning));
    }

    #[test]
    fn graph_last_weight_wins() {
        let graph = parse_graph("3 2\n1 2 5\n2 1 7\n", "g").unwrap();
        assert_eq!(graph.m(), 1);
        assert_eq!(graph.edges(), &[Edge { u: 0, v: 1, w: 7 }]);
        assert_eq!(graph.name(), "g");
    }

    #[test]
    fn graph_self_loops() {
        let graph = parse_graph("3 3\n1 1\n2 3\n3 3 9\n", "g").unwrap();
        assert_eq!(graph.edges(), &[Edge { u: 1, v: 2, w: 1 }]);
    }

    #[test]
    fn graph_skips_bad_lines() {
        let raw = "5 4\n1 2\nbroken\n2 x\n0 3\n  # indented comment\n\n4 5 2\n";
        let graph = parse_graph(raw, "g").unwrap();
        assert_eq!(
            graph.edges(),
            &[Edge { u: 0, v: 1, w: 1 }, Edge { u: 3, v: 4, w: 2 }]
        );
    }

    #[test]
    fn graph_out_of_range_accepted() {
        let graph = parse_graph("2 1\n1 3\n", "g").unwrap();
        assert_eq!(graph.max_node(), Some(2));
    }

    #[test]
    fn graph_canonical_edges() {
        let graph = parse_graph("6 5\n6 1\n5 2 3\n2 5\n4 4\n3 1\n", "g").unwrap();
        for e in graph.edges() {
            assert!(e.u < e.v);
        }
        assert_eq!(graph.m(), 3);
    }

    #[test]
    fn graph_errors() {
        assert_eq!(parse_graph("# name: x\n\n", "g"), Err(Error::NoData));
        assert_eq!(
            parse_graph("4\n1 2\n", "g"),
            Err(Error::SizeLine(String::from("4")))
        );
        assert_eq!(
            parse_graph("0 0\n", "g"),
            Err(Error::Instance(InvalidInstance::NonPositiveNodes(0)))
        );
        assert_eq!(
            parse_graph("-3 0\n", "g"),
            Err(Error::Instance(InvalidInstance::NonPositiveNodes(-3)))
        );
    }

    #[test]
    fn graph_idempotent() {
        let raw = "# problem: graph_coloring\n# k: 3\n5 6\n2 1 3\n1 2 4\n3 3\n5 4\n4 5 2\n1 5\n";
        let graph = parse_graph(raw, "g").unwrap();
        let mut out = Vec::new();
        write_graph(&mut out, &graph).unwrap();
        let reparsed = parse_graph(&String::from_utf8(out).unwrap(), "other").unwrap();
        assert_eq!(reparsed.edges(), graph.edges());
        assert_eq!(reparsed.n(), graph.n());
        assert_eq!(reparsed.name(), "g");
        assert_eq!(reparsed.k(), 3);
        assert_eq!(reparsed.meta().get_parsed::<usize>("m"), Some(3));
    }

    #[test]
    fn npp_truncates() {
        let npp = parse_npp("3\n10 20\n30 40\n50\n", "npp").unwrap();
        assert_eq!(npp.values(), ints(&[10, 20, 30]));
        assert_eq!(npp.n(), 3);
    }

    #[test]
    fn npp_shortfall() {
        let npp = parse_npp("# name: short\n5\n1\n2\n3\n", "npp").unwrap();
        assert_eq!(npp.n(), 3);
        assert_eq!(npp.name(), "short");
    }

    #[test]
    fn npp_skips_bad_lines() {
        let npp = parse_npp("4\n1 2\n3 x\n4\n5\n", "npp").unwrap();
        assert_eq!(npp.values(), ints(&[1, 2, 4, 5]));
    }

    #[test]
    fn npp_wide_values() {
        let raw = "# problem: number_partitioning\n# n: 3\n\n3\n1180591620717411303423\n5\n\
                   944473296573929042739\n";
        let npp = parse_npp(raw, "wide").unwrap();
        assert_eq!(npp.n(), 3);
        assert_eq!(npp.values()[0].to_string(), "1180591620717411303423");
        assert_eq!(npp.values()[1], BigInt::from(5));
        assert_eq!(npp.sum().to_string(), "2125064917291340346167");
        let mut out = Vec::new();
        write_npp(&mut out, &npp).unwrap();
        let reparsed = parse_npp(&String::from_utf8(out).unwrap(), "other").unwrap();
        assert_eq!(reparsed.values(), npp.values());
    }

    #[test]
    fn npp_errors() {
        assert_eq!(parse_npp("", "npp"), Err(Error::NoData));
        assert_eq!(
            parse_npp("4 2\n1\n", "npp"),
            Err(Error::CountLine(String::from("4 2")))
        );
        assert_eq!(
            parse_npp("-1\n1\n", "npp"),
            Err(Error::CountLine(String::from("-1")))
        );
        assert_eq!(
            parse_npp("3\nx\n", "npp"),
            Err(Error::Instance(InvalidInstance::NoValues))
        );
    }

    #[test]
    fn npp_roundtrip() {
        let npp = parse_npp("# k: 2\n4\n5 -1 0 8\n", "npp").unwrap();
        let mut out = Vec::new();
        write_npp(&mut out, &npp).unwrap();
        let reparsed = parse_npp(&String::from_utf8(out).unwrap(), "other").unwrap();
        assert_eq!(reparsed.values(), npp.values());
        assert_eq!(reparsed.name(), "npp");
        assert_eq!(reparsed.k(), 2);
    }

    #[test]
    fn raw_graph_writer() {
        let raw = RawGraph {
            n: 3,
            edges: vec![(1, 2, 1), (3, 2, 1)],
        };
        let mut out = Vec::new();
        raw.write_unified(&mut out, Problem::GraphColoring, "tri", 4)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# problem: graph_coloring\n# name: tri\n# n: 3\n# m: 2\n# k: 4\n# weighted: 0\n\
             # directed: 0\n3 2\n1 2 1\n3 2 1\n"
        );
    }

    #[test]
    fn raw_numbers_writer() {
        let raw = RawNumbers {
            values: ints(&[7, 3]),
            k: 2,
        };
        let mut out = Vec::new();
        raw.write_unified(&mut out, "pk").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "# problem: number_partitioning\n# name: pk\n# n: 2\n# k: 2\n\n2\n7\n3\n"
        );
        assert_eq!(parse_npp(&text, "x").unwrap().values(), ints(&[7, 3]));
    }
}
