//! # Parsing DIMACS Graph Coloring Files
//!
//! Internal module containing functions for parsing the DIMACS graph formats
//! used by the graph coloring benchmarks. Text files (`.col`) consist of `c`
//! comment lines, a `p edge n m` problem line and `e u v` edge lines. Binary
//! files (`.col.b`) carry the same text preamble followed by a bit-packed edge
//! section.
//!
//! As for other formats, the approach is to accept inputs that do not strictly
//! follow the format, as long as the input is still reasonable.
//!
//! ## References
//!
//! - [DIMACS graph coloring](https://mat.tepper.cmu.edu/COLOR/instances.html)

use std::{
    convert::TryFrom,
    io::{self, Read},
    path::{Path, PathBuf},
};

use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, u64},
    error::{Error as NomError, ErrorKind, ParseError},
    sequence::{preceded, tuple},
    IResult,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::unified::RawGraph;

/// Errors occuring within the DIMACS parsing module
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid p line
    #[error("invalid p-line: {0}")]
    PLine(String),
    /// P line value is too large to fit in a [`usize`]
    #[error("value in p-line too large to fit usize: {0}")]
    PValTooLarge(u64),
    /// Invalid edge line
    #[error("invalid edge line: {0}")]
    ELine(String),
    /// The file does not have a `p edge` line
    #[error("no `p edge` line found")]
    NoPLine,
    /// IO error reading file
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    /// Base error from nom parsing
    #[error("nom error: {0} ({1:?})")]
    NomError(String, ErrorKind),
    /// Incomplete nom error
    #[error("nom parser requested more data")]
    NomIncomplete,
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PLine(l0), Self::PLine(r0)) | (Self::ELine(l0), Self::ELine(r0)) => l0 == r0,
            (Self::PValTooLarge(l0), Self::PValTooLarge(r0)) => l0 == r0,
            (Self::IOError(_), Self::IOError(_)) => true,
            (Self::NomError(l0, l1), Self::NomError(r0, r1)) => l0 == r0 && l1 == r1,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl ParseError<&str> for Error {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        Self::NomError(String::from(input), kind)
    }

    fn append(_: &str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

/// Internal type of the lines of a text DIMACS graph
#[derive(PartialEq, Debug)]
enum ColLine {
    /// Comment, blank or otherwise ignored line
    Skip,
    /// `p edge n m`
    Problem { n: usize, m: usize },
    /// `e u v`
    Edge(usize, usize),
}

/// Parses a text DIMACS graph from a reader (typically a file)
///
/// Input that is not valid UTF-8 is read as latin-1.
///
/// # Errors
///
/// If reading fails, an edge line is malformed or no `p edge` line exists.
pub fn parse_col<R: Read>(mut reader: R) -> Result<RawGraph, Error> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    let text = String::from_utf8(content).unwrap_or_else(|err| latin1(err.as_bytes()));
    parse_col_text(&text)
}

/// Parses a binary DIMACS graph (`.col.b`)
///
/// The text preamble is scanned for the `p edge` line. The bit-packed edge
/// section starts after the newline ending that line, with leading NUL, LF
/// and CR bytes skipped. If the problem line is malformed or no edge can be
/// decoded, the content is parsed as text instead.
///
/// # Errors
///
/// If the content can not be parsed as either binary or text.
pub fn parse_col_binary(content: &[u8]) -> Result<RawGraph, Error> {
    if let Some((line, body)) = split_binary(content) {
        match parse_col_line(&latin1(line)) {
            Ok((_, ColLine::Problem { n, m })) => {
                let edges = decode_binary_edges(body, n, m);
                if !edges.is_empty() {
                    info!("decoded {} edges from binary section", edges.len());
                    return Ok(RawGraph {
                        n,
                        edges: edges.into_iter().map(|(u, v)| (u, v, 1)).collect(),
                    });
                }
            }
            Ok(_) => debug!("no problem line before binary section"),
            Err(err) => debug!("invalid problem line before binary section: {err}"),
        }
    }
    warn!("could not decode binary edges, falling back to text parsing");
    parse_col_text(&latin1(content))
}

/// Decodes the bit-packed edge section of a binary DIMACS graph
///
/// Every edge occupies two node fields of equal width, read in little-endian
/// bit order. The low field holds `u - 1`, the high field `v - 1`. Edges with
/// an endpoint outside of `1..=n` and self-loops are dropped. Decoding stops
/// after `expected_m` accepted edges or at the end of the buffer. Returns
/// 1-based node pairs.
///
/// The field width is 8 bits for `n > 127`, so graphs with more than 256
/// nodes can not be addressed.
#[must_use]
pub fn decode_binary_edges(buffer: &[u8], n: usize, expected_m: usize) -> Vec<(usize, usize)> {
    let node_bits = node_bits(n);
    let edge_bits = 2 * node_bits;
    let node_mask = (1u64 << node_bits) - 1;
    let edge_mask = (1u64 << edge_bits) - 1;

    let mut edges = Vec::new();
    let mut bytes = buffer.iter();
    let mut acc = 0u64;
    let mut available = 0u32;
    while edges.len() < expected_m {
        while available < edge_bits {
            let Some(&byte) = bytes.next() else { break };
            acc |= u64::from(byte) << available;
            available += 8;
        }
        if available < edge_bits {
            break;
        }
        let bits = acc & edge_mask;
        acc >>= edge_bits;
        available -= edge_bits;

        #[allow(clippy::cast_possible_truncation)]
        let u = (bits & node_mask) as usize + 1;
        #[allow(clippy::cast_possible_truncation)]
        let v = ((bits >> node_bits) & node_mask) as usize + 1;
        if u <= n && v <= n && u != v {
            edges.push((u, v));
        }
    }
    edges
}

/// Reads a DIMACS graph from a file
///
/// For `.col.b` files, a sibling text file with the `.b` suffix removed is
/// preferred if it exists. With feature `compression`, compressed files are
/// decompressed by their extension.
///
/// # Errors
///
/// If reading or parsing fails
pub fn read_col_path<P: AsRef<Path>>(path: P) -> Result<RawGraph, Error> {
    let path = path.as_ref();
    if let Some(sibling) = text_sibling(path) {
        if sibling.is_file() {
            debug!("using text file {} instead of binary", sibling.display());
            return parse_col(super::open_compressed_uncompressed_read(sibling)?);
        }
        debug!("no text file for {}, decoding binary", path.display());
        return parse_col_binary(&super::read_bytes(path)?);
    }
    parse_col(super::read_bytes(path)?.as_slice())
}

/// Gets the path of the text version of a `.col.b` file
fn text_sibling(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let split = name.len().checked_sub(6).filter(|&idx| idx > 0)?;
    if !name.get(split..)?.eq_ignore_ascii_case(".col.b") {
        return None;
    }
    Some(path.with_file_name(name.get(..name.len() - 2)?))
}

/// Gets the width of a node field in the binary format
fn node_bits(n: usize) -> u32 {
    if n > 127 {
        8
    } else if n > 63 {
        7
    } else if n > 31 {
        6
    } else {
        7
    }
}

/// Splits binary content into the `p edge` line and the binary section
///
/// Only a `p edge` at the start of a line is considered.
fn split_binary(content: &[u8]) -> Option<(&[u8], &[u8])> {
    let start = content
        .windows(6)
        .enumerate()
        .position(|(idx, win)| win == b"p edge" && (idx == 0 || content[idx - 1] == b'\n'))?;
    let newline = start + content[start..].iter().position(|&b| b == b'\n')?;
    let body_start = newline
        + 1
        + content[newline + 1..]
            .iter()
            .take_while(|&&b| matches!(b, 0 | b'\n' | b'\r'))
            .count();
    if body_start >= content.len() {
        return None;
    }
    Some((&content[start..newline], &content[body_start..]))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn parse_col_text(text: &str) -> Result<RawGraph, Error> {
    let mut n = None;
    let mut edges = Vec::new();
    for line in text.lines() {
        let (_, line) = parse_col_line(line).map_err(unwrap_dimacs_error)?;
        match line {
            ColLine::Skip => (),
            ColLine::Problem { n: p_n, m: p_m } => {
                n = Some(p_n);
                edges.reserve(p_m.min(1 << 20));
            }
            ColLine::Edge(u, v) => edges.push((u, v, 1)),
        }
    }
    let n = n.ok_or(Error::NoPLine)?;
    Ok(RawGraph { n, edges })
}

fn unwrap_dimacs_error(err: nom::Err<Error>) -> Error {
    match err {
        nom::Err::Incomplete(_) => Error::NomIncomplete,
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
    }
}

/// Parses a line of a text DIMACS graph
fn parse_col_line(input: &str) -> IResult<&str, ColLine, Error> {
    let line = input.trim();
    if line.starts_with('p') {
        return parse_p_line(line);
    }
    if line.starts_with('e') {
        let (rest, (u, v)) = parse_e_line(line)?;
        return Ok((rest, ColLine::Edge(u, v)));
    }
    Ok(("", ColLine::Skip))
}

/// Parses a p line, ignoring problem lines other than `edge`
fn parse_p_line(input: &str) -> IResult<&str, ColLine, Error> {
    let full_p_line = String::from(input);
    let (input, _) = tuple::<_, _, NomError<_>, _>((tag("p"), multispace1))(input)
        .map_err(|e| e.map(|_| Error::PLine(full_p_line.clone())))?;
    if tag::<_, _, NomError<_>>("edge")(input).is_err() {
        debug!("ignoring p-line: {full_p_line}");
        return Ok(("", ColLine::Skip));
    }
    let (input, (_, _, n, _, m, _)) = tuple::<_, _, NomError<_>, _>((
        tag("edge"),
        multispace1,
        u64,
        multispace1,
        u64,
        multispace0,
    ))(input)
    .map_err(|e| e.map(|_| Error::PLine(full_p_line)))?;
    let n = usize::try_from(n).map_err(|_| nom::Err::Error(Error::PValTooLarge(n)))?;
    let m = usize::try_from(m).map_err(|_| nom::Err::Error(Error::PValTooLarge(m)))?;
    Ok((input, ColLine::Problem { n, m }))
}

/// Parses an `e u v` line
fn parse_e_line(input: &str) -> IResult<&str, (usize, usize), Error> {
    let full_e_line = String::from(input);
    let (input, (u, _, v)) = preceded(
        tuple::<_, _, NomError<_>, _>((tag("e"), multispace1)),
        tuple((u64, multispace1, u64)),
    )(input)
    .map_err(|e| e.map(|_| Error::ELine(full_e_line.clone())))?;
    match (usize::try_from(u), usize::try_from(v)) {
        (Ok(u), Ok(v)) => Ok((input, (u, v))),
        _ => Err(nom::Err::Error(Error::ELine(full_e_line))),
    }
}
