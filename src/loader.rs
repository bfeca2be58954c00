//! # Loading Instances of Unknown Kind
//!
//! The loader reconstructs typed instances from unified format files without
//! knowing in advance which problem a file stores. The kind is determined by
//! an ordered list of detection rules, first on the `problem` header field and
//! then on the shape of the first data line.
//!
//! ## Example
//!
//! ```no_run
//! use unibench::{instances::Instance, loader};
//!
//! let batch = loader::load_many(["data/graph.txt", "data/npp.txt.xz"]);
//! for inst in &batch.instances {
//!     match inst {
//!         Instance::Graph(graph) => println!("{}: n = {}, m = {}", graph.name(), graph.n(), graph.m()),
//!         Instance::NumberPartitioning(npp) => println!("{}: n = {}", npp.name(), npp.n()),
//!     }
//! }
//! ```

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::instances::{
    self,
    fio::{
        self,
        header::parse_header,
        unified::{self, data_lines},
    },
    Instance, InstanceKind,
};

/// Errors when loading an instance from a file
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file could not be read or decompressed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },
    /// The content is not a valid instance of either kind
    #[error("failed to parse {}: {source}", path.display())]
    Parsing {
        /// The file
        path: PathBuf,
        /// The underlying error
        source: fio::ParsingError,
    },
}

/// A rule for deciding which parsers to try on a file
struct Rule {
    name: &'static str,
    applies: fn(&str, Option<&str>) -> bool,
    attempts: &'static [InstanceKind],
    /// Whether no later rule is consulted once this rule applied
    terminal: bool,
}

/// The detection rules in the order they are consulted. The arguments of
/// `applies` are the lower-cased `problem` header field and the first data
/// line.
const RULES: [Rule; 4] = [
    Rule {
        name: "graph problem header",
        applies: |problem, _| problem.contains("graph"),
        attempts: &[InstanceKind::Graph],
        terminal: false,
    },
    Rule {
        name: "number problem header",
        applies: |problem, _| !problem.contains("graph") && problem.contains("number"),
        attempts: &[InstanceKind::NumberPartitioning],
        terminal: false,
    },
    Rule {
        name: "size line",
        applies: |_, first| first.is_some_and(looks_like_size_line),
        attempts: &[InstanceKind::Graph, InstanceKind::NumberPartitioning],
        terminal: true,
    },
    Rule {
        name: "count line",
        applies: |_, first| first.is_some(),
        attempts: &[InstanceKind::NumberPartitioning, InstanceKind::Graph],
        terminal: true,
    },
];

/// Checks whether a data line has at least two tokens and the first two are
/// unsigned integers
fn looks_like_size_line(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().take(2).collect();
    tokens.len() == 2
        && tokens
            .iter()
            .all(|tok| tok.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_as(kind: InstanceKind, raw: &str, default_name: &str) -> Result<Instance, unified::Error> {
    match kind {
        InstanceKind::Graph => unified::parse_graph(raw, default_name).map(Instance::Graph),
        InstanceKind::NumberPartitioning => {
            unified::parse_npp(raw, default_name).map(Instance::NumberPartitioning)
        }
    }
}

/// Parses an instance of unknown kind from the text of a unified format file
///
/// The rules are consulted in order:
///
/// 1. If the `problem` header field contains `graph`, the text is parsed as a
///    graph.
/// 2. Otherwise, if it contains `number`, the text is parsed as a number
///    partitioning instance.
/// 3. If the first data line holds at least two tokens and the first two are
///    unsigned integers, the text is parsed as a graph and, if that fails, as
///    a number partitioning instance.
/// 4. Otherwise the text is parsed as a number partitioning instance and, if
///    that fails, as a graph.
///
/// A failure of a header rule is reported and detection continues with the
/// content rules. Once a content rule applied, its result is final.
///
/// # Errors
///
/// The last parser error, or [`unified::Error::NoData`] if no parser was
/// tried.
pub fn detect_and_parse(raw: &str, default_name: &str) -> Result<Instance, fio::ParsingError> {
    let problem = parse_header(raw)
        .problem()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let first = data_lines(raw).next();
    let mut last_err = None;
    for rule in &RULES {
        if !(rule.applies)(&problem, first) {
            continue;
        }
        debug!("applying detection rule '{}'", rule.name);
        for &kind in rule.attempts {
            match parse_as(kind, raw, default_name) {
                Ok(inst) => return Ok(inst),
                Err(err) => {
                    debug!("parsing '{default_name}' as {kind} failed: {err}");
                    last_err = Some(err);
                }
            }
        }
        if rule.terminal {
            break;
        }
        if let Some(err) = &last_err {
            warn!("could not load '{default_name}' as indicated by header: {err}");
        }
    }
    Err(last_err.unwrap_or(unified::Error::NoData).into())
}

/// Loads an instance of unknown kind from a unified format file
///
/// With feature `compression`, `.gz`, `.bz2` and (tar-wrapped) `.xz` files
/// are decompressed transparently. The name of the instance falls back to the
/// file name if the header has no `name` field.
///
/// # Errors
///
/// If the file does not exist, can not be read or is not a valid instance.
pub fn load_instance<P: AsRef<Path>>(path: P) -> Result<Instance, LoadError> {
    let path = path.as_ref();
    info!("loading {}", path.display());
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let raw = fio::read_text(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    detect_and_parse(&raw, &instances::file_name(path)).map_err(|source| LoadError::Parsing {
        path: path.to_path_buf(),
        source,
    })
}

/// The result of loading multiple files
#[derive(Debug, Default)]
pub struct BatchLoad {
    /// The successfully loaded instances, in input order
    pub instances: Vec<Instance>,
    /// The files that failed to load with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchLoad {
    /// Checks whether every file was loaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads multiple files independently
///
/// A file that fails to load is recorded in [`BatchLoad::failures`] and does
/// not affect the other files.
pub fn load_many<I, P>(paths: I) -> BatchLoad
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut batch = BatchLoad::default();
    for path in paths {
        let path = path.as_ref();
        match load_instance(path) {
            Ok(inst) => batch.instances.push(inst),
            Err(err) => {
                tracing::error!("failed to load {}: {err}", path.display());
                batch.failures.push((path.to_path_buf(), err.to_string()));
            }
        }
    }
    if !batch.is_complete() {
        warn!("{} files failed to load", batch.failures.len());
    }
    batch
}

/// Reads a dataset split file, listing one path per line
///
/// # Errors
///
/// If the file can not be read
pub fn load_dataset_split<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>, io::Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            files.push(PathBuf::from(line));
        }
    }
    Ok(files)
}

/// Writes a dataset split file, with the `base` prefix stripped from every
/// path that starts with it
///
/// # Errors
///
/// If the file can not be written
pub fn write_dataset_split<P, I, Q, B>(path: P, files: I, base: B) -> Result<(), io::Error>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Q>,
    Q: AsRef<Path>,
    B: AsRef<Path>,
{
    let mut writer = io::BufWriter::new(File::create(path)?);
    for file in files {
        let file = file.as_ref();
        let rel = file.strip_prefix(base.as_ref()).unwrap_or(file);
        writeln!(writer, "{}", rel.display())?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::{detect_and_parse, looks_like_size_line};
    use crate::instances::{
        fio::{unified, ParsingError},
        Instance,
    };

    fn ints(vals: &[i64]) -> Vec<BigInt> {
        vals.iter().copied().map(BigInt::from).collect()
    }

    #[test]
    fn size_line_shape() {
        assert!(looks_like_size_line("4 3"));
        assert!(looks_like_size_line("4 3 x"));
        assert!(!looks_like_size_line("4"));
        assert!(!looks_like_size_line("-4 3"));
        assert!(!looks_like_size_line("4 3.0"));
    }

    #[test]
    fn header_routes_graph() {
        let inst = detect_and_parse("# problem: graph_coloring\n3 2\n1 2\n2 3\n", "g").unwrap();
        assert!(matches!(inst, Instance::Graph(_)));
    }

    #[test]
    fn header_routes_npp() {
        // the header hint fails, content rules take over
        let inst = detect_and_parse("# problem: Number_Partitioning\n2 3\n", "npp");
        assert!(matches!(inst, Ok(Instance::Graph(_))));
        let inst = detect_and_parse("# problem: number_partitioning\n2\n3\n4\n", "npp").unwrap();
        assert_eq!(inst.as_npp().unwrap().values(), ints(&[3, 4]));
    }

    #[test]
    fn header_failure_falls_back() {
        let inst = detect_and_parse("# problem: graph_partitioning\n3\n5\n6\n7\n", "x").unwrap();
        assert_eq!(inst.as_npp().unwrap().values(), ints(&[5, 6, 7]));
    }

    #[test]
    fn content_graph() {
        let inst = detect_and_parse("4 3\n1 2\n2 3\n3 4\n", "g").unwrap();
        let graph = inst.as_graph().unwrap();
        assert_eq!(graph.n(), 4);
        assert_eq!(graph.m(), 3);
    }

    #[test]
    fn content_npp() {
        let inst = detect_and_parse("3\n10\n20\n30\n", "n").unwrap();
        assert_eq!(inst.as_npp().unwrap().values(), ints(&[10, 20, 30]));
        assert_eq!(inst.name(), "n");
    }

    #[test]
    fn wide_npp_values_kept() {
        let raw = "# problem: number_partitioning\n# n: 3\n\n3\n1180591620717411303423\n5\n\
                   944473296573929042739\n";
        let inst = detect_and_parse(raw, "mixed").unwrap();
        assert_eq!(inst.n(), 3);
        let raw = "2\n1267650600228229401496703205375\n633825300114114700748351602687\n";
        let npp = detect_and_parse(raw, "hard").unwrap().into_npp().unwrap();
        assert_eq!(npp.values()[0].bits(), 100);
        assert_eq!(npp.values()[1].bits(), 99);
    }

    #[test]
    fn content_npp_falls_back() {
        // not purely digits, but a valid size line
        let inst = detect_and_parse("+4 3\n1 2\n", "g").unwrap();
        assert_eq!(inst.as_graph().unwrap().m(), 1);
    }

    #[test]
    fn last_error() {
        assert!(matches!(
            detect_and_parse("x y\n", "n"),
            Err(ParsingError::Unified(unified::Error::SizeLine(_)))
        ));
        assert!(matches!(
            detect_and_parse("0\n", "n"),
            Err(ParsingError::Unified(unified::Error::SizeLine(_)))
        ));
        assert!(matches!(
            detect_and_parse("4 3\n", "n"),
            Ok(Instance::Graph(_))
        ));
        assert!(matches!(
            detect_and_parse("0 0\n", "n"),
            Err(ParsingError::Unified(unified::Error::CountLine(_)))
        ));
        assert!(matches!(
            detect_and_parse("5\n", "n"),
            Err(ParsingError::Unified(unified::Error::SizeLine(_)))
        ));
        assert!(matches!(
            detect_and_parse("# name: empty\n", "n"),
            Err(ParsingError::Unified(unified::Error::NoData))
        ));
    }
}
