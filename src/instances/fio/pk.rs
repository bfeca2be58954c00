//! # Parsing P&K Number Partitioning Files
//!
//! The number partitioning datasets of Pedroso and Kubo store one instance
//! per `.dat` file. The first line holds `n k`, every following line a single
//! value.

use std::io::{self, BufRead, BufReader, Read};

use num_bigint::BigInt;
use thiserror::Error;
use tracing::{debug, warn};

use super::unified::RawNumbers;

/// Errors occuring within the P&K parsing module
#[derive(Error, Debug)]
pub enum Error {
    /// The file is empty
    #[error("empty file")]
    Empty,
    /// Invalid first line
    #[error("invalid first line: {0}")]
    FirstLine(String),
    /// IO error reading file
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::FirstLine(l0), Self::FirstLine(r0)) => l0 == r0,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// Parses a P&K dataset from a reader (typically a file)
///
/// A first line with fewer than two tokens leaves `k` at `0`. Value lines
/// that do not hold a single integer are skipped.
///
/// # Errors
///
/// If reading fails, the file is empty or the first line holds tokens that
/// are not integers.
pub fn parse_dat<R: Read>(reader: R) -> Result<RawNumbers, Error> {
    let mut lines = BufReader::new(reader).lines();
    let first = lines.next().ok_or(Error::Empty)??;
    let mut tokens = first.split_whitespace();
    let (n, k) = match (tokens.next(), tokens.next()) {
        (Some(n), Some(k)) => match (n.parse::<usize>(), k.parse::<usize>()) {
            (Ok(n), Ok(k)) => (Some(n), k),
            _ => return Err(Error::FirstLine(first.clone())),
        },
        _ => {
            warn!("first line '{first}' does not hold `n k`, assuming k = 0");
            (None, 0)
        }
    };

    let mut values = Vec::with_capacity(n.unwrap_or_default().min(1 << 20));
    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<BigInt>() {
            Ok(val) => values.push(val),
            Err(_) => debug!("skipping invalid value line '{trimmed}'"),
        }
    }
    if let Some(n) = n {
        if n != values.len() {
            warn!("value count mismatch: declared {n}, found {}", values.len());
        }
    }
    Ok(RawNumbers { values, k })
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::{parse_dat, Error};
    use crate::instances::fio::unified::RawNumbers;

    fn ints(vals: &[i64]) -> Vec<BigInt> {
        vals.iter().copied().map(BigInt::from).collect()
    }

    #[test]
    fn parse_pass() {
        let data = "4 2\n17\n5\n\nnot a number\n3 4\n-8\n";
        assert_eq!(
            parse_dat(data.as_bytes()),
            Ok(RawNumbers {
                values: ints(&[17, 5, -8]),
                k: 2
            })
        );
    }

    #[test]
    fn short_first_line() {
        assert_eq!(
            parse_dat("3\n1\n2\n3\n".as_bytes()),
            Ok(RawNumbers {
                values: ints(&[1, 2, 3]),
                k: 0
            })
        );
    }

    #[test]
    fn hard_instance_values() {
        let data = "2 2\n1267650600228229401496703205375\n633825300114114700748351602687\n";
        let raw = parse_dat(data.as_bytes()).unwrap();
        assert_eq!(raw.values.len(), 2);
        assert_eq!(raw.values[0].bits(), 100);
        assert_eq!(raw.values[1].to_string(), "633825300114114700748351602687");
    }

    #[test]
    fn parse_fail() {
        assert_eq!(parse_dat("".as_bytes()), Err(Error::Empty));
        assert_eq!(
            parse_dat("n k\n1\n".as_bytes()),
            Err(Error::FirstLine(String::from("n k")))
        );
    }
}
