//! # Unified Format Header
//!
//! Every file in the unified format starts with comment lines of the form
//! `# key: value`. Lines starting with `#` without a `:` are plain comments
//! and are ignored. Keys are case-insensitive and stored lower-cased, values
//! are kept as raw strings.

use std::{
    collections::BTreeMap,
    io::{self, Write},
    str::FromStr,
};

use itertools::Itertools;
use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::rest,
    sequence::{preceded, separated_pair},
    IResult,
};

use crate::types::Problem;

/// Keys that are written first and in this order
const WELL_KNOWN_KEYS: [&str; 7] = ["problem", "name", "n", "m", "k", "weighted", "directed"];

/// The `# key: value` metadata of a unified format file
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: BTreeMap<String, String>,
}

impl Header {
    /// Creates an empty header
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, lower-casing and trimming the key and trimming the value
    pub fn insert<K: AsRef<str>, V: ToString>(&mut self, key: K, value: V) {
        self.fields.insert(
            key.as_ref().trim().to_lowercase(),
            value.to_string().trim().to_owned(),
        );
    }

    /// Builder style version of [`Header::insert`]
    #[must_use]
    pub fn with<K: AsRef<str>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Gets the raw value of a field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Gets the value of a field converted to `T`
    ///
    /// Returns [`None`] if the field is missing or does not parse.
    #[must_use]
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|val| val.parse().ok())
    }

    /// Gets the raw `problem` field
    #[must_use]
    pub fn problem(&self) -> Option<&str> {
        self.get("problem")
    }

    /// Gets the `problem` field as a known problem
    #[must_use]
    pub fn problem_kind(&self) -> Option<Problem> {
        self.get_parsed("problem")
    }

    /// Gets the `name` field
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    /// Gets the number of blocks or colors, where `0` means unknown
    #[must_use]
    pub fn k(&self) -> Option<usize> {
        self.get_parsed("k")
    }

    /// Removes a field
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(&key.to_lowercase())
    }

    /// Checks whether the header has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Gets the number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over the fields in the order they are written in
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = WELL_KNOWN_KEYS
            .iter()
            .filter_map(|key| self.fields.get_key_value(*key));
        let other = self
            .fields
            .iter()
            .filter(|(key, _)| !WELL_KNOWN_KEYS.contains(&key.as_str()));
        known
            .chain(other)
            .map(|(key, val)| (key.as_str(), val.as_str()))
    }
}

impl<K: AsRef<str>, V: ToString> FromIterator<(K, V)> for Header {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut header = Header::new();
        iter.into_iter().for_each(|(key, val)| header.insert(key, val));
        header
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter().map(|(key, val)| format!("{key}: {val}")).join(", ")
        )
    }
}

/// Parses the header fields from the raw text of a unified format file
///
/// Every line is inspected, not only the leading block. If a key appears
/// multiple times, the last occurrence wins.
#[must_use]
pub fn parse_header(raw: &str) -> Header {
    let mut header = Header::new();
    for line in raw.lines() {
        if let Ok((_, (key, value))) = header_line(line) {
            header.insert(key, value);
        }
    }
    header
}

/// Writes the header as `# key: value` lines
///
/// # Errors
///
/// If writing fails
pub fn write_header<W: Write>(writer: &mut W, header: &Header) -> Result<(), io::Error> {
    header
        .iter()
        .try_for_each(|(key, val)| writeln!(writer, "# {key}: {val}"))
}

/// Splits a `#` line on its first colon
fn header_line(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        char('#'),
        separated_pair(take_till(|c| c == ':'), char(':'), rest),
    )(input)
}
