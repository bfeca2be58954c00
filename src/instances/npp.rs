//! # Number Partitioning Instance Representation

use std::{io, path::Path};

use num_bigint::{BigInt, Sign};
use tracing::warn;

use super::{
    fio::{self, header::Header},
    InvalidInstance,
};

/// A multiset of integers to be partitioned
///
/// The order of the values is significant. `n` is always the number of values
/// actually present, regardless of the count declared in the file. Values are
/// arbitrary-precision integers, as hard benchmark instances use values with
/// hundreds of bits.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NppInstance {
    name: String,
    values: Vec<BigInt>,
    meta: Header,
}

impl NppInstance {
    /// Creates a new instance
    ///
    /// Non-positive values are accepted but reported.
    ///
    /// # Errors
    ///
    /// If `values` is empty
    pub fn new<S: Into<String>>(
        name: S,
        values: Vec<BigInt>,
        meta: Header,
    ) -> Result<Self, InvalidInstance> {
        if values.is_empty() {
            return Err(InvalidInstance::NoValues);
        }
        let inst = NppInstance {
            name: name.into(),
            values,
            meta,
        };
        let non_positive = inst.values.iter().filter(|v| v.sign() != Sign::Plus).count();
        if non_positive > 0 {
            warn!(
                "number partitioning instance '{}' contains {non_positive} non-positive values",
                inst.name
            );
        }
        Ok(inst)
    }

    /// Gets the display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the number of values
    #[must_use]
    pub fn n(&self) -> usize {
        self.values.len()
    }

    /// Gets the values
    #[must_use]
    pub fn values(&self) -> &[BigInt] {
        &self.values
    }

    /// Gets the header metadata
    #[must_use]
    pub fn meta(&self) -> &Header {
        &self.meta
    }

    /// Gets the number of subsets from the header, `0` if unknown
    #[must_use]
    pub fn k(&self) -> usize {
        self.meta.k().unwrap_or(0)
    }

    /// Gets the sum of all values
    #[must_use]
    pub fn sum(&self) -> BigInt {
        self.values.iter().sum()
    }

    /// Decomposes the instance into its parts
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<BigInt>, Header) {
        (self.name, self.values, self.meta)
    }

    /// Parses an instance from a reader in the unified format
    ///
    /// # Errors
    ///
    /// If reading fails or the input is not a valid number partitioning file
    pub fn from_unified<R: io::Read>(
        mut reader: R,
        default_name: &str,
    ) -> Result<Self, fio::ParsingError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Ok(fio::unified::parse_npp(&raw, default_name)?)
    }

    /// Parses an instance from a unified format file. With feature
    /// `compression` supports gzip, bzip2 and (tar-wrapped) xz compression,
    /// detected by the file extension.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not a valid number partitioning file
    pub fn from_unified_path<P: AsRef<Path>>(path: P) -> Result<Self, fio::ParsingError> {
        let raw = fio::read_text(&path)?;
        Ok(fio::unified::parse_npp(&raw, &super::file_name(path))?)
    }

    /// Writes the instance in the unified format
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn to_unified<W: io::Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        fio::unified::write_npp(writer, self)
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
