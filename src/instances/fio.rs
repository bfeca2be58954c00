//! # Module for File IO (Writing and Parsing)
//!
//! Instances are stored either as plain text or in one of the compressed
//! containers. By convention, `.gz` files are a single gzip stream while `.xz`
//! files are a tar archive with a single member, compressed with xz. Bare xz
//! streams are accepted when reading as well.
//!
//! As the submodules have different APIs, it is recommended to parse and write
//! through the interface of instance types or the [loader](crate::loader)
//! rather than using these functions directly.

use std::{
    ffi::OsStr,
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::InvalidInstance;

pub mod dimacs;
pub mod header;
pub mod metis;
pub mod mtx;
pub mod pk;
pub mod unified;

/// Files larger than this are compressed with gzip rather than xz
pub const XZ_SIZE_LIMIT: u64 = 2 * 1024 * 1024 * 1024;

/// Combined Parsing Errors
#[derive(Error, Debug)]
pub enum ParsingError {
    /// IO Errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
    /// Unified format error
    #[error("unified format error: {0}")]
    Unified(#[from] unified::Error),
    /// DIMACS graph error
    #[error("DIMACS error: {0}")]
    Dimacs(#[from] dimacs::Error),
    /// DIMACS10 adjacency list error
    #[error("METIS error: {0}")]
    Metis(#[from] metis::Error),
    /// Matrix Market error
    #[error("Matrix Market error: {0}")]
    Mtx(#[from] mtx::Error),
    /// P&K dataset error
    #[error("P&K error: {0}")]
    Pk(#[from] pk::Error),
    /// The parsed data does not form a valid instance
    #[error("invalid instance: {0}")]
    Instance(#[from] InvalidInstance),
}

/// The container a file is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// Uncompressed
    Plain,
    /// A gzip stream
    Gzip,
    /// A tar archive with a single member compressed with xz, or a bare xz
    /// stream when reading
    Xz,
    /// A bzip2 stream
    Bzip2,
}

impl Container {
    /// Detects the container from the file extension
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Container {
        let Some(ext) = path.as_ref().extension() else {
            return Container::Plain;
        };
        if ext.eq_ignore_ascii_case(OsStr::new("gz")) {
            Container::Gzip
        } else if ext.eq_ignore_ascii_case(OsStr::new("xz")) {
            Container::Xz
        } else if ext.eq_ignore_ascii_case(OsStr::new("bz2")) {
            Container::Bzip2
        } else {
            Container::Plain
        }
    }

    /// Chooses the container for compressing a file of the given size
    #[must_use]
    pub fn for_size(bytes: u64) -> Container {
        if bytes > XZ_SIZE_LIMIT {
            Container::Gzip
        } else {
            Container::Xz
        }
    }

    /// Gets the file extension of the container
    #[must_use]
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Container::Plain => None,
            Container::Gzip => Some("gz"),
            Container::Xz => Some("xz"),
            Container::Bzip2 => Some("bz2"),
        }
    }

    /// Appends the extension of the container to a path
    #[must_use]
    pub fn append_extension<P: AsRef<Path>>(self, path: P) -> PathBuf {
        let path = path.as_ref();
        match self.extension() {
            Some(ext) => {
                let mut name = path.as_os_str().to_owned();
                name.push(".");
                name.push(ext);
                PathBuf::from(name)
            }
            None => path.to_path_buf(),
        }
    }

    /// Strips the container extension from a path, if it has one
    #[must_use]
    pub fn strip_extension<P: AsRef<Path>>(path: P) -> PathBuf {
        let path = path.as_ref();
        match Container::from_path(path) {
            Container::Plain => path.to_path_buf(),
            _ => path.with_extension(""),
        }
    }
}

/// Opens a reader for the file at Path.
/// With feature `compression` supports bzip2, gzip and bare xz streams. For
/// tar-wrapped xz, use [`read_text`] or [`read_bytes`].
///
/// # Errors
///
/// If the file cannot be opened
pub fn open_compressed_uncompressed_read<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Read>, io::Error> {
    let path = path.as_ref();
    let raw_reader = File::open(path)?;
    #[cfg(feature = "compression")]
    match Container::from_path(path) {
        Container::Gzip => return Ok(Box::new(flate2::read::GzDecoder::new(raw_reader))),
        Container::Xz => return Ok(Box::new(xz2::read::XzDecoder::new(raw_reader))),
        Container::Bzip2 => return Ok(Box::new(bzip2::read::BzDecoder::new(raw_reader))),
        Container::Plain => (),
    }
    Ok(Box::new(raw_reader))
}

/// Opens a writer for the file at Path.
/// With feature `compression` supports bzip2, gzip and bare xz streams. For
/// tar-wrapped xz, use [`write_container`] or [`compress_file`].
///
/// # Errors
///
/// If the file cannot be created
pub fn open_compressed_uncompressed_write<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Write>, io::Error> {
    let path = path.as_ref();
    let raw_writer = File::create(path)?;
    #[cfg(feature = "compression")]
    match Container::from_path(path) {
        Container::Gzip => {
            return Ok(Box::new(flate2::write::GzEncoder::new(
                raw_writer,
                flate2::Compression::default(),
            )))
        }
        Container::Xz => return Ok(Box::new(xz2::write::XzEncoder::new(raw_writer, 6))),
        Container::Bzip2 => {
            return Ok(Box::new(bzip2::write::BzEncoder::new(
                raw_writer,
                bzip2::Compression::default(),
            )))
        }
        Container::Plain => (),
    }
    Ok(Box::new(raw_writer))
}

/// Reads the decompressed content of a file
///
/// `.xz` files are first read as a tar archive and the content of its first
/// regular member is returned. If that fails, the file is read as a bare xz
/// stream.
///
/// # Errors
///
/// If the file cannot be read or decompressed
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, io::Error> {
    let path = path.as_ref();
    #[cfg(feature = "compression")]
    if Container::from_path(path) == Container::Xz {
        let compressed = std::fs::read(path)?;
        match untar_single_member(&compressed) {
            Ok(content) => return Ok(content),
            Err(err) => tracing::debug!(
                "{} is not a tar archive ({err}), reading as bare xz stream",
                path.display()
            ),
        }
        let mut content = Vec::new();
        xz2::read::XzDecoder::new(compressed.as_slice()).read_to_end(&mut content)?;
        return Ok(content);
    }
    let mut content = Vec::new();
    open_compressed_uncompressed_read(path)?.read_to_end(&mut content)?;
    Ok(content)
}

/// Reads the decompressed content of a file as text
///
/// Containers are handled as in [`read_bytes`]. A tar member that is not
/// valid UTF-8 also triggers the bare xz fallback.
///
/// # Errors
///
/// If the file cannot be read or decompressed, or is not valid UTF-8
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String, io::Error> {
    let path = path.as_ref();
    #[cfg(feature = "compression")]
    if Container::from_path(path) == Container::Xz {
        let compressed = std::fs::read(path)?;
        match untar_single_member(&compressed)
            .and_then(|content| String::from_utf8(content).map_err(invalid_data))
        {
            Ok(text) => return Ok(text),
            Err(err) => tracing::debug!(
                "{} has no text tar member ({err}), reading as bare xz stream",
                path.display()
            ),
        }
        let mut text = String::new();
        xz2::read::XzDecoder::new(compressed.as_slice()).read_to_string(&mut text)?;
        return Ok(text);
    }
    let mut text = String::new();
    open_compressed_uncompressed_read(path)?.read_to_string(&mut text)?;
    Ok(text)
}

/// Writes content to a file in the container given by its extension
///
/// An `.xz` file is written as a tar archive whose single member is named
/// after the file with the `.xz` extension stripped.
///
/// # Errors
///
/// If writing fails
pub fn write_container<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<(), io::Error> {
    write_stream(path.as_ref(), content.len() as u64, content)
}

/// Compresses the file at `src` into `dst`, with the container given by the
/// extension of `dst`. Returns the number of uncompressed bytes.
///
/// # Errors
///
/// If reading or writing fails
pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<u64, io::Error> {
    let src = File::open(src)?;
    let size = src.metadata()?.len();
    write_stream(dst.as_ref(), size, src)?;
    Ok(size)
}

/// Decompresses the file at `src` into the plain file `dst`, with the
/// container given by the extension of `src`. Returns the number of
/// decompressed bytes.
///
/// # Errors
///
/// If reading or writing fails
pub fn decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<u64, io::Error> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    #[cfg(feature = "compression")]
    if Container::from_path(src) == Container::Xz {
        let mut archive = tar::Archive::new(xz2::read::XzDecoder::new(File::open(src)?));
        match first_file_entry(&mut archive)
            .and_then(|mut entry| io::copy(&mut entry, &mut File::create(dst)?))
        {
            Ok(bytes) => return Ok(bytes),
            Err(err) => tracing::debug!(
                "{} is not a tar archive ({err}), reading as bare xz stream",
                src.display()
            ),
        }
    }
    let mut reader = open_compressed_uncompressed_read(src)?;
    io::copy(&mut reader, &mut File::create(dst)?)
}

#[cfg_attr(not(feature = "compression"), allow(unused_variables))]
fn write_stream<R: Read>(path: &Path, size: u64, mut content: R) -> Result<(), io::Error> {
    #[cfg(feature = "compression")]
    if Container::from_path(path) == Container::Xz {
        let encoder = xz2::write::XzEncoder::new(File::create(path)?, 6);
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(size);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, tar_member_name(path)?, content)?;
        builder.into_inner()?.finish()?.flush()?;
        return Ok(());
    }
    let mut writer = open_compressed_uncompressed_write(path)?;
    io::copy(&mut content, &mut writer)?;
    writer.flush()
}

/// Gets the name of the single tar member of an `.xz` file
fn tar_member_name(path: &Path) -> Result<PathBuf, io::Error> {
    Container::strip_extension(path)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })
}

#[cfg(feature = "compression")]
fn untar_single_member(compressed: &[u8]) -> Result<Vec<u8>, io::Error> {
    let mut archive = tar::Archive::new(xz2::read::XzDecoder::new(compressed));
    let mut entry = first_file_entry(&mut archive)?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;
    Ok(content)
}

#[cfg(feature = "compression")]
fn first_file_entry<R: Read>(archive: &mut tar::Archive<R>) -> Result<tar::Entry<'_, R>, io::Error> {
    for entry in archive.entries()? {
        let entry = entry?;
        if entry.header().entry_type().is_file() {
            return Ok(entry);
        }
    }
    Err(invalid_data("tar archive has no file member"))
}

#[cfg(feature = "compression")]
fn invalid_data<E>(err: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, err)
}
