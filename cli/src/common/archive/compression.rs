//! # Stowage Archive Formats (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! ## Overview
//!
//! The six container/compression combinations stowage can write and read, the
//! identifiers used for them on the command line and in the `config` block,
//! and the file suffix each one gets.
//!
//! | Identifier | Container | Compression | Suffix |
//! |---|---|---|---|
//! | `zip` | zip | deflate | `.zip` |
//! | `lzma` | zip | LZMA family (see below) | `.lzma` |
//! | `bz2` | zip | bzip2 | `.bz2` |
//! | `tar.gz` | tar | gzip | `.tar.gz` |
//! | `tar.bz2` | tar | bzip2 | `.tar.bz2` |
//! | `tar.xz` | tar | xz | `.tar.xz` |
//!
//! The `zip` crate can only decompress method 14 (LZMA), so `.lzma` archives
//! are written with method 95 (XZ, LZMA2). The reader accepts both.
//!
use crate::core::error::{Result, StowageError};
use anyhow::anyhow;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A supported archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    ZipLzma,
    ZipBzip2,
    TarGz,
    TarBz2,
    TarXz,
}

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 6] = [
        ArchiveFormat::Zip,
        ArchiveFormat::ZipLzma,
        ArchiveFormat::ZipBzip2,
        ArchiveFormat::TarGz,
        ArchiveFormat::TarBz2,
        ArchiveFormat::TarXz,
    ];

    /// Name used by `--compression` and the `config.compression` setting.
    pub fn identifier(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::ZipLzma => "lzma",
            ArchiveFormat::ZipBzip2 => "bz2",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarBz2 => "tar.bz2",
            ArchiveFormat::TarXz => "tar.xz",
        }
    }

    /// File suffix, including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::ZipLzma => ".lzma",
            ArchiveFormat::ZipBzip2 => ".bz2",
            ArchiveFormat::TarGz => ".tar.gz",
            ArchiveFormat::TarBz2 => ".tar.bz2",
            ArchiveFormat::TarXz => ".tar.xz",
        }
    }

    pub fn is_zip(self) -> bool {
        matches!(
            self,
            ArchiveFormat::Zip | ArchiveFormat::ZipLzma | ArchiveFormat::ZipBzip2
        )
    }

    /// Detects the format of `path` from its suffix. Tar suffixes are checked
    /// first so that `x.tar.bz2` is not taken for a bzip2 zip.
    pub fn from_archive_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let by_suffix_length = [
            ArchiveFormat::TarGz,
            ArchiveFormat::TarBz2,
            ArchiveFormat::TarXz,
            ArchiveFormat::Zip,
            ArchiveFormat::ZipLzma,
            ArchiveFormat::ZipBzip2,
        ];
        by_suffix_length
            .into_iter()
            .find(|format| name.ends_with(format.suffix()))
            .ok_or_else(|| anyhow!(StowageError::UnsupportedFormat(path.to_path_buf())))
    }

    /// `path` with this format's suffix appended, unless it already ends with it.
    pub fn append_suffix(self, path: &Path) -> PathBuf {
        let already = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(self.suffix()));
        if already {
            return path.to_path_buf();
        }
        let mut raw: OsString = path.as_os_str().to_owned();
        raw.push(self.suffix());
        PathBuf::from(raw)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ArchiveFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ArchiveFormat::ALL
            .into_iter()
            .find(|format| format.identifier() == wanted)
            .ok_or_else(|| anyhow!(StowageError::UnsupportedCompression(s.to_string())))
    }
}
