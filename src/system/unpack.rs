// src/system/unpack.rs

//! Archive extraction
//!
//! Supports tarballs compressed with gzip or xz, plain tarballs, and plain
//! directories (copied under their own name so they look like an unpacked
//! tarball with one top-level directory).

use crate::error::{Error, Result};
use crate::filesystem::copy_tree;
use crate::recipe::Unpacker;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;
use xz2::read::XzDecoder;

/// Compression of a tarball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain tar
    None,
    Gzip,
    Xz,
}

impl CompressionFormat {
    /// Detect the compression of a tarball from its file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::Gzip)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::Xz)
        } else if name.ends_with(".tar") {
            Some(Self::None)
        } else {
            None
        }
    }
}

/// Unpacker for tarballs and directories
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveUnpacker;

impl ArchiveUnpacker {
    pub fn new() -> Self {
        Self
    }
}

impl Unpacker for ArchiveUnpacker {
    fn unpack(&self, archive: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)?;

        if archive.is_dir() {
            let name = archive
                .file_name()
                .ok_or_else(|| Error::UnpackError(format!("Bad source directory {}", archive.display())))?;
            debug!("Copying source directory {}", archive.display());
            return copy_tree(archive, &destination.join(name));
        }

        let file_name = archive.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let format = CompressionFormat::from_file_name(file_name).ok_or_else(|| {
            Error::UnpackError(format!("Unknown archive format: {}", archive.display()))
        })?;

        let file = BufReader::new(File::open(archive)?);
        let reader: Box<dyn Read> = match format {
            CompressionFormat::None => Box::new(file),
            CompressionFormat::Gzip => Box::new(GzDecoder::new(file)),
            CompressionFormat::Xz => Box::new(XzDecoder::new(file)),
        };

        debug!("Extracting {} ({:?})", archive.display(), format);
        tar::Archive::new(reader).unpack(destination).map_err(|e| {
            Error::UnpackError(format!("Failed to extract {}: {}", archive.display(), e))
        })
    }
}
