//! # devctl TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! File transfers to and from a device travel as tar archives, because that is
//! what the Docker archive endpoints accept and produce.
//!
//! - `pack_path` archives a local file or directory into a gzipped tarball in
//!   memory. The top-level entry keeps the source's own name, so uploading
//!   `./conf` into `/etc` produces `/etc/conf/...` on the device.
//! - `unpack_archive` extracts a tar (plain or gzipped) into a local directory.
//!
use crate::core::error::Result;
use anyhow::{anyhow, Context};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::{fs, io::Read, path::Path};
use tar::{Archive, Builder};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Creates a gzipped tar archive containing `src` (a file or directory).
///
/// # Errors
///
/// Returns an `Err` if `src` does not exist, has no file name, or cannot be read.
pub fn pack_path(src: &Path) -> Result<Vec<u8>> {
    let name = src
        .file_name()
        .ok_or_else(|| anyhow!("Cannot archive '{}': path has no file name", src.display()))?;
    let metadata = fs::metadata(src)
        .with_context(|| format!("Failed to read source path '{}'", src.display()))?;

    let mut tar_gz_bytes = Vec::new();
    let enc = GzEncoder::new(&mut tar_gz_bytes, Compression::default());
    let mut tar_builder = Builder::new(enc);

    if metadata.is_dir() {
        tar_builder
            .append_dir_all(name, src)
            .with_context(|| format!("Failed to add directory '{}' to the archive", src.display()))?;
    } else {
        tar_builder
            .append_path_with_name(src, name)
            .with_context(|| format!("Failed to add file '{}' to the archive", src.display()))?;
    }

    let encoder = tar_builder
        .into_inner()
        .context("Failed to finalize tar archive structure")?;
    encoder
        .finish()
        .context("Failed to finish gzip compression stream")?;

    Ok(tar_gz_bytes)
}

/// Extracts `archive` into `dest`, creating `dest` if needed.
///
/// # Errors
///
/// Returns an `Err` if the destination cannot be created or the archive is malformed.
pub fn unpack_archive(archive: &[u8], dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create destination '{}'", dest.display()))?;

    let reader: Box<dyn Read + '_> = if archive.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(archive))
    } else {
        Box::new(archive)
    };
    Archive::new(reader)
        .unpack(dest)
        .with_context(|| format!("Failed to unpack archive into '{}'", dest.display()))
}
