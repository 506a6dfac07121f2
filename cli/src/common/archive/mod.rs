//! # devctl Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Archive helpers used by the `put` and `get` device commands. The Docker
//! archive endpoints exchange tarballs, so files are packed before upload and
//! unpacked after download.
//!
//! ```rust
//! use crate::common::archive;
//!
//! let bytes = archive::tar::pack_path(Path::new("./firmware"))?;
//! archive::tar::unpack_archive(&bytes, Path::new("/tmp/out"))?;
//! ```
//!

pub mod tar;
