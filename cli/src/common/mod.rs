//! # devctl Common Utilities
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared plumbing used by the device layer:
//!
//! - `docker`: the container runtime seam and its bollard implementation
//! - `archive`: tar packing/unpacking for file transfers
//!

/// Tar archives for device file transfers.
pub mod archive;
/// Container runtime access (connection, runtime trait, Docker engine).
pub mod docker;
