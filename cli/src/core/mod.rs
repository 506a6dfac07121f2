//! # devctl Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by every command:
//! - `config`: configuration loading, merging and validation
//! - `error`: application and proxy error types
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DevctlError, ProxyError, Result};
//! ```
//!
pub mod config;
pub mod error;
