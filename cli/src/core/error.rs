//! # devctl Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout devctl. There are two
//! families:
//!
//! - `DevctlError`: application-level failures (configuration, invalid
//!   arguments, local I/O). These travel as `anyhow::Error` through the
//!   `Result<T>` alias and end the process with a non-zero status in `main.rs`.
//! - `ProxyError`: failures of a device operation performed through the
//!   Docker proxy. Proxy operations return `ProxyResult<T>` so that command
//!   handlers can match on the outcome, log it and finish cleanly.
//!
//! ## Examples
//!
//! ```rust
//! match proxy.get_container_logs(&options).await {
//!     Ok(logs) => write_logs(logs).await?,
//!     Err(e) if e.is_runtime_unavailable() => eprintln!("Error: {}", e),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
use thiserror::Error;

/// Application-level error type for devctl.
#[derive(Error, Debug)]
pub enum DevctlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid device address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to write output: {source}")]
    Output {
        #[from]
        source: std::io::Error,
    },
}

/// Failure of a device operation performed through the Docker proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// No container backs the requested device address.
    #[error("No container found for device '{address}'")]
    ContainerNotFound { address: String },

    /// A container backs the address but it is not running.
    #[error("Container '{container}' for device '{address}' is not running")]
    ContainerNotRunning { address: String, container: String },

    /// The container runtime endpoint could not be reached at all.
    #[error("Container runtime is unavailable: {reason}")]
    RuntimeUnavailable { reason: String },

    /// The runtime answered, but the request failed.
    #[error("Container runtime request failed: {0}")]
    Api(String),

    /// Packing or unpacking a file transfer archive failed.
    #[error("File transfer failed: {0}")]
    Transfer(String),
}

impl ProxyError {
    /// True when the failure is the runtime endpoint itself being unreachable.
    pub fn is_runtime_unavailable(&self) -> bool {
        matches!(self, ProxyError::RuntimeUnavailable { .. })
    }
}

/// Type alias for Result using anyhow::Error for application plumbing.
pub type Result<T> = anyhow::Result<T>;

/// Result of a proxy operation.
pub type ProxyResult<T> = std::result::Result<T, ProxyError>;
