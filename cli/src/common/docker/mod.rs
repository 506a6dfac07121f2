//! # devctl Docker Module Interface
//!
//! File: cli/src/common/docker/mod.rs
//!
//! ## Overview
//!
//! Everything that talks to the container runtime lives here:
//!
//! - **`connect`**: builds the `bollard::Docker` client for the configured endpoint.
//! - **`runtime`**: the `ContainerRuntime` trait the device proxy is written against.
//! - **`engine`**: `DockerEngine`, the bollard-backed `ContainerRuntime`.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::docker;
//!
//! let client = docker::connect_docker(&cfg.runtime)?;
//! let runtime = docker::DockerEngine::new(client);
//! ```
//!

/// Builds the Docker client for the configured endpoint.
pub mod connect;
/// Bollard-backed implementation of `ContainerRuntime`.
pub mod engine;
/// The runtime operations the device proxy depends on.
pub mod runtime;

pub use connect::connect_docker;
pub use engine::DockerEngine;
pub use runtime::{
    ChunkStream, CommandOutput, ContainerInfo, ContainerRuntime, LogRequest, PublishedPort,
    ShellSession,
};
