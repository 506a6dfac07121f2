//! # devctl Device Layer
//!
//! File: cli/src/device/mod.rs
//!
//! ## Overview
//!
//! A "device" is an embedded Linux target realised as a Docker container.
//! This module holds the two pieces every device command is built from:
//!
//! - `address`: parsing of the `name` / `host:port` device address
//! - `proxy`: `DockerProxy`, which resolves an address to a running container
//!   and performs device operations through a `ContainerRuntime`
//!
//! ```rust
//! let address = DeviceAddress::parse("localhost:2222")?;
//! let proxy = DockerProxy::connect(address, &cfg.runtime)?;
//! match proxy.get_container_logs(&LogOptions::default()).await {
//!     Ok(ContainerLogs::Snapshot(bytes)) => { /* print */ }
//!     Ok(ContainerLogs::Stream(stream)) => { /* forward */ }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
pub mod address;
pub mod proxy;

#[cfg(test)]
pub(crate) mod testing;

pub use address::DeviceAddress;
pub use proxy::{ContainerLogs, DockerProxy, LogOptions};
