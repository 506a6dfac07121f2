//! # devctl Docker Connection Helper
//!
//! File: cli/src/common/docker/connect.rs
//!
//! ## Overview
//!
//! Builds the `bollard::Docker` client for the configured runtime endpoint.
//! Creating the client does not touch the network; an unreachable endpoint is
//! only noticed by the first request, which maps it to
//! `ProxyError::RuntimeUnavailable`.
//!
//! Endpoint forms:
//! - unset: `Docker::connect_with_local_defaults()` (honours `DOCKER_HOST`)
//! - `unix:///path/docker.sock` or `/path/docker.sock`: unix socket
//! - `tcp://host:port` or `http://host:port`: plain HTTP
//!
use crate::core::config::RuntimeConfig;
use crate::core::error::{ProxyError, ProxyResult};
use bollard::{Docker, API_DEFAULT_VERSION};
use std::time::Duration;
use tracing::{debug, instrument};

/// Creates a Docker client for the configured endpoint.
///
/// # Errors
///
/// Returns `ProxyError::RuntimeUnavailable` if bollard rejects the endpoint
/// (for example an unsupported scheme or a malformed address).
#[instrument(skip(runtime), fields(endpoint = ?runtime.endpoint))]
pub fn connect_docker(runtime: &RuntimeConfig) -> ProxyResult<Docker> {
    let timeout = runtime.timeout_secs;
    let client = match runtime.endpoint.as_deref() {
        None => {
            debug!("Connecting with local Docker defaults");
            Docker::connect_with_local_defaults()
                .map(|docker| docker.with_timeout(Duration::from_secs(timeout)))
        }
        Some(endpoint) if endpoint.starts_with("tcp://") || endpoint.starts_with("http://") => {
            debug!("Connecting to Docker over HTTP at {}", endpoint);
            Docker::connect_with_http(endpoint, timeout, API_DEFAULT_VERSION)
        }
        Some(endpoint) => {
            let path = endpoint.trim_start_matches("unix://");
            debug!("Connecting to Docker socket at {}", path);
            Docker::connect_with_socket(path, timeout, API_DEFAULT_VERSION)
        }
    };

    client.map_err(|e| ProxyError::RuntimeUnavailable {
        reason: format!("failed to set up Docker client: {}", e),
    })
}
