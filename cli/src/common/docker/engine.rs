//! # devctl Docker Engine Runtime
//!
//! File: cli/src/common/docker/engine.rs
//!
//! ## Overview
//!
//! `DockerEngine` implements `ContainerRuntime` on top of `bollard`. It is a
//! thin translation layer: each trait method issues one or two Docker Engine
//! API calls and converts the responses and errors into devctl's types.
//!
//! Error mapping:
//! - HTTP 404 from the engine → `Ok(None)` for inspect, `ProxyError::ContainerNotFound` elsewhere
//! - any other HTTP error response → `ProxyError::Api`
//! - transport failures (socket missing, connection refused, timeout) → `ProxyError::RuntimeUnavailable`
//!
use super::runtime::{
    ChunkStream, CommandOutput, ContainerInfo, ContainerRuntime, LogRequest, PublishedPort,
    ShellSession,
};
use crate::core::error::{ProxyError, ProxyResult};
use async_trait::async_trait;
use bollard::{
    container::{
        DownloadFromContainerOptions, InspectContainerOptions, ListContainersOptions, LogsOptions,
        UploadToContainerOptions,
    },
    errors::Error as BollardError,
    exec::{CreateExecOptions, StartExecOptions, StartExecResults},
    models::{ContainerInspectResponse, ContainerSummary},
    Docker,
};
use futures_util::{StreamExt, TryStreamExt};
use tracing::{debug, instrument, warn};

/// Container runtime backed by a Docker Engine API client.
pub struct DockerEngine {
    client: Docker,
}

impl DockerEngine {
    pub fn new(client: Docker) -> Self {
        Self { client }
    }
}

/// Converts a bollard error into a proxy error, using `container` for 404s.
fn map_runtime_error(e: BollardError, container: &str) -> ProxyError {
    match &e {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => ProxyError::ContainerNotFound {
            address: container.to_string(),
        },
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => ProxyError::Api(format!("{} (HTTP {})", message, status_code)),
        _ => ProxyError::RuntimeUnavailable {
            reason: e.to_string(),
        },
    }
}

fn strip_name(name: &str) -> String {
    name.trim_start_matches('/').to_string()
}

fn info_from_inspect(details: ContainerInspectResponse, fallback: &str) -> ContainerInfo {
    let running = details
        .state
        .as_ref()
        .and_then(|s| s.running)
        .unwrap_or(false);

    let mut ports = Vec::new();
    let port_map = details.network_settings.and_then(|n| n.ports).unwrap_or_default();
    for (key, bindings) in port_map {
        // Keys look like "22/tcp".
        let Some(container_port) = key.split('/').next().and_then(|p| p.parse().ok()) else {
            continue;
        };
        for binding in bindings.unwrap_or_default() {
            if let Some(host_port) = binding.host_port.as_deref().and_then(|p| p.parse().ok()) {
                ports.push(PublishedPort {
                    host_ip: binding.host_ip.clone(),
                    host_port,
                    container_port,
                });
            }
        }
    }

    ContainerInfo {
        id: details.id.unwrap_or_else(|| fallback.to_string()),
        name: details
            .name
            .as_deref()
            .map(strip_name)
            .unwrap_or_else(|| fallback.to_string()),
        running,
        ports,
    }
}

fn info_from_summary(summary: ContainerSummary) -> ContainerInfo {
    let id = summary.id.unwrap_or_default();
    let name = summary
        .names
        .and_then(|names| names.first().map(|n| strip_name(n)))
        .unwrap_or_else(|| id.clone());
    let ports = summary
        .ports
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            p.public_port.map(|host_port| PublishedPort {
                host_ip: p.ip.clone(),
                host_port,
                container_port: p.private_port,
            })
        })
        .collect();

    ContainerInfo {
        id,
        name,
        running: summary.state.as_deref() == Some("running"),
        ports,
    }
}

#[async_trait]
impl ContainerRuntime for DockerEngine {
    #[instrument(skip(self))]
    async fn inspect(&self, name_or_id: &str) -> ProxyResult<Option<ContainerInfo>> {
        match self
            .client
            .inspect_container(name_or_id, None::<InspectContainerOptions>)
            .await
        {
            Ok(details) => Ok(Some(info_from_inspect(details, name_or_id))),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("Container '{}' does not exist (404).", name_or_id);
                Ok(None)
            }
            Err(e) => Err(map_runtime_error(e, name_or_id)),
        }
    }

    #[instrument(skip(self))]
    async fn list_running(&self) -> ProxyResult<Vec<ContainerInfo>> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| map_runtime_error(e, "<list>"))?;
        debug!("Runtime reports {} running containers", summaries.len());
        Ok(summaries.into_iter().map(info_from_summary).collect())
    }

    #[instrument(skip(self, request), fields(follow = request.follow, tail = %request.tail))]
    async fn logs(&self, container_id: &str, request: &LogRequest) -> ProxyResult<ChunkStream> {
        let options = LogsOptions::<String> {
            follow: request.follow,
            stdout: true,
            stderr: true,
            tail: request.tail.clone(),
            timestamps: request.timestamps,
            ..Default::default()
        };
        let container = container_id.to_string();
        let stream = self
            .client
            .logs(container_id, Some(options))
            .map_ok(|chunk| chunk.into_bytes().to_vec())
            .map_err(move |e| map_runtime_error(e, &container));
        Ok(stream.boxed())
    }

    #[instrument(skip(self))]
    async fn exec(&self, container_id: &str, cmd: &[String]) -> ProxyResult<CommandOutput> {
        let options = CreateExecOptions {
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            cmd: Some(cmd.to_vec()),
            ..Default::default()
        };
        let created = self
            .client
            .create_exec(container_id, options)
            .await
            .map_err(|e| map_runtime_error(e, container_id))?;

        let mut output = Vec::new();
        match self
            .client
            .start_exec(&created.id, None)
            .await
            .map_err(|e| map_runtime_error(e, container_id))?
        {
            StartExecResults::Attached { output: mut stream, .. } => {
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| map_runtime_error(e, container_id))?;
                    output.extend_from_slice(&chunk.into_bytes());
                }
            }
            StartExecResults::Detached => {
                warn!("Exec '{}' started detached; no output captured", created.id);
            }
        }

        let inspected = self
            .client
            .inspect_exec(&created.id)
            .await
            .map_err(|e| map_runtime_error(e, container_id))?;
        Ok(CommandOutput {
            output,
            exit_code: inspected.exit_code.unwrap_or(-1),
        })
    }

    #[instrument(skip(self))]
    async fn exec_interactive(
        &self,
        container_id: &str,
        cmd: &[String],
        tty: bool,
    ) -> ProxyResult<ShellSession> {
        let options = CreateExecOptions {
            attach_stdin: Some(true),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(tty),
            cmd: Some(cmd.to_vec()),
            ..Default::default()
        };
        let created = self
            .client
            .create_exec(container_id, options)
            .await
            .map_err(|e| map_runtime_error(e, container_id))?;

        let start_options = StartExecOptions {
            detach: false,
            tty,
            ..Default::default()
        };
        match self
            .client
            .start_exec(&created.id, Some(start_options))
            .await
            .map_err(|e| map_runtime_error(e, container_id))?
        {
            StartExecResults::Attached { output, input } => {
                let container = container_id.to_string();
                let output = output
                    .map_ok(|chunk| chunk.into_bytes().to_vec())
                    .map_err(move |e| map_runtime_error(e, &container));
                Ok(ShellSession {
                    exec_id: created.id,
                    output: output.boxed(),
                    input,
                })
            }
            StartExecResults::Detached => Err(ProxyError::Api(format!(
                "exec '{}' started detached; no terminal to attach to",
                created.id
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn exec_exit_code(&self, exec_id: &str) -> ProxyResult<Option<i64>> {
        let inspected = self
            .client
            .inspect_exec(exec_id)
            .await
            .map_err(|e| map_runtime_error(e, exec_id))?;
        Ok(inspected.exit_code)
    }

    #[instrument(skip(self, archive), fields(archive_len = archive.len()))]
    async fn upload(&self, container_id: &str, dest_dir: &str, archive: Vec<u8>) -> ProxyResult<()> {
        let options = UploadToContainerOptions {
            path: dest_dir.to_string(),
            ..Default::default()
        };
        self.client
            .upload_to_container(container_id, Some(options), archive.into())
            .await
            .map_err(|e| match e {
                BollardError::DockerResponseServerError {
                    status_code: 404,
                    message,
                } => ProxyError::Transfer(format!(
                    "destination '{}' not found on device: {}",
                    dest_dir, message
                )),
                other => map_runtime_error(other, container_id),
            })
    }

    #[instrument(skip(self))]
    async fn download(&self, container_id: &str, path: &str) -> ProxyResult<Vec<u8>> {
        let options = DownloadFromContainerOptions {
            path: path.to_string(),
        };
        let mut stream = self.client.download_from_container(container_id, Some(options));
        let mut archive = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| match e {
                BollardError::DockerResponseServerError {
                    status_code: 404,
                    message,
                } => ProxyError::Transfer(format!(
                    "path '{}' not found on device: {}",
                    path, message
                )),
                other => map_runtime_error(other, container_id),
            })?;
            archive.extend_from_slice(&chunk);
        }
        Ok(archive)
    }
}
