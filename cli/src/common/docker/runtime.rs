//! # devctl Container Runtime Seam
//!
//! File: cli/src/common/docker/runtime.rs
//!
//! ## Overview
//!
//! `ContainerRuntime` is the narrow set of container-runtime calls the device
//! proxy needs. The production implementation is `engine::DockerEngine`
//! (backed by `bollard`); tests drive the proxy with an in-memory runtime.
//!
//! Every method reports failures as `ProxyError`, so a missing container and an
//! unreachable runtime reach the caller through the same `Result`.
//!
use crate::core::error::ProxyResult;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::pin::Pin;
use tokio::io::AsyncWrite;

/// Stream of raw output chunks coming from a container.
pub type ChunkStream = BoxStream<'static, ProxyResult<Vec<u8>>>;

/// What the runtime knows about one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub running: bool,
    pub ports: Vec<PublishedPort>,
}

/// A container port published on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPort {
    /// Host IP the port is bound to; `None` or an unspecified address means all interfaces.
    pub host_ip: Option<String>,
    pub host_port: u16,
    pub container_port: u16,
}

/// Options for a log request.
#[derive(Debug, Clone)]
pub struct LogRequest {
    /// Keep the stream open and deliver new output as it is produced.
    pub follow: bool,
    /// Number of trailing lines, or `"all"`.
    pub tail: String,
    pub timestamps: bool,
}

/// Combined output and exit status of a command run inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub output: Vec<u8>,
    pub exit_code: i64,
}

/// An interactive exec session attached to a container.
pub struct ShellSession {
    /// Exec instance id, used to read the exit code once the session ends.
    pub exec_id: String,
    /// Terminal output; ends when the shell exits.
    pub output: ChunkStream,
    /// Keystrokes for the shell.
    pub input: Pin<Box<dyn AsyncWrite + Send>>,
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("exec_id", &self.exec_id)
            .finish_non_exhaustive()
    }
}

/// Container runtime operations used by the device proxy.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Looks a container up by name or id; `Ok(None)` when it does not exist.
    async fn inspect(&self, name_or_id: &str) -> ProxyResult<Option<ContainerInfo>>;

    /// Lists running containers together with their published ports.
    async fn list_running(&self) -> ProxyResult<Vec<ContainerInfo>>;

    /// Opens the combined stdout/stderr log stream of a container.
    async fn logs(&self, container_id: &str, request: &LogRequest) -> ProxyResult<ChunkStream>;

    /// Runs a command to completion and collects its combined output.
    async fn exec(&self, container_id: &str, cmd: &[String]) -> ProxyResult<CommandOutput>;

    /// Starts `cmd` with stdin attached and returns the live session.
    /// `tty` allocates a pseudo-terminal for it.
    async fn exec_interactive(
        &self,
        container_id: &str,
        cmd: &[String],
        tty: bool,
    ) -> ProxyResult<ShellSession>;

    /// Exit code of a finished exec instance, if the runtime reports one.
    async fn exec_exit_code(&self, exec_id: &str) -> ProxyResult<Option<i64>>;

    /// Extracts a tar archive into `dest_dir` inside the container.
    async fn upload(&self, container_id: &str, dest_dir: &str, archive: Vec<u8>) -> ProxyResult<()>;

    /// Returns `path` from inside the container packed as a tar archive.
    async fn download(&self, container_id: &str, path: &str) -> ProxyResult<Vec<u8>>;
}
