//! # devctl Docker Device Proxy
//!
//! File: cli/src/device/proxy.rs
//!
//! ## Overview
//!
//! `DockerProxy` is the single point of contact between a device command and
//! the container runtime. It is built for exactly one `DeviceAddress` and
//! never re-bound; creating it performs no I/O. Every operation first resolves
//! the address to a running container, so a missing device is reported by the
//! operation that needed it.
//!
//! Resolution rules:
//! - `Container(name)`: the container with that name or id must exist and be running.
//! - `Published { host, port }`: the first running container publishing host
//!   port `port`. When `host` is an IP literal, bindings to a different
//!   specific IP are skipped.
//!
//! All operations return `ProxyResult<T>`; callers decide how to surface
//! failures.
//!
use crate::common::archive::tar::{pack_path, unpack_archive};
use crate::common::docker::{
    connect_docker, ChunkStream, CommandOutput, ContainerInfo, ContainerRuntime, DockerEngine,
    LogRequest, PublishedPort, ShellSession,
};
use crate::core::config::RuntimeConfig;
use crate::core::error::{ProxyError, ProxyResult};
use crate::device::DeviceAddress;
use futures_util::StreamExt;
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Log retrieval options for `get_container_logs`.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Stream live output instead of returning a snapshot.
    pub attach: bool,
    /// Number of trailing lines, or `"all"`.
    pub tail: String,
    pub timestamps: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            attach: false,
            tail: "all".to_string(),
            timestamps: false,
        }
    }
}

/// Log output of a device.
pub enum ContainerLogs {
    /// Everything currently buffered by the runtime.
    Snapshot(Vec<u8>),
    /// Live output; ends when the container stops.
    Stream(ChunkStream),
}

impl std::fmt::Debug for ContainerLogs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerLogs::Snapshot(bytes) => write!(f, "Snapshot({} bytes)", bytes.len()),
            ContainerLogs::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// Device operations delegated to a container runtime.
pub struct DockerProxy<R = DockerEngine> {
    address: DeviceAddress,
    runtime: R,
}

impl DockerProxy<DockerEngine> {
    /// Builds a proxy backed by the Docker engine at the configured endpoint.
    pub fn connect(address: DeviceAddress, runtime: &RuntimeConfig) -> ProxyResult<Self> {
        let client = connect_docker(runtime)?;
        Ok(Self::new(address, DockerEngine::new(client)))
    }
}

fn is_unspecified(ip: Option<&str>) -> bool {
    match ip {
        None => true,
        Some(ip) => ip.is_empty() || ip.parse::<IpAddr>().is_ok_and(|ip| ip.is_unspecified()),
    }
}

fn binding_matches(port: &PublishedPort, wanted_port: u16, host_ip: Option<IpAddr>) -> bool {
    if port.host_port != wanted_port {
        return false;
    }
    match host_ip {
        None => true,
        Some(wanted) => {
            is_unspecified(port.host_ip.as_deref())
                || port
                    .host_ip
                    .as_deref()
                    .and_then(|ip| ip.parse::<IpAddr>().ok())
                    .is_some_and(|ip| ip == wanted)
        }
    }
}

impl<R: ContainerRuntime> DockerProxy<R> {
    /// Captures the address; no container lookup happens until an operation runs.
    pub fn new(address: DeviceAddress, runtime: R) -> Self {
        Self { address, runtime }
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Maps the device address to a running container.
    ///
    /// # Errors
    ///
    /// * `ProxyError::ContainerNotFound` - nothing matches the address.
    /// * `ProxyError::ContainerNotRunning` - a named container exists but is stopped.
    /// * `ProxyError::RuntimeUnavailable` - the runtime could not be reached.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn resolve(&self) -> ProxyResult<ContainerInfo> {
        let not_found = || ProxyError::ContainerNotFound {
            address: self.address.to_string(),
        };

        let container = match &self.address {
            DeviceAddress::Container(name) => {
                let info = self.runtime.inspect(name).await?.ok_or_else(not_found)?;
                if !info.running {
                    return Err(ProxyError::ContainerNotRunning {
                        address: self.address.to_string(),
                        container: info.name,
                    });
                }
                info
            }
            DeviceAddress::Published { port, .. } => {
                let host_ip = self.address.host_ip();
                self.runtime
                    .list_running()
                    .await?
                    .into_iter()
                    .find(|c| c.ports.iter().any(|p| binding_matches(p, *port, host_ip)))
                    .ok_or_else(not_found)?
            }
        };

        debug!(
            "Device '{}' resolved to container '{}' ({})",
            self.address, container.name, container.id
        );
        Ok(container)
    }

    /// Retrieves the device's logs.
    ///
    /// Without `attach` the buffered output is collected into a single
    /// `ContainerLogs::Snapshot`. With `attach` a `ContainerLogs::Stream` is
    /// returned that yields chunks as the container produces them.
    #[instrument(skip(self, options), fields(address = %self.address, attach = options.attach))]
    pub async fn get_container_logs(&self, options: &LogOptions) -> ProxyResult<ContainerLogs> {
        let container = self.resolve().await?;
        let request = LogRequest {
            follow: options.attach,
            tail: options.tail.clone(),
            timestamps: options.timestamps,
        };
        let mut stream = self.runtime.logs(&container.id, &request).await?;

        if options.attach {
            info!("Attached to log stream of '{}'", container.name);
            return Ok(ContainerLogs::Stream(stream));
        }

        let mut buffered = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffered.extend_from_slice(&chunk?);
        }
        debug!("Collected {} bytes of logs from '{}'", buffered.len(), container.name);
        Ok(ContainerLogs::Snapshot(buffered))
    }

    /// Runs `command` through `sh -c` on the device and waits for it to finish.
    ///
    /// Reserved for the `run` verb, which still prints a diagnostic instead.
    #[allow(dead_code)]
    #[instrument(skip(self), fields(address = %self.address))]
    pub(crate) async fn run_command(&self, command: &str) -> ProxyResult<CommandOutput> {
        let container = self.resolve().await?;
        let cmd = vec!["sh".to_string(), "-c".to_string(), command.to_string()];
        let result = self.runtime.exec(&container.id, &cmd).await?;
        info!(
            "Command {:?} on '{}' exited with code {}",
            command, container.name, result.exit_code
        );
        Ok(result)
    }

    /// Starts an interactive login shell on the device.
    ///
    /// `tty` should be set when the local stdin is a terminal.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn open_shell(&self, tty: bool) -> ProxyResult<ShellSession> {
        let container = self.resolve().await?;
        let cmd = vec!["/bin/sh".to_string(), "-l".to_string()];
        let session = self.runtime.exec_interactive(&container.id, &cmd, tty).await?;
        info!("Shell session {} opened on '{}'", session.exec_id, container.name);
        Ok(session)
    }

    /// Exit code of a shell session that has ended.
    pub async fn shell_exit_code(&self, session_id: &str) -> ProxyResult<Option<i64>> {
        self.runtime.exec_exit_code(session_id).await
    }

    /// Copies a local file or directory into directory `dst` on the device.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn put(&self, src: &Path, dst: &str) -> ProxyResult<()> {
        let container = self.resolve().await?;
        let archive = pack_path(src).map_err(|e| ProxyError::Transfer(format!("{:#}", e)))?;
        debug!("Uploading {} byte archive to '{}:{}'", archive.len(), container.name, dst);
        self.runtime.upload(&container.id, dst, archive).await
    }

    /// Copies `src` from the device into the local directory `dst`.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn get(&self, src: &str, dst: &Path) -> ProxyResult<()> {
        let container = self.resolve().await?;
        let archive = self.runtime.download(&container.id, src).await?;
        debug!("Downloaded {} byte archive from '{}:{}'", archive.len(), container.name, src);
        unpack_archive(&archive, dst).map_err(|e| ProxyError::Transfer(format!("{:#}", e)))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::{running_container, FakeRuntime};
    use std::fs;
    use tempfile::tempdir;

    fn proxy(address: &str, runtime: FakeRuntime) -> DockerProxy<FakeRuntime> {
        DockerProxy::new(DeviceAddress::parse(address).unwrap(), runtime)
    }

    #[tokio::test]
    async fn test_construct_performs_no_io() {
        let runtime = FakeRuntime::default();
        let calls = runtime.calls();
        let p = proxy("board", runtime);
        assert_eq!(p.address().to_string(), "board");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_by_name() {
        let runtime = FakeRuntime::default().with_container(running_container("abc123", "board", &[]));
        let info = proxy("board", runtime).resolve().await.unwrap();
        assert_eq!(info.id, "abc123");
    }

    #[tokio::test]
    async fn test_resolve_missing_container() {
        let err = proxy("ghost", FakeRuntime::default()).resolve().await.unwrap_err();
        assert!(matches!(err, ProxyError::ContainerNotFound { ref address } if address == "ghost"));
    }

    #[tokio::test]
    async fn test_resolve_stopped_container() {
        let mut stopped = running_container("abc123", "board", &[]);
        stopped.running = false;
        let err = proxy("board", FakeRuntime::default().with_container(stopped))
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ContainerNotRunning { .. }));
    }

    #[tokio::test]
    async fn test_resolve_by_published_port() {
        let runtime = FakeRuntime::default()
            .with_container(running_container("web", "web", &[8080]))
            .with_container(running_container("dev", "device", &[2222]));
        let info = proxy("myhost:2222", runtime).resolve().await.unwrap();
        assert_eq!(info.name, "device");
    }

    #[tokio::test]
    async fn test_resolve_port_skips_other_host_ip() {
        let mut device = running_container("dev", "device", &[]);
        device.ports.push(PublishedPort {
            host_ip: Some("10.0.0.7".into()),
            host_port: 2222,
            container_port: 22,
        });
        let runtime = FakeRuntime::default().with_container(device);
        let err = proxy("127.0.0.1:2222", runtime).resolve().await.unwrap_err();
        assert!(matches!(err, ProxyError::ContainerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_port_without_match() {
        let runtime = FakeRuntime::default().with_container(running_container("web", "web", &[8080]));
        let err = proxy("localhost:9999", runtime).resolve().await.unwrap_err();
        assert!(matches!(err, ProxyError::ContainerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_runtime_unavailable_propagates() {
        let err = proxy("board", FakeRuntime::unreachable())
            .get_container_logs(&LogOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_runtime_unavailable());
    }

    #[tokio::test]
    async fn test_snapshot_logs_are_buffered_and_repeatable() {
        let runtime = FakeRuntime::default()
            .with_container(running_container("abc123", "board", &[]))
            .with_logs(&["boot ok\n", "ready\n"]);
        let p = proxy("board", runtime);

        for _ in 0..2 {
            match p.get_container_logs(&LogOptions::default()).await.unwrap() {
                ContainerLogs::Snapshot(bytes) => assert_eq!(bytes, b"boot ok\nready\n"),
                other => panic!("expected snapshot, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_attach_returns_live_stream() {
        let runtime = FakeRuntime::default()
            .with_container(running_container("abc123", "board", &[]))
            .with_logs(&["one\n", "two\n"])
            .following();
        let requests = runtime.log_requests();
        let logs = proxy("board", runtime)
            .get_container_logs(&LogOptions {
                attach: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let ContainerLogs::Stream(stream) = logs else {
            panic!("expected a stream");
        };
        let first: Vec<_> = stream.take(2).map(|c| c.unwrap()).collect().await;
        assert_eq!(first, vec![b"one\n".to_vec(), b"two\n".to_vec()]);
        assert!(requests.lock().unwrap()[0].follow);
    }

    #[tokio::test]
    async fn test_run_command_uses_shell() {
        let runtime = FakeRuntime::default()
            .with_container(running_container("abc123", "board", &[]))
            .with_exec_result(b"Linux\n", 0);
        let calls = runtime.calls();
        let result = proxy("board", runtime).run_command("uname -s").await.unwrap();
        assert_eq!(result.output, b"Linux\n");
        assert_eq!(result.exit_code, 0);
        assert!(calls
            .lock()
            .unwrap()
            .contains(&"exec abc123 sh -c uname -s".to_string()));
    }

    #[tokio::test]
    async fn test_open_shell_starts_login_shell() {
        let runtime = FakeRuntime::default()
            .with_container(running_container("abc123", "board", &[]))
            .with_shell_output(&["# "]);
        let calls = runtime.calls();
        let session = proxy("board", runtime).open_shell(true).await.unwrap();
        assert_eq!(session.exec_id, "exec-abc123");
        assert!(calls
            .lock()
            .unwrap()
            .contains(&"exec_interactive abc123 /bin/sh -l tty=true".to_string()));
    }

    #[tokio::test]
    async fn test_open_shell_on_missing_device() {
        let err = proxy("ghost", FakeRuntime::default())
            .open_shell(false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ContainerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("app.conf");
        fs::write(&src, "mode=debug").unwrap();

        let runtime = FakeRuntime::default().with_container(running_container("abc123", "board", &[]));
        let p = proxy("board", runtime);
        p.put(&src, "/etc").await.unwrap();

        let out = temp_dir.path().join("out");
        p.get("/etc/app.conf", &out).await.unwrap();
        assert_eq!(fs::read_to_string(out.join("app.conf")).unwrap(), "mode=debug");
    }

    #[tokio::test]
    async fn test_put_missing_source_is_transfer_error() {
        let temp_dir = tempdir().unwrap();
        let runtime = FakeRuntime::default().with_container(running_container("abc123", "board", &[]));
        let err = proxy("board", runtime)
            .put(&temp_dir.path().join("nope"), "/tmp")
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Transfer(_)));
    }

    #[test]
    fn test_unspecified_binding_ips() {
        assert!(is_unspecified(None));
        assert!(is_unspecified(Some("")));
        assert!(is_unspecified(Some("0.0.0.0")));
        assert!(is_unspecified(Some("::")));
        assert!(!is_unspecified(Some("127.0.0.1")));
    }
}
