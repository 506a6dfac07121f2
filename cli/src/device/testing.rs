//! In-memory `ContainerRuntime` used by the proxy and command tests.

use crate::common::docker::{
    ChunkStream, CommandOutput, ContainerInfo, ContainerRuntime, LogRequest, PublishedPort,
    ShellSession,
};
use crate::core::error::{ProxyError, ProxyResult};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use futures_util::{future, stream, StreamExt};
use std::collections::HashMap;
use std::io::Read;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio::sync::oneshot;

/// Shell input sink that records keystrokes and signals when it is shut down.
struct RecordingInput {
    received: Arc<Mutex<Vec<u8>>>,
    closed: Option<oneshot::Sender<()>>,
}

impl AsyncWrite for RecordingInput {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.received.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        if let Some(closed) = self.closed.take() {
            let _ = closed.send(());
        }
        Poll::Ready(Ok(()))
    }
}

pub fn running_container(id: &str, name: &str, host_ports: &[u16]) -> ContainerInfo {
    ContainerInfo {
        id: id.to_string(),
        name: name.to_string(),
        running: true,
        ports: host_ports
            .iter()
            .map(|&host_port| PublishedPort {
                host_ip: None,
                host_port,
                container_port: 22,
            })
            .collect(),
    }
}

#[derive(Default, Clone)]
pub struct FakeRuntime {
    containers: Vec<ContainerInfo>,
    logs: Vec<Vec<u8>>,
    following: bool,
    unreachable: bool,
    exec_result: Option<CommandOutput>,
    shell_output: Vec<Vec<u8>>,
    shell_input: Arc<Mutex<Vec<u8>>>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    log_requests: Arc<Mutex<Vec<LogRequest>>>,
}

impl FakeRuntime {
    /// A runtime whose every call fails as if the endpoint refused connections.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn with_container(mut self, info: ContainerInfo) -> Self {
        self.containers.push(info);
        self
    }

    pub fn with_logs(mut self, chunks: &[&str]) -> Self {
        self.logs = chunks.iter().map(|c| c.as_bytes().to_vec()).collect();
        self
    }

    /// Follow-mode log streams never end on their own.
    pub fn following(mut self) -> Self {
        self.following = true;
        self
    }

    pub fn with_exec_result(mut self, output: &[u8], exit_code: i64) -> Self {
        self.exec_result = Some(CommandOutput {
            output: output.to_vec(),
            exit_code,
        });
        self
    }

    /// Output the shell prints before waiting for its stdin to close.
    pub fn with_shell_output(mut self, chunks: &[&str]) -> Self {
        self.shell_output = chunks.iter().map(|c| c.as_bytes().to_vec()).collect();
        self
    }

    pub fn shell_input(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.shell_input)
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    pub fn log_requests(&self) -> Arc<Mutex<Vec<LogRequest>>> {
        Arc::clone(&self.log_requests)
    }

    fn record(&self, call: String) -> ProxyResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.unreachable {
            return Err(ProxyError::RuntimeUnavailable {
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn inspect(&self, name_or_id: &str) -> ProxyResult<Option<ContainerInfo>> {
        self.record(format!("inspect {}", name_or_id))?;
        Ok(self
            .containers
            .iter()
            .find(|c| c.name == name_or_id || c.id == name_or_id)
            .cloned())
    }

    async fn list_running(&self) -> ProxyResult<Vec<ContainerInfo>> {
        self.record("list_running".into())?;
        Ok(self.containers.iter().filter(|c| c.running).cloned().collect())
    }

    async fn logs(&self, container_id: &str, request: &LogRequest) -> ProxyResult<ChunkStream> {
        self.record(format!("logs {}", container_id))?;
        self.log_requests.lock().unwrap().push(request.clone());
        let chunks = stream::iter(self.logs.clone().into_iter().map(Ok));
        if request.follow && self.following {
            Ok(chunks.chain(stream::pending()).boxed())
        } else {
            Ok(chunks.boxed())
        }
    }

    async fn exec(&self, container_id: &str, cmd: &[String]) -> ProxyResult<CommandOutput> {
        self.record(format!("exec {} {}", container_id, cmd.join(" ")))?;
        Ok(self.exec_result.clone().unwrap_or(CommandOutput {
            output: Vec::new(),
            exit_code: 0,
        }))
    }

    async fn exec_interactive(
        &self,
        container_id: &str,
        cmd: &[String],
        tty: bool,
    ) -> ProxyResult<ShellSession> {
        self.record(format!(
            "exec_interactive {} {} tty={}",
            container_id,
            cmd.join(" "),
            tty
        ))?;
        // The shell exits once its stdin is closed, like `sh` reading EOF.
        let (closed_tx, closed_rx) = oneshot::channel();
        let exit = stream::once(closed_rx)
            .filter_map(|_| future::ready(None::<ProxyResult<Vec<u8>>>));
        let output = stream::iter(self.shell_output.clone().into_iter().map(Ok)).chain(exit);
        Ok(ShellSession {
            exec_id: format!("exec-{}", container_id),
            output: output.boxed(),
            input: Box::pin(RecordingInput {
                received: Arc::clone(&self.shell_input),
                closed: Some(closed_tx),
            }),
        })
    }

    async fn exec_exit_code(&self, exec_id: &str) -> ProxyResult<Option<i64>> {
        self.record(format!("exec_exit_code {}", exec_id))?;
        Ok(Some(0))
    }

    async fn upload(&self, container_id: &str, dest_dir: &str, archive: Vec<u8>) -> ProxyResult<()> {
        self.record(format!("upload {} {}", container_id, dest_dir))?;
        let mut tar_archive = tar::Archive::new(GzDecoder::new(archive.as_slice()));
        let mut files = self.files.lock().unwrap();
        for entry in tar_archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = format!(
                "{}/{}",
                dest_dir.trim_end_matches('/'),
                entry.path().unwrap().display()
            );
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            files.insert(path, content);
        }
        Ok(())
    }

    async fn download(&self, container_id: &str, path: &str) -> ProxyResult<Vec<u8>> {
        self.record(format!("download {} {}", container_id, path))?;
        let files = self.files.lock().unwrap();
        let content = files
            .get(path)
            .ok_or_else(|| ProxyError::Transfer(format!("path '{}' not found on device", path)))?;
        let name = path.rsplit('/').next().unwrap_or(path);

        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        let mut builder = tar::Builder::new(Vec::new());
        builder
            .append_data(&mut header, name, content.as_slice())
            .unwrap();
        Ok(builder.into_inner().unwrap())
    }
}
