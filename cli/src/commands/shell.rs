//! # devctl Shell Handler
//!
//! File: cli/src/commands/shell.rs
//!
//! ## Overview
//!
//! Implements `devctl shell [ADDRESS]`, an interactive login shell on the
//! device. The shell runs as a Docker exec instance inside the device
//! container; local keystrokes are forwarded to it and its terminal output is
//! written to stdout until the shell exits.
//!
//! When stdin is a terminal it is switched to raw mode for the session, so
//! Ctrl-C and line editing reach the device shell instead of devctl. The
//! terminal is restored when the session ends.
//!
//! ## Usage
//!
//! ```bash
//! devctl shell                 # default device
//! devctl shell localhost:2222  # device publishing port 2222
//! ```
//!
use crate::{
    common::docker::ShellSession,
    core::{
        config::Config,
        error::{ProxyResult, Result},
    },
    device::{DeviceAddress, DockerProxy},
};
use clap::Args;
use futures_util::StreamExt;
use std::io::{IsTerminal, Read};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{report_failure, write_chunk, DeviceArgs};

/// Arguments for `devctl shell`.
#[derive(Args, Debug)]
pub struct ShellArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Holds the local terminal in raw mode until dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Option<Self> {
        match crossterm::terminal::enable_raw_mode() {
            Ok(()) => Some(Self),
            Err(e) => {
                warn!("Could not switch the terminal to raw mode: {}", e);
                None
            }
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            warn!("Could not restore the terminal mode: {}", e);
        }
    }
}

/// Reads local stdin on a plain thread so a pending read never holds up exit.
fn spawn_stdin_reader() -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel(32);
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!("Stopped reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Handles `devctl shell`.
pub async fn handle_shell(args: ShellArgs, address: DeviceAddress, cfg: &Config) -> Result<()> {
    info!("Handling shell for device '{}'", address);
    debug!("Shell args: {:?}", args);
    let tty = std::io::stdin().is_terminal();

    let proxy = match DockerProxy::connect(address, &cfg.runtime) {
        Ok(proxy) => proxy,
        Err(e) => {
            report_failure("shell", &e);
            return Ok(());
        }
    };
    let session = match proxy.open_shell(tty).await {
        Ok(session) => session,
        Err(e) => {
            report_failure("shell", &e);
            return Ok(());
        }
    };
    let exec_id = session.exec_id.clone();

    let outcome = {
        let _raw = if tty { RawModeGuard::enable() } else { None };
        relay_session(session, spawn_stdin_reader(), &mut tokio::io::stdout()).await?
    };

    match outcome {
        Ok(()) => {
            match proxy.shell_exit_code(&exec_id).await {
                Ok(Some(code)) => info!("Shell exited with code {}", code),
                Ok(None) => debug!("Runtime reported no exit code for '{}'", exec_id),
                Err(e) => debug!("Could not read the shell exit code: {}", e),
            }
            println!("\nShell terminated.");
        }
        Err(e) => report_failure("shell", &e),
    }
    Ok(())
}

/// Shuttles keystrokes into the session and its output into `out` until the
/// shell exits.
///
/// The outer `Result` carries local output failures; the inner one carries
/// device failures for the caller to report.
pub(crate) async fn relay_session<W>(
    mut session: ShellSession,
    mut keys: mpsc::Receiver<Vec<u8>>,
    out: &mut W,
) -> Result<ProxyResult<()>>
where
    W: AsyncWrite + Unpin,
{
    let mut stdin_open = true;
    loop {
        tokio::select! {
            next = session.output.next() => match next {
                Some(Ok(chunk)) => write_chunk(out, &chunk).await?,
                Some(Err(e)) => return Ok(Err(e)),
                None => {
                    debug!("Shell output ended.");
                    return Ok(Ok(()));
                }
            },
            key = keys.recv(), if stdin_open => match key {
                Some(bytes) => {
                    let sent = match session.input.write_all(&bytes).await {
                        Ok(()) => session.input.flush().await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = sent {
                        debug!("Shell stopped accepting input: {}", e);
                        stdin_open = false;
                    }
                }
                None => {
                    debug!("Local stdin closed, closing shell input.");
                    stdin_open = false;
                    if let Err(e) = session.input.shutdown().await {
                        debug!("Error closing shell input: {}", e);
                    }
                }
            },
        }
    }
}
