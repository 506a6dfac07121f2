//! # devctl Logs Handler
//!
//! File: cli/src/commands/logs.rs
//!
//! ## Overview
//!
//! Implements `devctl logs [ADDRESS]`, which prints the log output of the
//! device container.
//!
//! - Without `--attach` the currently buffered output is printed once and the
//!   command exits.
//! - With `--attach` new output is forwarded as it arrives until the container
//!   stops or the user presses Ctrl-C.
//!
//! A device that cannot be found, or a runtime that cannot be reached, is
//! reported as `Error: <message>` and the command still exits successfully.
//!
//! ## Usage
//!
//! ```bash
//! devctl logs                   # default device, buffered output
//! devctl logs localhost:2222 -a # follow the device publishing port 2222
//! devctl logs board -n 50 -t    # last 50 lines with timestamps
//! ```
//!
use crate::{
    common::docker::{ChunkStream, ContainerRuntime},
    core::{
        config::Config,
        error::{ProxyResult, Result},
    },
    device::{ContainerLogs, DeviceAddress, DockerProxy, LogOptions},
};
use clap::Args;
use futures_util::StreamExt;
use std::future::Future;
use tokio::io::AsyncWrite;
use tracing::{debug, info, warn};

use super::{report_failure, write_chunk, DeviceArgs};

/// Arguments for `devctl logs`.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Keep streaming new output until the container stops or Ctrl-C is pressed.
    #[arg(short, long)]
    pub attach: bool,

    /// Number of lines to show from the end of the logs, or "all".
    #[arg(long, short = 'n', default_value = "all")]
    pub tail: String,

    /// Prefix every line with its timestamp.
    #[arg(long, short = 't')]
    pub timestamps: bool,

    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Validates `--tail`, falling back to "all" for anything that is not a number.
fn normalize_tail(tail: &str) -> String {
    let trimmed = tail.trim();
    if trimmed.eq_ignore_ascii_case("all") || trimmed.parse::<u32>().is_ok() {
        trimmed.to_ascii_lowercase()
    } else {
        warn!("Invalid value for --tail: '{}'. Showing all lines.", tail);
        "all".to_string()
    }
}

/// Handles `devctl logs`.
pub async fn handle_logs(args: LogsArgs, address: DeviceAddress, cfg: &Config) -> Result<()> {
    info!(
        "Handling logs for device '{}' (Attach: {}, Tail: {})",
        address, args.attach, args.tail
    );
    let options = LogOptions {
        attach: args.attach,
        tail: normalize_tail(&args.tail),
        timestamps: args.timestamps,
    };

    let proxy = match DockerProxy::connect(address, &cfg.runtime) {
        Ok(proxy) => proxy,
        Err(e) => {
            report_failure("logs", &e);
            return Ok(());
        }
    };
    debug!("Proxy ready for device '{}'", proxy.address());

    let mut stdout = tokio::io::stdout();
    if let Err(e) = show_logs(&proxy, &options, &mut stdout, interrupted()).await? {
        report_failure("logs", &e);
    }
    Ok(())
}

/// Resolves once the user interrupts the process.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Fetches the device logs and writes them to `out`.
///
/// The outer `Result` carries local output failures; the inner one carries
/// device failures for the caller to report.
pub(crate) async fn show_logs<R, W, F>(
    proxy: &DockerProxy<R>,
    options: &LogOptions,
    out: &mut W,
    cancel: F,
) -> Result<ProxyResult<()>>
where
    R: ContainerRuntime,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    match proxy.get_container_logs(options).await {
        Ok(ContainerLogs::Snapshot(bytes)) => {
            write_chunk(out, &bytes).await?;
            Ok(Ok(()))
        }
        Ok(ContainerLogs::Stream(stream)) => forward_stream(stream, out, cancel).await,
        Err(e) => Ok(Err(e)),
    }
}

/// Forwards chunks to `out` until the stream ends or `cancel` resolves.
pub(crate) async fn forward_stream<W, F>(
    mut stream: ChunkStream,
    out: &mut W,
    cancel: F,
) -> Result<ProxyResult<()>>
where
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(cancel);
    loop {
        tokio::select! {
            _ = &mut cancel => {
                info!("Log stream interrupted, detaching.");
                return Ok(Ok(()));
            }
            next = stream.next() => match next {
                Some(Ok(chunk)) => write_chunk(out, &chunk).await?,
                Some(Err(e)) => return Ok(Err(e)),
                None => {
                    debug!("Log stream ended.");
                    return Ok(Ok(()));
                }
            },
        }
    }
}
