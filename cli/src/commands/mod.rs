//! # devctl Device Commands
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per device verb. Every verb shares the same contract:
//!
//! - its argument struct flattens `DeviceArgs`, so `[address]` is accepted
//!   the same way everywhere and defaults to the configured device;
//! - `main.rs` resolves that address before the handler runs, so handlers
//!   always receive a concrete `DeviceAddress`;
//! - proxy failures are matched inside the handler, reported once as
//!   `Error: <message>`, and do not fail the process.
//!
//! ## Commands
//!
//! - `logs`: print or attach to the device's log output
//! - `run`: run a command on the device (not implemented yet)
//! - `put`: copy a local file or directory onto the device
//! - `get`: copy a file or directory from the device
//! - `shell`: open an interactive shell on the device
//!
use crate::core::config::Config;
use crate::core::error::{DevctlError, ProxyError, Result};
use crate::device::DeviceAddress;
use clap::Args;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub mod get;
pub mod logs;
pub mod put;
pub mod run;
pub mod shell;

/// Arguments shared by every device command.
#[derive(Args, Debug, Clone, Default)]
pub struct DeviceArgs {
    /// Device address: a container name or id, or HOST:PORT of the emulated device.
    /// Defaults to `device.default_address` from the configuration.
    #[arg(value_name = "ADDRESS")]
    pub address: Option<DeviceAddress>,
}

impl DeviceArgs {
    /// Returns the given address, or the configured default when none was given.
    pub fn address_or_default(&self, cfg: &Config) -> Result<DeviceAddress> {
        match &self.address {
            Some(address) => Ok(address.clone()),
            None => DeviceAddress::parse(&cfg.device.default_address).map_err(|e| {
                anyhow::Error::from(DevctlError::Config(format!(
                    "Invalid default device address: {}",
                    e
                )))
            }),
        }
    }
}

/// The line shown to the user for a failed device operation.
pub(crate) fn failure_message(err: &ProxyError) -> String {
    format!("Error: {}", err)
}

/// Reports a failed device operation without failing the process.
pub(crate) fn report_failure(verb: &str, err: &ProxyError) {
    debug!("Device command '{}' failed: {:?}", verb, err);
    eprintln!("{}", failure_message(err));
}

/// Writes one chunk of device output and flushes it straight away.
pub(crate) async fn write_chunk<W: AsyncWrite + Unpin>(out: &mut W, chunk: &[u8]) -> Result<()> {
    out.write_all(chunk)
        .await
        .map_err(|source| DevctlError::Output { source })?;
    out.flush()
        .await
        .map_err(|source| DevctlError::Output { source })?;
    Ok(())
}
