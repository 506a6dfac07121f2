//! # devctl Run Handler
//!
//! File: cli/src/commands/run.rs
//!
//! ## Overview
//!
//! `devctl run <COMMAND> [ADDRESS]` is reserved for running a command on the
//! device. The verb is parsed and documented, but the handler only prints a
//! "not implemented" diagnostic echoing the arguments it received. It never
//! contacts the container runtime.
//!
use crate::{core::error::Result, device::DeviceAddress};
use clap::Args;
use serde_json::json;
use tracing::debug;

use super::DeviceArgs;

/// Arguments for `devctl run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Shell command to run on the device.
    pub command: String,

    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Builds the diagnostic printed by the stub handler. An address that could
/// not be resolved is echoed as `null`.
fn not_implemented_message(args: &RunArgs, address: Option<&DeviceAddress>) -> Result<String> {
    let received = json!({
        "command": args.command,
        "address": address.map(|a| a.to_string()),
    });
    Ok(format!(
        "The 'run' command is not implemented yet. Received arguments: {}",
        serde_json::to_string(&received)?
    ))
}

/// Handles `devctl run`.
pub async fn handle_run(args: RunArgs, address: Option<DeviceAddress>) -> Result<()> {
    debug!("Run args: {:?}", args);
    eprintln!("{}", not_implemented_message(&args, address.as_ref())?);
    Ok(())
}
