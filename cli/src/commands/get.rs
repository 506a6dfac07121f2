//! # devctl Get Handler
//!
//! File: cli/src/commands/get.rs
//!
//! ## Overview
//!
//! Implements `devctl get <SRC> <DST> [ADDRESS]`: copies a file or directory
//! from the device into the local directory `DST` (created if missing).
//!
use crate::{
    core::{config::Config, error::Result},
    device::{DeviceAddress, DockerProxy},
};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::{report_failure, DeviceArgs};

/// Arguments for `devctl get`.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// File or directory on the device.
    pub src: String,

    /// Local directory to copy into.
    pub dst: PathBuf,

    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Handles `devctl get`.
pub async fn handle_get(args: GetArgs, address: DeviceAddress, cfg: &Config) -> Result<()> {
    info!("Handling get of '{}' into '{}'", args.src, args.dst.display());
    println!(
        "Copying '{}' from device '{}' to '{}'...",
        args.src,
        address,
        args.dst.display()
    );

    let outcome = match DockerProxy::connect(address, &cfg.runtime) {
        Ok(proxy) => proxy.get(&args.src, &args.dst).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(()) => println!("Completed without error."),
        Err(e) => report_failure("get", &e),
    }
    Ok(())
}
