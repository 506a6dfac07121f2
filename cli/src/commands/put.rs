//! # devctl Put Handler
//!
//! File: cli/src/commands/put.rs
//!
//! ## Overview
//!
//! Implements `devctl put <SRC> <DST> [ADDRESS]`: copies a local file or
//! directory into directory `DST` on the device. The source keeps its name,
//! so `devctl put ./app /opt` creates `/opt/app` on the device.
//!
use crate::{
    core::{config::Config, error::Result},
    device::{DeviceAddress, DockerProxy},
};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::{report_failure, DeviceArgs};

/// Arguments for `devctl put`.
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file or directory to copy.
    pub src: PathBuf,

    /// Existing directory on the device to copy into.
    pub dst: String,

    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Handles `devctl put`.
pub async fn handle_put(args: PutArgs, address: DeviceAddress, cfg: &Config) -> Result<()> {
    info!("Handling put of '{}' to '{}'", args.src.display(), args.dst);
    println!(
        "Copying '{}' to '{}' on device '{}'...",
        args.src.display(),
        args.dst,
        address
    );

    let outcome = match DockerProxy::connect(address, &cfg.runtime) {
        Ok(proxy) => proxy.put(&args.src, &args.dst).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(()) => println!("Completed without error."),
        Err(e) => report_failure("put", &e),
    }
    Ok(())
}
