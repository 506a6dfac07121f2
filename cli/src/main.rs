//! # devctl Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the devctl CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading configuration and resolving the target device address
//! - Routing execution to the matching device command handler
//!
//! ## Architecture
//!
//! Each device verb (`logs`, `run`, `put`, `get`, `shell`) is a variant of
//! the `Commands` enum and maps to a handler in `commands/`. Handlers report
//! device failures themselves; only local failures (bad configuration,
//! broken stdout) reach this level, where they are printed and the process
//! exits with status 1. `run` never touches the runtime, so it is dispatched
//! before configuration is required.
//!
//! ## Examples
//!
//! ```bash
//! # Print the buffered logs of the default device
//! devctl logs
//!
//! # Follow the device that publishes port 2222, with debug logging
//! devctl -vv logs localhost:2222 --attach
//! ```
//!
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // One module per device verb
mod common; // Shared utilities (docker runtime, archives)
mod core; // Core infrastructure (errors, config)
mod device; // Device addressing and the Docker-backed proxy

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "devctl",
    about = "Device command dispatcher for Docker-emulated embedded devices",
    long_about = "Send commands to an embedded Linux device that is emulated by a Docker container.\n\
                  The device is addressed by container name or by HOST:PORT of a published port.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Container runtime endpoint (unix:// socket path, tcp:// or http:// URL).
    #[arg(long, env = "DEVCTL_RUNTIME_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Address used when a command is given no ADDRESS argument.
    #[arg(long, env = "DEVCTL_DEVICE_ADDRESS", global = true)]
    default_address: Option<String>,
}

/// Enum defining all available device commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the device's log output.
    #[command(alias = "l")]
    Logs(commands::logs::LogsArgs),
    /// Run a command on the device (not implemented yet).
    #[command(alias = "r")]
    Run(commands::run::RunArgs),
    /// Copy a local file or directory onto the device.
    Put(commands::put::PutArgs),
    /// Copy a file or directory from the device.
    Get(commands::get::GetArgs),
    /// Open an interactive shell on the device.
    #[command(alias = "sh")]
    Shell(commands::shell::ShellArgs),
}

impl Commands {
    fn device(&self) -> &commands::DeviceArgs {
        match self {
            Commands::Logs(args) => &args.device,
            Commands::Run(args) => &args.device,
            Commands::Put(args) => &args.device,
            Commands::Get(args) => &args.device,
            Commands::Shell(args) => &args.device,
        }
    }
}

/// Address echoed by `run`. Configuration is only consulted when no address
/// was given, and a broken configuration leaves the address unresolved.
fn run_address(
    device: &commands::DeviceArgs,
    overrides: &crate::core::config::Overrides,
) -> Option<crate::device::DeviceAddress> {
    if let Some(address) = &device.address {
        return Some(address.clone());
    }
    match crate::core::config::load_config(overrides)
        .and_then(|cfg| device.address_or_default(&cfg))
    {
        Ok(address) => Some(address),
        Err(e) => {
            tracing::warn!("Default device address unavailable: {:#}", e);
            None
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let overrides = crate::core::config::Overrides {
        default_address: cli.default_address,
        endpoint: cli.endpoint,
    };

    match cli.command {
        Commands::Run(args) => {
            let address = run_address(&args.device, &overrides);
            commands::run::handle_run(args, address).await
        }
        command => {
            let cfg = crate::core::config::load_config(&overrides)?;
            let address = command.device().address_or_default(&cfg)?;
            tracing::debug!("Target device: {}", address);

            match command {
                Commands::Logs(args) => commands::logs::handle_logs(args, address, &cfg).await,
                Commands::Put(args) => commands::put::handle_put(args, address, &cfg).await,
                Commands::Get(args) => commands::get::handle_get(args, address, &cfg).await,
                Commands::Shell(args) => {
                    commands::shell::handle_shell(args, address, &cfg).await
                }
                Commands::Run(args) => commands::run::handle_run(args, Some(address)).await,
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = dispatch(cli).await {
        tracing::debug!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
