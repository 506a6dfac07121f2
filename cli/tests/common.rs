//! # devctl CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test runs
//! the compiled `devctl` binary inside a scratch directory with its own
//! `HOME`, so no user or project configuration leaks into the run.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use tempfile::TempDir;

/// An endpoint nothing listens on; connecting to it fails immediately.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:1";

/// Returns a `Command` for the compiled `devctl` binary.
pub fn devctl_cmd() -> Command {
    Command::cargo_bin("devctl").expect("Failed to find devctl binary for testing")
}

/// Returns a `devctl` command isolated in `sandbox`, with runtime and
/// address environment variables cleared.
pub fn isolated_cmd(sandbox: &TempDir) -> Command {
    let mut cmd = devctl_cmd();
    cmd.current_dir(sandbox.path())
        .env("HOME", sandbox.path())
        .env("XDG_CONFIG_HOME", sandbox.path().join(".config"))
        .env_remove("DEVCTL_RUNTIME_ENDPOINT")
        .env_remove("DEVCTL_DEVICE_ADDRESS")
        .env_remove("RUST_LOG");
    cmd
}
