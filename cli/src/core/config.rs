//! # devctl Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the devctl configuration. The
//! configuration is read once at process start and handed to every command by
//! reference; nothing reads it as ambient global state.
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line / environment overrides (`--endpoint`, `DEVCTL_RUNTIME_ENDPOINT`,
//!    `DEVCTL_DEVICE_ADDRESS`), applied by `main.rs` through `Overrides`.
//! 2. Project-specific `.devctl.toml` in the current directory or ancestors.
//! 3. User-specific `config.toml` in the platform config directory.
//! 4. Default values defined in the code.
//!
//! ## Examples
//!
//! ```toml
//! [device]
//! default_address = "localhost:2222"
//!
//! [runtime]
//! endpoint = "unix:///var/run/docker.sock"
//! timeout_secs = 60
//! ```
//!
use crate::core::error::{DevctlError, Result};
use crate::device::DeviceAddress;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// The effective configuration handed to every command.
#[derive(Debug, Default, Clone)]
pub struct Config {
    pub device: DeviceConfig,
    pub runtime: RuntimeConfig,
}

/// Settings describing the target device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Address used when a command is invoked without one.
    pub default_address: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            default_address: default_device_address(),
        }
    }
}

/// Settings for reaching the container runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Runtime endpoint (`unix://...`, `tcp://...`, `http://...` or a socket path).
    /// When unset, the local defaults (including `DOCKER_HOST`) are used.
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One configuration file as written on disk. Keys the file leaves out stay
/// `None` so they never mask a lower-precedence file.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    device: DeviceSection,
    #[serde(default)]
    runtime: RuntimeSection,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct DeviceSection {
    default_address: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct RuntimeSection {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub default_address: Option<String>,
    pub endpoint: Option<String>,
}

fn default_device_address() -> String {
    "devctl-device".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

const PROJECT_CONFIG_FILENAME: &str = ".devctl.toml";
const ENDPOINT_SCHEMES: [&str; 3] = ["unix://", "tcp://", "http://"];

/// Loads the merged configuration and applies command-line overrides.
pub fn load_config(overrides: &Overrides) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config, project_config);
    apply_overrides(&mut merged_config, overrides);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<ConfigFile>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "devctl", "devctl") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<ConfigFile>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.devctl.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Layers the user file, then the project file, over the built-in defaults.
/// A key set in a file wins over every lower layer, whatever its value.
fn merge_configs(user: Option<ConfigFile>, project: Option<ConfigFile>) -> Config {
    let mut merged = Config::default();
    for layer in [user, project].into_iter().flatten() {
        if let Some(address) = layer.device.default_address {
            merged.device.default_address = address;
        }
        if let Some(endpoint) = layer.runtime.endpoint {
            merged.runtime.endpoint = Some(endpoint);
        }
        if let Some(timeout) = layer.runtime.timeout_secs {
            merged.runtime.timeout_secs = timeout;
        }
    }
    merged
}

fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(address) = &overrides.default_address {
        debug!("Default device address overridden to '{}'", address);
        config.device.default_address = address.clone();
    }
    if let Some(endpoint) = &overrides.endpoint {
        debug!("Runtime endpoint overridden to '{}'", endpoint);
        config.runtime.endpoint = Some(endpoint.clone());
    }
}

fn expand_config_paths(config: &mut Config) {
    if let Some(endpoint) = &config.runtime.endpoint {
        let expanded = match endpoint.strip_prefix("unix://") {
            Some(path) => format!("unix://{}", shellexpand::tilde(path)),
            None => shellexpand::tilde(endpoint).into_owned(),
        };
        debug!("Expanded runtime endpoint: {}", expanded);
        config.runtime.endpoint = Some(expanded);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    DeviceAddress::parse(&config.device.default_address).map_err(|e| {
        anyhow!(DevctlError::Config(format!(
            "Invalid default device address: {}",
            e
        )))
    })?;

    if let Some(endpoint) = &config.runtime.endpoint {
        let known_scheme = ENDPOINT_SCHEMES.iter().any(|s| endpoint.starts_with(s));
        if !known_scheme && !endpoint.starts_with('/') {
            return Err(anyhow!(DevctlError::Config(format!(
                "Unsupported runtime endpoint '{}'. Expected unix://, tcp://, http:// or an absolute socket path.",
                endpoint
            ))));
        }
    }

    if config.runtime.timeout_secs == 0 {
        return Err(anyhow!(DevctlError::Config(
            "runtime.timeout_secs must be greater than zero.".to_string()
        )));
    }
    Ok(())
}
