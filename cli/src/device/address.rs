//! # devctl Device Addresses
//!
//! File: cli/src/device/address.rs
//!
//! ## Overview
//!
//! A device address is the string an operator types to pick the container that
//! stands in for a device. Two forms are accepted:
//!
//! - `name`: a container name or id, e.g. `devctl-device` or `3f2a9c`.
//! - `host:port`: the connection locator of the emulated device, e.g.
//!   `localhost:2222`. It resolves to the running container publishing host
//!   port `port`. IPv6 hosts are bracketed: `[::1]:2222`.
//!
//! Parsing happens once, before any proxy is built, so a malformed address is
//! reported as a usage problem rather than a device failure.
//!
use crate::core::error::DevctlError;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

/// A parsed, immutable device address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAddress {
    /// Container name or id.
    Container(String),
    /// Host and published port of the emulated device.
    Published { host: String, port: u16 },
}

impl DeviceAddress {
    /// Parses an address string.
    ///
    /// # Errors
    ///
    /// Returns `DevctlError::InvalidAddress` if the string is empty, contains
    /// whitespace, has an empty host, carries a port that is not a number in
    /// `1..=65535`, or holds an IPv6 host without brackets.
    pub fn parse(raw: &str) -> Result<Self, DevctlError> {
        let invalid = |reason: &str| DevctlError::InvalidAddress {
            address: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("address is empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("address must not contain whitespace"));
        }

        let parse_port = |port: &str| match port.parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(invalid("port must be a number between 1 and 65535")),
        };

        if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, port) = rest
                .split_once("]:")
                .ok_or_else(|| invalid("bracketed host must be followed by ':PORT'"))?;
            if host.parse::<Ipv6Addr>().is_err() {
                return Err(invalid("bracketed host is not an IPv6 address"));
            }
            return Ok(DeviceAddress::Published {
                host: host.to_string(),
                port: parse_port(port)?,
            });
        }
        if trimmed.matches(':').count() > 1 {
            return Err(invalid("IPv6 hosts must be bracketed, e.g. [::1]:2222"));
        }

        match trimmed.split_once(':') {
            None => Ok(DeviceAddress::Container(trimmed.to_string())),
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(invalid("host is empty"));
                }
                Ok(DeviceAddress::Published {
                    host: host.to_string(),
                    port: parse_port(port)?,
                })
            }
        }
    }

    /// The host IP when the address is `host:port` and `host` is an IP literal.
    pub fn host_ip(&self) -> Option<IpAddr> {
        match self {
            DeviceAddress::Published { host, .. } => host.parse().ok(),
            DeviceAddress::Container(_) => None,
        }
    }
}

impl FromStr for DeviceAddress {
    type Err = DevctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceAddress::parse(s)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceAddress::Container(name) => write!(f, "{}", name),
            DeviceAddress::Published { host, port } if host.contains(':') => {
                write!(f, "[{}]:{}", host, port)
            }
            DeviceAddress::Published { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}
