//! Types for addresses and parsed Sentinel replies.
//!
//! These types represent operator-supplied `host:port` addresses and the
//! parsed output of `SENTINEL get-master-addr-by-name` and
//! `SENTINEL slaves`.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when parsing addresses or Sentinel replies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid address '{0}': expected host:port")]
    InvalidAddress(String),
    #[error("Invalid port in '{0}': expected 1-65535")]
    InvalidPort(String),
    #[error("Invalid master reply: {0}")]
    InvalidMasterReply(String),
    #[error("Invalid replica entry: {0}")]
    InvalidReplicaEntry(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// A `(host, port)` pair identifying a Redis instance.
///
/// Used for members of the primary pool (reported by Sentinel), for
/// operator-supplied candidates, and for the pod's master.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReplicaAddress {
    pub host: String,
    pub port: u16,
}

impl ReplicaAddress {
    /// Create a new address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Build an address from separately reported host and port strings.
    pub fn from_parts(host: &str, port: &str) -> Result<Self, ParseError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ParseError::InvalidAddress(format!("{}:{}", host, port)));
        }
        let port = parse_port(port)
            .ok_or_else(|| ParseError::InvalidPort(format!("{}:{}", host, port)))?;
        Ok(Self::new(host, port))
    }
}

fn parse_port(s: &str) -> Option<u16> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

impl FromStr for ReplicaAddress {
    type Err = ParseError;

    /// Parse `host:port`. IPv6 hosts must be bracketed: `[::1]:6379`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?;

        let host = match host.strip_prefix('[') {
            Some(inner) => inner
                .strip_suffix(']')
                .ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?,
            // An unbracketed host containing ':' is an IPv6 address without a port
            None if host.contains(':') => {
                return Err(ParseError::InvalidAddress(s.to_string()));
            }
            None => host,
        };

        if host.is_empty() {
            return Err(ParseError::InvalidAddress(s.to_string()));
        }

        let port = parse_port(port).ok_or_else(|| ParseError::InvalidPort(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

impl std::fmt::Display for ReplicaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parse a comma separated `host:port` list.
///
/// Whitespace around entries is trimmed and empty entries are skipped, so
/// `""` yields an empty list. The first malformed entry fails the whole list.
pub fn parse_address_list(list: &str) -> Result<Vec<ReplicaAddress>, ParseError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}

/// Parse the reply of `SENTINEL get-master-addr-by-name`.
///
/// Sentinel replies with a nil for a pod it does not monitor, which maps
/// to `Ok(None)`.
pub fn parse_master_reply(
    reply: Option<Vec<String>>,
) -> Result<Option<ReplicaAddress>, ParseError> {
    let Some(fields) = reply else {
        return Ok(None);
    };

    match fields.as_slice() {
        [] => Ok(None),
        [host, port] => ReplicaAddress::from_parts(host, port)
            .map(Some)
            .map_err(|e| ParseError::InvalidMasterReply(e.to_string())),
        other => Err(ParseError::InvalidMasterReply(format!(
            "expected [host, port], got {} fields",
            other.len()
        ))),
    }
}

/// Flags Sentinel reports for a monitored instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentinelFlags {
    /// Subjectively down from this Sentinel's point of view.
    pub s_down: bool,
    /// Objectively down (quorum agreed).
    pub o_down: bool,
    /// Sentinel has no link to the instance.
    pub disconnected: bool,
    /// Instance is being promoted or demoted.
    pub promoted: bool,
}

impl SentinelFlags {
    /// Parse the comma separated `flags` field.
    pub fn parse(flags_str: &str) -> Self {
        let mut flags = SentinelFlags::default();
        for flag in flags_str.split(',') {
            match flag.trim() {
                "s_down" => flags.s_down = true,
                "o_down" => flags.o_down = true,
                "disconnected" => flags.disconnected = true,
                "promoted" => flags.promoted = true,
                _ => {}
            }
        }
        flags
    }

    /// Check if Sentinel considers the instance reachable and up.
    pub fn is_healthy(&self) -> bool {
        !self.s_down && !self.o_down && !self.disconnected
    }
}

/// One entry of `SENTINEL slaves <pod>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaInfo {
    /// Address the replica announced to Sentinel.
    pub address: ReplicaAddress,
    /// Sentinel's view of the replica's state.
    pub flags: SentinelFlags,
    /// `master-link-status` ("ok" or "err"), when reported.
    pub master_link_status: Option<String>,
}

impl ReplicaInfo {
    /// Parse a flat `[key, value, key, value, ...]` Sentinel entry.
    pub fn from_fields(fields: &[String]) -> Result<Self, ParseError> {
        if fields.len() % 2 != 0 {
            return Err(ParseError::InvalidReplicaEntry(format!(
                "odd number of fields ({})",
                fields.len()
            )));
        }

        let raw: HashMap<&str, &str> = fields
            .chunks_exact(2)
            .filter_map(|pair| match pair {
                [key, value] => Some((key.as_str(), value.as_str())),
                _ => None,
            })
            .collect();

        let host = raw
            .get("ip")
            .ok_or_else(|| ParseError::MissingField("ip".to_string()))?;
        let port = raw
            .get("port")
            .ok_or_else(|| ParseError::MissingField("port".to_string()))?;
        let address = ReplicaAddress::from_parts(host, port)
            .map_err(|e| ParseError::InvalidReplicaEntry(e.to_string()))?;

        Ok(ReplicaInfo {
            address,
            flags: raw
                .get("flags")
                .map(|f| SentinelFlags::parse(f))
                .unwrap_or_default(),
            master_link_status: raw.get("master-link-status").map(|s| s.to_string()),
        })
    }

    /// Check if the replica is up and linked to its master.
    pub fn is_healthy(&self) -> bool {
        self.flags.is_healthy() && self.master_link_status.as_deref() != Some("err")
    }
}
