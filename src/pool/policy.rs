//! Slave pool synchronisation policies.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error returned for a policy name that is not one of [`SyncPolicy::NAMES`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown sync policy '{0}': expected one of single, direct, ring")]
pub struct UnknownPolicy(pub String);

/// How candidates are paired with members of the primary pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
    /// Every candidate replicates from the first primary pool member.
    #[default]
    Single,
    /// Candidate `i` replicates from primary pool member `i`.
    Direct,
    /// Candidate `i` replicates from primary pool member `i mod len`.
    Ring,
}

impl SyncPolicy {
    /// Names accepted by [`FromStr`], in declaration order.
    pub const NAMES: [&'static str; 3] = ["single", "direct", "ring"];

    /// All policies, in declaration order.
    pub const ALL: [SyncPolicy; 3] = [SyncPolicy::Single, SyncPolicy::Direct, SyncPolicy::Ring];

    /// Canonical name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPolicy::Single => "single",
            SyncPolicy::Direct => "direct",
            SyncPolicy::Ring => "ring",
        }
    }
}

impl FromStr for SyncPolicy {
    type Err = UnknownPolicy;

    /// Parse a policy name. Matching is exact apart from surrounding
    /// whitespace and ASCII case; no aliases are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(SyncPolicy::Single),
            "direct" => Ok(SyncPolicy::Direct),
            "ring" => Ok(SyncPolicy::Ring),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

impl std::fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
