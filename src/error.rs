//! Fatal error types.
//!
//! Anything represented here ends the run. Per-candidate failures are not
//! errors at this level; they are recorded in the run report instead.

use thiserror::Error;

use crate::client::{ReplicaAddress, ValkeyError};
use crate::pool::PlanError;

/// Boxed error from a topology source implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for a slave pool run.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid command line or configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Sentinel could not be reached
    #[error("Failed to connect to Sentinel at {address}: {source}")]
    SentinelConnect {
        address: ReplicaAddress,
        #[source]
        source: ValkeyError,
    },

    /// Master lookup failed
    #[error("Failed to resolve master for pod '{pod}': {source}")]
    MasterLookup {
        pod: String,
        #[source]
        source: BoxError,
    },

    /// Primary pool lookup failed
    #[error("Failed to fetch primary slave pool for pod '{pod}': {source}")]
    PrimaryPool {
        pod: String,
        #[source]
        source: BoxError,
    },

    /// The assignment plan could not be computed
    #[error("Cannot plan slave pool: {0}")]
    Plan(#[from] PlanError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error was caused by invalid input rather than the environment
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        if self.is_config_error() { 2 } else { 1 }
    }
}

/// Result type alias for slave pool runs
pub type Result<T> = std::result::Result<T, Error>;
