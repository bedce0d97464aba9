//! Redis/Valkey client wrapper using the fred crate.
//!
//! Provides a single-node client with timeouts, optional TLS and
//! authentication. Both Sentinel and the candidate replicas are reached
//! through this type.

use std::time::Duration;

use fred::prelude::*;
use fred::types::{ClusterHash, CustomCommand, FromValue};
use thiserror::Error;
use tracing::{debug, instrument};

use super::types::ReplicaAddress;

/// Errors that can occur during Redis/Valkey operations.
#[derive(Error, Debug)]
pub enum ValkeyError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Redis error: {0}")]
    Redis(#[from] fred::error::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] crate::client::types::ParseError),

    #[error("Sentinel does not monitor pod '{0}'")]
    UnknownPod(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Connection settings shared by every client the tool opens.
#[derive(Clone, Debug)]
pub struct ValkeyClientConfig {
    /// Password for AUTH.
    pub password: Option<String>,
    /// Connect with TLS using the platform root certificates.
    pub tls: bool,
    /// Connection timeout.
    pub connection_timeout: Duration,
    /// Command timeout.
    pub command_timeout: Duration,
}

impl Default for ValkeyClientConfig {
    fn default() -> Self {
        Self {
            password: None,
            tls: false,
            connection_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
        }
    }
}

impl ValkeyClientConfig {
    /// Create a configuration with default timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable TLS.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Set password.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Set connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Client connected to a single Redis/Valkey or Sentinel node.
pub struct ValkeyClient {
    client: Client,
    address: ReplicaAddress,
}

impl ValkeyClient {
    /// Create and connect a client for a single (non-clustered) node.
    #[instrument(skip(address, config), fields(address = %address, tls = config.tls))]
    pub async fn connect(
        address: &ReplicaAddress,
        config: &ValkeyClientConfig,
    ) -> Result<Self, ValkeyError> {
        if config.connection_timeout.is_zero() {
            return Err(ValkeyError::InvalidConfig(
                "connection timeout must be greater than zero".to_string(),
            ));
        }

        let server_config = ServerConfig::Centralized {
            server: Server::new(address.host.clone(), address.port),
        };

        let mut redis_config = Config {
            server: server_config,
            ..Default::default()
        };

        if let Some(ref password) = config.password {
            redis_config.password = Some(password.clone());
        }

        if config.tls {
            let tls_connector = TlsConnector::default_rustls()
                .map_err(|e| ValkeyError::Connection(format!("TLS error: {}", e)))?;
            redis_config.tls = Some(tls_connector.into());
        }

        let command_timeout = config.command_timeout;
        let connection_timeout = config.connection_timeout;

        let client = Builder::from_config(redis_config)
            .with_performance_config(|perf| {
                perf.default_command_timeout = command_timeout;
            })
            .with_connection_config(|conn| {
                conn.connection_timeout = connection_timeout;
            })
            .build()?;

        debug!("Connecting");
        client.init().await?;
        debug!("Connected");

        Ok(Self {
            client,
            address: address.clone(),
        })
    }

    /// Address this client is connected to.
    pub fn address(&self) -> &ReplicaAddress {
        &self.address
    }

    /// Close the connection.
    pub async fn close(&self) -> Result<(), ValkeyError> {
        self.client.quit().await?;
        Ok(())
    }

    /// Send a command fred has no typed interface for.
    pub(crate) async fn command<R>(
        &self,
        name: &'static str,
        args: Vec<String>,
    ) -> Result<R, ValkeyError>
    where
        R: FromValue,
    {
        let cmd = CustomCommand::new_static(name, ClusterHash::FirstKey, false);
        let response: R = self.client.custom(cmd, args).await?;
        Ok(response)
    }
}
