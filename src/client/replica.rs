//! Replication directives against candidate replicas.

use tracing::{debug, instrument};

use super::types::ReplicaAddress;
use super::valkey_client::{ValkeyClient, ValkeyClientConfig, ValkeyError};
use crate::pool::{ReplicaConnector, ReplicaLink};

/// Replication operations for ValkeyClient.
impl ValkeyClient {
    /// Execute `SLAVEOF <host> <port>` to make this node replicate from `source`.
    ///
    /// Every server version accepts `SLAVEOF`; `REPLICAOF` needs 5.0.
    #[instrument(skip(self, source), fields(node = %self.address(), source = %source))]
    pub async fn slaveof(&self, source: &ReplicaAddress) -> Result<(), ValkeyError> {
        let _reply: String = self
            .command("SLAVEOF", vec![source.host.clone(), source.port.to_string()])
            .await?;
        debug!("SLAVEOF accepted");
        Ok(())
    }
}

impl ReplicaLink for ValkeyClient {
    type Error = ValkeyError;

    async fn replicate_from(&self, source: &ReplicaAddress) -> Result<(), Self::Error> {
        self.slaveof(source).await
    }

    async fn disconnect(self) -> Result<(), Self::Error> {
        self.close().await
    }
}

/// Opens a fresh [`ValkeyClient`] to each candidate.
#[derive(Clone, Debug, Default)]
pub struct ValkeyConnector {
    config: ValkeyClientConfig,
}

impl ValkeyConnector {
    /// Create a connector using the given connection settings.
    pub fn new(config: ValkeyClientConfig) -> Self {
        Self { config }
    }
}

impl ReplicaConnector for ValkeyConnector {
    type Link = ValkeyClient;
    type Error = ValkeyError;

    async fn connect(&self, address: &ReplicaAddress) -> Result<Self::Link, Self::Error> {
        ValkeyClient::connect(address, &self.config).await
    }
}
