//! Sentinel topology queries.
//!
//! Sentinel speaks the regular Redis protocol, so a [`ValkeyClient`]
//! connected to a Sentinel port can ask it about the pods it monitors.

use tracing::{debug, instrument};

use super::types::{ReplicaAddress, ReplicaInfo, parse_master_reply};
use super::valkey_client::{ValkeyClient, ValkeyError};
use crate::pool::TopologySource;

/// Sentinel operations for ValkeyClient.
impl ValkeyClient {
    /// Execute `SENTINEL get-master-addr-by-name <pod>`.
    #[instrument(skip(self))]
    pub async fn sentinel_master_addr(&self, pod: &str) -> Result<ReplicaAddress, ValkeyError> {
        let reply: Option<Vec<String>> = self
            .command(
                "SENTINEL",
                vec!["get-master-addr-by-name".to_string(), pod.to_string()],
            )
            .await?;

        parse_master_reply(reply)?.ok_or_else(|| ValkeyError::UnknownPod(pod.to_string()))
    }

    /// Execute `SENTINEL slaves <pod>` and parse each entry.
    ///
    /// `slaves` is used over `replicas` since Sentinel only learned the
    /// latter in 5.0. Entries keep the order Sentinel reported them in.
    #[instrument(skip(self))]
    pub async fn sentinel_slaves(&self, pod: &str) -> Result<Vec<ReplicaInfo>, ValkeyError> {
        let reply: Vec<Vec<String>> = self
            .command("SENTINEL", vec!["slaves".to_string(), pod.to_string()])
            .await?;

        debug!(entries = reply.len(), "Received replica list");

        let replicas = reply
            .iter()
            .map(|fields| ReplicaInfo::from_fields(fields))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(replicas)
    }
}

impl TopologySource for ValkeyClient {
    type Error = ValkeyError;

    async fn master(&self, pod: &str) -> Result<ReplicaAddress, Self::Error> {
        self.sentinel_master_addr(pod).await
    }

    async fn replicas(&self, pod: &str) -> Result<Vec<ReplicaInfo>, Self::Error> {
        self.sentinel_slaves(pod).await
    }
}
