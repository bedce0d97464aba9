//! Validated inputs for one invocation.
//!
//! The [`RunContext`] is built once from the command line and passed
//! explicitly into the slave pool flow.

use std::time::Duration;

use crate::cli::{CreateArgs, GlobalArgs};
use crate::client::{ReplicaAddress, ValkeyClientConfig, parse_address_list};
use crate::error::{Error, Result};
use crate::pool::SyncPolicy;

/// Shared context for a slave pool run.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Pod Sentinel is queried about.
    pub pod: String,
    /// Sentinel to query.
    pub sentinel: ReplicaAddress,
    /// Candidates to attach, in operator order.
    pub candidates: Vec<ReplicaAddress>,
    /// Pairing policy.
    pub policy: SyncPolicy,
    /// Plan only, issue no directives.
    pub dry_run: bool,
    /// Connection settings for Sentinel.
    pub sentinel_client: ValkeyClientConfig,
    /// Connection settings for candidates.
    pub replica_client: ValkeyClientConfig,
}

impl RunContext {
    /// Create a context with default connection settings.
    pub fn new(
        pod: impl Into<String>,
        sentinel: ReplicaAddress,
        candidates: Vec<ReplicaAddress>,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            pod: pod.into(),
            sentinel,
            candidates,
            policy,
            dry_run: false,
            sentinel_client: ValkeyClientConfig::default(),
            replica_client: ValkeyClientConfig::default(),
        }
    }

    /// Build and validate a context from `slavepool create` arguments.
    ///
    /// The pod name is only required when there are candidates; an empty
    /// `--slaves` list is a no-op run.
    pub fn from_args(global: &GlobalArgs, create: &CreateArgs) -> Result<Self> {
        let candidates = parse_address_list(create.slaves.as_deref().unwrap_or_default())
            .map_err(|e| Error::Config(format!("--slaves: {}", e)))?;

        let pod = global
            .podname
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        let pod = match pod {
            Some(pod) => pod,
            None if candidates.is_empty() => "",
            None => return Err(Error::Config("--podname is required".to_string())),
        };

        let sentinel: ReplicaAddress = global
            .sentinel
            .parse()
            .map_err(|e| Error::Config(format!("--sentinel: {}", e)))?;

        if global.connect_timeout == 0 {
            return Err(Error::Config(
                "--connect-timeout must be greater than zero".to_string(),
            ));
        }

        let base = ValkeyClientConfig::new()
            .with_tls(global.tls)
            .with_connection_timeout(Duration::from_secs(global.connect_timeout))
            .with_command_timeout(Duration::from_secs(global.command_timeout));

        Ok(Self {
            pod: pod.to_string(),
            sentinel,
            candidates,
            policy: create.syncpolicy,
            dry_run: create.dry_run,
            sentinel_client: base
                .clone()
                .with_password(global.sentinel_password.clone()),
            replica_client: base.with_password(global.password.clone()),
        })
    }

    /// Set dry run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check if there is anything to attach.
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}
