//! In-memory stand-ins for Sentinel and the candidate replicas.
//!
//! `MockPod` implements both `TopologySource` and `ReplicaConnector`, so a
//! single value plays Sentinel and every candidate at once. It keeps a log
//! of what the flow asked for, which tests assert against.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use daisy::RunContext;
use daisy::client::{ReplicaAddress, ReplicaInfo, SentinelFlags};
use daisy::pool::{ReplicaConnector, ReplicaLink, SyncPolicy, TopologySource};

/// Error returned by the mock.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// What the flow did against the mock.
#[derive(Debug, Default)]
pub struct CallLog {
    pub master_lookups: usize,
    pub replica_lookups: usize,
    pub connects: Vec<ReplicaAddress>,
    /// `(candidate, source)` for every SLAVEOF issued.
    pub directives: Vec<(ReplicaAddress, ReplicaAddress)>,
    pub disconnects: usize,
}

/// Simulated pod: a master, its Sentinel-known replicas, and candidate behaviour.
#[derive(Debug, Clone, Default)]
pub struct MockPod {
    pub master: Option<ReplicaAddress>,
    pub replicas: Vec<ReplicaInfo>,
    pub sentinel_down: bool,
    pub unreachable: HashSet<ReplicaAddress>,
    pub rejecting: HashMap<ReplicaAddress, String>,
    pub log: Arc<Mutex<CallLog>>,
}

impl MockPod {
    /// Pod with master `m1:6379` and replicas `h1..hN:6379`.
    pub fn with_replicas(count: usize) -> Self {
        Self {
            master: Some(ReplicaAddress::new("m1", 6379)),
            replicas: (1..=count)
                .map(|i| replica(&format!("h{}", i), 6379))
                .collect(),
            ..Default::default()
        }
    }

    /// Make connecting to `candidate` fail.
    pub fn unreachable(mut self, candidate: &ReplicaAddress) -> Self {
        self.unreachable.insert(candidate.clone());
        self
    }

    /// Make `candidate` reject SLAVEOF with `message`.
    pub fn rejecting(mut self, candidate: &ReplicaAddress, message: &str) -> Self {
        self.rejecting
            .insert(candidate.clone(), message.to_string());
        self
    }

    /// Snapshot of the directives issued so far, as `(candidate host, source host)`.
    pub fn directive_hosts(&self) -> Vec<(String, String)> {
        self.log
            .lock()
            .unwrap()
            .directives
            .iter()
            .map(|(c, s)| (c.host.clone(), s.host.clone()))
            .collect()
    }

    pub fn connect_count(&self) -> usize {
        self.log.lock().unwrap().connects.len()
    }

    pub fn sentinel_queries(&self) -> usize {
        let log = self.log.lock().unwrap();
        log.master_lookups + log.replica_lookups
    }
}

/// Healthy replica entry as Sentinel would report it.
pub fn replica(host: &str, port: u16) -> ReplicaInfo {
    ReplicaInfo {
        address: ReplicaAddress::new(host, port),
        flags: SentinelFlags::default(),
        master_link_status: Some("ok".to_string()),
    }
}

/// Candidates `c1..cN:6380`.
pub fn candidates(count: usize) -> Vec<ReplicaAddress> {
    (1..=count)
        .map(|i| ReplicaAddress::new(format!("c{}", i), 6380))
        .collect()
}

/// Context for pod `pod1` with the given candidates and policy.
pub fn context(candidates: Vec<ReplicaAddress>, policy: SyncPolicy) -> RunContext {
    RunContext::new(
        "pod1",
        ReplicaAddress::new("localhost", 26379),
        candidates,
        policy,
    )
}

impl TopologySource for MockPod {
    type Error = MockError;

    async fn master(&self, pod: &str) -> Result<ReplicaAddress, MockError> {
        self.log.lock().unwrap().master_lookups += 1;
        if self.sentinel_down {
            return Err(MockError("connection reset by peer".to_string()));
        }
        self.master
            .clone()
            .ok_or_else(|| MockError(format!("no such master '{}'", pod)))
    }

    async fn replicas(&self, _pod: &str) -> Result<Vec<ReplicaInfo>, MockError> {
        self.log.lock().unwrap().replica_lookups += 1;
        if self.sentinel_down {
            return Err(MockError("connection reset by peer".to_string()));
        }
        Ok(self.replicas.clone())
    }
}

/// Connection to one simulated candidate.
pub struct MockLink {
    address: ReplicaAddress,
    reject_with: Option<String>,
    log: Arc<Mutex<CallLog>>,
}

impl ReplicaLink for MockLink {
    type Error = MockError;

    async fn replicate_from(&self, source: &ReplicaAddress) -> Result<(), MockError> {
        if let Some(ref message) = self.reject_with {
            return Err(MockError(message.clone()));
        }
        self.log
            .lock()
            .unwrap()
            .directives
            .push((self.address.clone(), source.clone()));
        Ok(())
    }

    async fn disconnect(self) -> Result<(), MockError> {
        self.log.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

impl ReplicaConnector for MockPod {
    type Link = MockLink;
    type Error = MockError;

    async fn connect(&self, address: &ReplicaAddress) -> Result<MockLink, MockError> {
        self.log.lock().unwrap().connects.push(address.clone());
        if self.unreachable.contains(address) {
            return Err(MockError(format!("dial tcp {}: connection refused", address)));
        }
        Ok(MockLink {
            address: address.clone(),
            reject_with: self.rejecting.get(address).cloned(),
            log: self.log.clone(),
        })
    }
}
