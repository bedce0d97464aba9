//! Redis/Valkey client module for Sentinel queries and replication directives.
//!
//! This module provides a type-safe wrapper around the `fred` Redis client.
//! It handles connection management, TLS and authentication, and implements
//! the [`TopologySource`](crate::pool::TopologySource) and
//! [`ReplicaConnector`](crate::pool::ReplicaConnector) seams the slave pool
//! flow runs against.
//!
//! ## Architecture
//!
//! - `valkey_client`: Core client wrapper with timeouts and TLS support
//! - `types`: Addresses and parsed Sentinel replies
//! - `sentinel`: `SENTINEL get-master-addr-by-name` and `SENTINEL slaves`
//! - `replica`: `SLAVEOF` and the per-candidate connector
//!
//! ## Example
//!
//! ```rust,ignore
//! use daisy::client::{ReplicaAddress, ValkeyClient, ValkeyClientConfig};
//!
//! let sentinel = ValkeyClient::connect(&"localhost:26379".parse()?, &ValkeyClientConfig::new()).await?;
//! let master = sentinel.sentinel_master_addr("pod1").await?;
//! println!("master is {}", master);
//! ```

pub mod replica;
pub mod sentinel;
pub mod types;
pub mod valkey_client;

pub use replica::ValkeyConnector;
pub use types::{
    ParseError, ReplicaAddress, ReplicaInfo, SentinelFlags, parse_address_list, parse_master_reply,
};
pub use valkey_client::{ValkeyClient, ValkeyClientConfig, ValkeyError};
