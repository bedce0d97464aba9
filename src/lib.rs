//! daisy library crate
//!
//! Attaches a secondary slave pool to a Sentinel-managed Redis/Valkey pod.
//! This module exports the command line definition, the fred-backed client,
//! and the pure slave pool planning and execution logic.

pub mod cli;
pub mod client;
pub mod context;
pub mod error;
pub mod pool;

pub use context::RunContext;
pub use error::{Error, Result};

use tracing::{debug, info, instrument};

use client::{ValkeyClient, ValkeyConnector};
use pool::{RunReport, create_slave_pool, nothing_to_do};

/// Run `slavepool create` against the Sentinel named in `ctx`.
///
/// Sentinel is only contacted when there are candidates to attach. A new
/// connection is opened to every candidate in turn.
#[instrument(skip_all, fields(sentinel = %ctx.sentinel, pod = %ctx.pod))]
pub async fn run_create(ctx: &RunContext) -> Result<RunReport> {
    if !ctx.has_candidates() {
        return Ok(nothing_to_do(ctx));
    }

    info!("Getting Sentinel connection");
    let sentinel = ValkeyClient::connect(&ctx.sentinel, &ctx.sentinel_client)
        .await
        .map_err(|source| Error::SentinelConnect {
            address: ctx.sentinel.clone(),
            source,
        })?;

    let connector = ValkeyConnector::new(ctx.replica_client.clone());
    let result = create_slave_pool(ctx, &sentinel, &connector).await;

    if let Err(e) = sentinel.close().await {
        debug!(error = %e, "Error closing Sentinel connection");
    }

    result
}
