//! `slavepool create`: attach the candidates to the pod's primary pool.

use std::future::Future;

use tracing::{info, instrument, warn};

use super::executor::{ReplicaConnector, execute_plan, skip_plan};
use super::planner::plan_assignments;
use super::report::RunReport;
use crate::client::{ReplicaAddress, ReplicaInfo};
use crate::context::RunContext;
use crate::error::{Error, Result};

/// Where the pod's current topology comes from.
pub trait TopologySource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Current master of `pod`.
    fn master(
        &self,
        pod: &str,
    ) -> impl Future<Output = std::result::Result<ReplicaAddress, Self::Error>> + Send;

    /// Replicas of `pod`, in the order the source reports them.
    fn replicas(
        &self,
        pod: &str,
    ) -> impl Future<Output = std::result::Result<Vec<ReplicaInfo>, Self::Error>> + Send;
}

/// Report for a run without candidates.
pub fn nothing_to_do(ctx: &RunContext) -> RunReport {
    warn!("Need a list of existing Redis instances to use as slaves");
    RunReport::empty(ctx.pod.clone(), ctx.policy, ctx.dry_run)
}

/// Query the topology, plan, and execute (or skip, on a dry run) every assignment.
///
/// Topology lookups and planning errors are fatal. Per-candidate failures
/// are recorded in the returned report.
#[instrument(skip_all, fields(pod = %ctx.pod, policy = %ctx.policy, dry_run = ctx.dry_run))]
pub async fn create_slave_pool<T, C>(
    ctx: &RunContext,
    topology: &T,
    connector: &C,
) -> Result<RunReport>
where
    T: TopologySource,
    C: ReplicaConnector,
{
    if !ctx.has_candidates() {
        return Ok(nothing_to_do(ctx));
    }

    info!(pod = %ctx.pod, "Pod");
    info!(policy = %ctx.policy, "Slave Pool Policy");
    for candidate in &ctx.candidates {
        info!(candidate = %candidate, "Secondary Slave");
    }

    let master = topology
        .master(&ctx.pod)
        .await
        .map_err(|e| Error::MasterLookup {
            pod: ctx.pod.clone(),
            source: Box::new(e),
        })?;
    info!(master = %master, "Got master");

    info!("Pulling primary slavepool");
    let primary_pool = topology
        .replicas(&ctx.pod)
        .await
        .map_err(|e| Error::PrimaryPool {
            pod: ctx.pod.clone(),
            source: Box::new(e),
        })?;
    for replica in &primary_pool {
        if replica.is_healthy() {
            info!(address = %replica.address, "Primary Slave Address");
        } else {
            warn!(
                address = %replica.address,
                flags = ?replica.flags,
                master_link_status = ?replica.master_link_status,
                "Primary Slave Address reported unhealthy by Sentinel"
            );
        }
    }

    let pool: Vec<ReplicaAddress> = primary_pool.iter().map(|r| r.address.clone()).collect();
    let plan = plan_assignments(&ctx.candidates, &pool, ctx.policy)?;
    for (source, count) in plan.fan_out() {
        info!(source = %source, candidates = count, "Planned fan-out");
    }

    let outcomes = if ctx.dry_run {
        skip_plan(&plan)
    } else {
        execute_plan(&plan, connector).await
    };

    let report = RunReport {
        pod: ctx.pod.clone(),
        policy: ctx.policy,
        dry_run: ctx.dry_run,
        master: Some(master),
        primary_pool,
        outcomes,
    };

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Slave pool run complete"
    );

    Ok(report)
}
