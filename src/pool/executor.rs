//! Plan execution - the fallible, per-candidate half of slave pool creation.
//!
//! Every assignment is processed to completion (connect, issue the
//! directive, record the outcome) before the next one starts. A failure on
//! one candidate is recorded and never stops the run.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use super::planner::{Assignment, AssignmentPlan};
use crate::client::ReplicaAddress;

/// An open connection to a candidate replica.
pub trait ReplicaLink: Send + Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Tell the connected node to replicate from `source`.
    fn replicate_from(
        &self,
        source: &ReplicaAddress,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the connection.
    fn disconnect(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Opens connections to candidate replicas.
pub trait ReplicaConnector {
    type Link: ReplicaLink;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a new connection to `address`.
    fn connect(
        &self,
        address: &ReplicaAddress,
    ) -> impl Future<Output = Result<Self::Link, Self::Error>> + Send;
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The directive was accepted.
    Replicating,
    /// No connection could be opened to the candidate.
    ConnectFailed { error: String },
    /// The candidate was reached but rejected the directive.
    ReplicateFailed { error: String },
    /// Nothing was attempted (dry run).
    Skipped,
}

/// Result of executing one [`Assignment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateOutcome {
    pub candidate: ReplicaAddress,
    pub source: ReplicaAddress,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl CandidateOutcome {
    fn new(assignment: &Assignment, status: OutcomeStatus) -> Self {
        Self {
            candidate: assignment.candidate.clone(),
            source: assignment.source.clone(),
            status,
        }
    }

    /// Check if the candidate is now replicating from its source.
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Replicating
    }

    /// Check if the candidate failed at either stage.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::ConnectFailed { .. } | OutcomeStatus::ReplicateFailed { .. }
        )
    }
}

/// Execute every assignment of `plan`, in order.
///
/// Returns one outcome per assignment, in plan order.
#[instrument(skip_all, fields(policy = %plan.policy, assignments = plan.len()))]
pub async fn execute_plan<C>(plan: &AssignmentPlan, connector: &C) -> Vec<CandidateOutcome>
where
    C: ReplicaConnector,
{
    let mut outcomes = Vec::with_capacity(plan.len());
    for assignment in &plan.assignments {
        let status = execute_assignment(assignment, connector).await;
        outcomes.push(CandidateOutcome::new(assignment, status));
    }
    outcomes
}

/// Record every assignment of `plan` as skipped without touching the network.
pub fn skip_plan(plan: &AssignmentPlan) -> Vec<CandidateOutcome> {
    plan.assignments
        .iter()
        .map(|assignment| {
            info!(
                candidate = %assignment.candidate,
                source = %assignment.source,
                "Dry run: would enslave candidate"
            );
            CandidateOutcome::new(assignment, OutcomeStatus::Skipped)
        })
        .collect()
}

async fn execute_assignment<C>(assignment: &Assignment, connector: &C) -> OutcomeStatus
where
    C: ReplicaConnector,
{
    let candidate = &assignment.candidate;
    let source = &assignment.source;

    let link = match connector.connect(candidate).await {
        Ok(link) => link,
        Err(e) => {
            error!(candidate = %candidate, error = %e, "Failed to connect to candidate");
            return OutcomeStatus::ConnectFailed {
                error: e.to_string(),
            };
        }
    };

    let status = match link.replicate_from(source).await {
        Ok(()) => {
            info!(candidate = %candidate, source = %source, "Enslaved candidate");
            OutcomeStatus::Replicating
        }
        Err(e) => {
            error!(
                candidate = %candidate,
                source = %source,
                error = %e,
                "Candidate rejected SLAVEOF"
            );
            OutcomeStatus::ReplicateFailed {
                error: e.to_string(),
            }
        }
    };

    if let Err(e) = link.disconnect().await {
        debug!(candidate = %candidate, error = %e, "Error closing candidate connection");
    }

    status
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::pool::planner::plan_assignments;
    use crate::pool::policy::SyncPolicy;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct FakeError(String);

    #[derive(Default)]
    struct Calls {
        connects: Vec<ReplicaAddress>,
        directives: Vec<(ReplicaAddress, ReplicaAddress)>,
    }

    #[derive(Default)]
    struct FakeConnector {
        unreachable: HashSet<String>,
        rejecting: HashSet<String>,
        calls: Arc<Mutex<Calls>>,
    }

    struct FakeLink {
        address: ReplicaAddress,
        reject: bool,
        calls: Arc<Mutex<Calls>>,
    }

    impl ReplicaLink for FakeLink {
        type Error = FakeError;

        async fn replicate_from(&self, source: &ReplicaAddress) -> Result<(), FakeError> {
            self.calls
                .lock()
                .unwrap()
                .directives
                .push((self.address.clone(), source.clone()));
            if self.reject {
                Err(FakeError("ERR replica is read-only".to_string()))
            } else {
                Ok(())
            }
        }

        async fn disconnect(self) -> Result<(), FakeError> {
            Ok(())
        }
    }

    impl ReplicaConnector for FakeConnector {
        type Link = FakeLink;
        type Error = FakeError;

        async fn connect(&self, address: &ReplicaAddress) -> Result<FakeLink, FakeError> {
            self.calls.lock().unwrap().connects.push(address.clone());
            if self.unreachable.contains(&address.host) {
                return Err(FakeError("connection refused".to_string()));
            }
            Ok(FakeLink {
                address: address.clone(),
                reject: self.rejecting.contains(&address.host),
                calls: self.calls.clone(),
            })
        }
    }

    fn plan(candidates: usize, policy: SyncPolicy) -> AssignmentPlan {
        let pool: Vec<_> = (1..=3)
            .map(|i| ReplicaAddress::new(format!("h{}", i), 6379))
            .collect();
        let candidates: Vec<_> = (1..=candidates)
            .map(|i| ReplicaAddress::new(format!("c{}", i), 6380))
            .collect();
        plan_assignments(&candidates, &pool, policy).unwrap()
    }

    #[tokio::test]
    async fn test_execute_plan_all_succeed() {
        let connector = FakeConnector::default();
        let plan = plan(4, SyncPolicy::Ring);

        let outcomes = execute_plan(&plan, &connector).await;
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(CandidateOutcome::is_success));

        let calls = connector.calls.lock().unwrap();
        assert_eq!(calls.connects.len(), 4);
        assert_eq!(calls.directives[3].1, ReplicaAddress::new("h1", 6379));
    }

    #[tokio::test]
    async fn test_connect_failure_does_not_stop_run() {
        let connector = FakeConnector {
            unreachable: HashSet::from(["c2".to_string()]),
            ..Default::default()
        };
        let plan = plan(3, SyncPolicy::Single);

        let outcomes = execute_plan(&plan, &connector).await;
        assert!(outcomes[0].is_success());
        assert!(matches!(
            outcomes[1].status,
            OutcomeStatus::ConnectFailed { ref error } if error == "connection refused"
        ));
        assert!(outcomes[2].is_success());

        let calls = connector.calls.lock().unwrap();
        assert_eq!(calls.connects.len(), 3);
        assert_eq!(calls.directives.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_directive_is_recorded() {
        let connector = FakeConnector {
            rejecting: HashSet::from(["c1".to_string()]),
            ..Default::default()
        };
        let plan = plan(2, SyncPolicy::Direct);

        let outcomes = execute_plan(&plan, &connector).await;
        assert!(outcomes[0].is_failure());
        assert!(matches!(
            outcomes[0].status,
            OutcomeStatus::ReplicateFailed { .. }
        ));
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_empty_plan_makes_no_connections() {
        let connector = FakeConnector::default();
        let plan = AssignmentPlan::empty(SyncPolicy::Ring, 3);

        let outcomes = execute_plan(&plan, &connector).await;
        assert!(outcomes.is_empty());
        assert!(connector.calls.lock().unwrap().connects.is_empty());
    }

    #[test]
    fn test_skip_plan() {
        let plan = plan(2, SyncPolicy::Ring);
        let outcomes = skip_plan(&plan);
        assert_eq!(outcomes.len(), 2);
        assert!(
            outcomes
                .iter()
                .all(|o| o.status == OutcomeStatus::Skipped && !o.is_failure())
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = CandidateOutcome {
            candidate: ReplicaAddress::new("c1", 6380),
            source: ReplicaAddress::new("h1", 6379),
            status: OutcomeStatus::ConnectFailed {
                error: "timeout".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "connect_failed");
        assert_eq!(json["error"], "timeout");
        assert_eq!(json["candidate"]["host"], "c1");
        assert_eq!(json["source"]["port"], 6379);
    }
}
