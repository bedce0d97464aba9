//! Slave pool assignment planning - computes who replicates from whom, no I/O.
//!
//! This module provides pure functions that pair every candidate with the
//! primary pool member it should replicate from. Executing the plan is the
//! job of [`executor`](super::executor).

use serde::Serialize;
use thiserror::Error;

use super::policy::SyncPolicy;
use crate::client::ReplicaAddress;

/// Errors that make a plan impossible to compute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Primary pool is empty: policy '{policy}' needs at least one replica to attach to")]
    EmptyPrimaryPool { policy: SyncPolicy },

    #[error(
        "Insufficient primary pool size: {candidates} candidates but only {available} primary replicas (first unpaired candidate: {first_unpaired})"
    )]
    InsufficientPrimaryPool {
        candidates: usize,
        available: usize,
        first_unpaired: ReplicaAddress,
    },
}

/// A candidate paired with the primary pool member it replicates from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Operator-supplied replica that receives the directive.
    pub candidate: ReplicaAddress,
    /// Primary pool member the candidate replicates from.
    pub source: ReplicaAddress,
}

impl Assignment {
    /// Create a new assignment.
    pub fn new(candidate: ReplicaAddress, source: ReplicaAddress) -> Self {
        Self { candidate, source }
    }
}

/// Complete assignment plan, in candidate order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentPlan {
    /// Policy the plan was computed with.
    pub policy: SyncPolicy,
    /// Size of the primary pool the plan was computed against.
    pub primary_pool_size: usize,
    /// One entry per candidate, same order as the candidates.
    pub assignments: Vec<Assignment>,
}

impl AssignmentPlan {
    /// Create an empty plan.
    pub fn empty(policy: SyncPolicy, primary_pool_size: usize) -> Self {
        Self {
            policy,
            primary_pool_size,
            assignments: Vec::new(),
        }
    }

    /// Check if the plan is empty (no work to do).
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of planned assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Number of candidates per source, in first-use order.
    pub fn fan_out(&self) -> Vec<(&ReplicaAddress, usize)> {
        let mut counts: Vec<(&ReplicaAddress, usize)> = Vec::new();
        for assignment in &self.assignments {
            match counts.iter_mut().find(|(src, _)| *src == &assignment.source) {
                Some((_, count)) => *count += 1,
                None => counts.push((&assignment.source, 1)),
            }
        }
        counts
    }
}

/// Index into the primary pool for the candidate at `position`.
///
/// Returns `None` when the policy cannot place the candidate: an empty
/// pool for any policy, or a position past the end of the pool for
/// [`SyncPolicy::Direct`].
pub fn source_index(policy: SyncPolicy, position: usize, pool_len: usize) -> Option<usize> {
    if pool_len == 0 {
        return None;
    }
    match policy {
        SyncPolicy::Single => Some(0),
        SyncPolicy::Direct => (position < pool_len).then_some(position),
        SyncPolicy::Ring => Some(position % pool_len),
    }
}

/// Compute the assignment plan for `candidates` against `primary_pool`.
///
/// This is pure computation - no I/O involved. The plan is all-or-nothing:
/// if any candidate cannot be placed, no plan is returned.
///
/// # Arguments
/// * `candidates` - Operator-supplied replicas, in the order given
/// * `primary_pool` - Replicas Sentinel reported, in Sentinel's order
/// * `policy` - Pairing policy
pub fn plan_assignments(
    candidates: &[ReplicaAddress],
    primary_pool: &[ReplicaAddress],
    policy: SyncPolicy,
) -> Result<AssignmentPlan, PlanError> {
    if candidates.is_empty() {
        return Ok(AssignmentPlan::empty(policy, primary_pool.len()));
    }

    if primary_pool.is_empty() {
        return Err(PlanError::EmptyPrimaryPool { policy });
    }

    let mut assignments = Vec::with_capacity(candidates.len());
    for (position, candidate) in candidates.iter().enumerate() {
        let source = source_index(policy, position, primary_pool.len())
            .and_then(|idx| primary_pool.get(idx))
            .ok_or_else(|| PlanError::InsufficientPrimaryPool {
                candidates: candidates.len(),
                available: primary_pool.len(),
                first_unpaired: candidate.clone(),
            })?;
        assignments.push(Assignment::new(candidate.clone(), source.clone()));
    }

    Ok(AssignmentPlan {
        policy,
        primary_pool_size: primary_pool.len(),
        assignments,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::get_unwrap
)]
mod tests {
    use super::*;

    fn addrs(prefix: &str, count: usize, port: u16) -> Vec<ReplicaAddress> {
        (1..=count)
            .map(|i| ReplicaAddress::new(format!("{}{}", prefix, i), port))
            .collect()
    }

    fn sources(plan: &AssignmentPlan) -> Vec<String> {
        plan.assignments
            .iter()
            .map(|a| a.source.host.clone())
            .collect()
    }

    #[test]
    fn test_source_index() {
        assert_eq!(source_index(SyncPolicy::Single, 5, 3), Some(0));
        assert_eq!(source_index(SyncPolicy::Direct, 2, 3), Some(2));
        assert_eq!(source_index(SyncPolicy::Direct, 3, 3), None);
        assert_eq!(source_index(SyncPolicy::Ring, 4, 3), Some(1));
        for policy in SyncPolicy::ALL {
            assert_eq!(source_index(policy, 0, 0), None);
        }
    }

    #[test]
    fn test_ring_wraps_around_pool() {
        let pool = addrs("h", 3, 6379);
        let candidates = addrs("c", 4, 6380);

        let plan = plan_assignments(&candidates, &pool, SyncPolicy::Ring).unwrap();
        assert_eq!(sources(&plan), vec!["h1", "h2", "h3", "h1"]);
        assert_eq!(plan.primary_pool_size, 3);
        assert_eq!(plan.policy, SyncPolicy::Ring);
    }

    #[test]
    fn test_direct_pairs_by_position() {
        let pool = addrs("h", 3, 6379);
        let candidates = addrs("c", 3, 6380);

        let plan = plan_assignments(&candidates, &pool, SyncPolicy::Direct).unwrap();
        assert_eq!(sources(&plan), vec!["h1", "h2", "h3"]);
        assert_eq!(plan.assignments[1].candidate.host, "c2");
    }

    #[test]
    fn test_direct_rejects_pool_exhaustion() {
        let pool = addrs("h", 3, 6379);
        let candidates = addrs("c", 4, 6380);

        let err = plan_assignments(&candidates, &pool, SyncPolicy::Direct).unwrap_err();
        assert_eq!(
            err,
            PlanError::InsufficientPrimaryPool {
                candidates: 4,
                available: 3,
                first_unpaired: ReplicaAddress::new("c4", 6380),
            }
        );
        assert!(err.to_string().contains("Insufficient primary pool size"));
    }

    #[test]
    fn test_single_uses_first_member() {
        let pool = addrs("h", 3, 6379);
        let candidates = addrs("c", 4, 6380);

        let plan = plan_assignments(&candidates, &pool, SyncPolicy::Single).unwrap();
        assert_eq!(sources(&plan), vec!["h1"; 4]);
    }

    #[test]
    fn test_empty_pool_fails_fast() {
        let candidates = addrs("c", 2, 6380);
        for policy in SyncPolicy::ALL {
            let err = plan_assignments(&candidates, &[], policy).unwrap_err();
            assert_eq!(err, PlanError::EmptyPrimaryPool { policy });
        }
    }

    #[test]
    fn test_empty_candidates_yield_empty_plan() {
        let pool = addrs("h", 3, 6379);
        for policy in SyncPolicy::ALL {
            let plan = plan_assignments(&[], &pool, policy).unwrap();
            assert!(plan.is_empty());
            assert_eq!(plan.len(), 0);

            // No pool is needed when there is nothing to attach
            let plan = plan_assignments(&[], &[], policy).unwrap();
            assert!(plan.is_empty());
        }
    }

    #[test]
    fn test_fan_out() {
        let pool = addrs("h", 2, 6379);
        let candidates = addrs("c", 5, 6380);
        let plan = plan_assignments(&candidates, &pool, SyncPolicy::Ring).unwrap();

        let fan_out = plan.fan_out();
        assert_eq!(fan_out.len(), 2);
        assert_eq!(fan_out[0], (&pool[0], 3));
        assert_eq!(fan_out[1], (&pool[1], 2));
    }
}
