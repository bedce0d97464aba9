//! Aggregate result of one slave pool run.

use std::fmt::Write as _;

use serde::Serialize;

use super::executor::{CandidateOutcome, OutcomeStatus};
use super::policy::SyncPolicy;
use crate::client::{ReplicaAddress, ReplicaInfo};

/// Everything one invocation learned and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Pod the run targeted.
    pub pod: String,
    /// Policy the plan was computed with.
    pub policy: SyncPolicy,
    /// Whether directives were only planned.
    pub dry_run: bool,
    /// Master Sentinel reported, if Sentinel was queried.
    pub master: Option<ReplicaAddress>,
    /// Primary pool as Sentinel reported it.
    pub primary_pool: Vec<ReplicaInfo>,
    /// One entry per candidate, in candidate order.
    pub outcomes: Vec<CandidateOutcome>,
}

impl RunReport {
    /// Report for a run that had nothing to do.
    pub fn empty(pod: impl Into<String>, policy: SyncPolicy, dry_run: bool) -> Self {
        Self {
            pod: pod.into(),
            policy,
            dry_run,
            master: None,
            primary_pool: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Number of candidates now replicating.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of candidates that failed at either stage.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Number of candidates not attempted.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Skipped)
            .count()
    }

    /// Check if any candidate failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(CandidateOutcome::is_failure)
    }

    /// Render a human readable summary.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        let _ = writeln!(out, "pod {} policy {}{}", self.pod, self.policy, mode);
        if let Some(ref master) = self.master {
            let _ = writeln!(out, "master {}", master);
        }
        for outcome in &self.outcomes {
            let status = match &outcome.status {
                OutcomeStatus::Replicating => "ok".to_string(),
                OutcomeStatus::Skipped => "skipped".to_string(),
                OutcomeStatus::ConnectFailed { error } => format!("connect failed: {}", error),
                OutcomeStatus::ReplicateFailed { error } => {
                    format!("slaveof failed: {}", error)
                }
            };
            let _ = writeln!(
                out,
                "{} -> {} {}",
                outcome.candidate, outcome.source, status
            );
        }
        let _ = write!(
            out,
            "{} succeeded, {} failed, {} skipped",
            self.succeeded(),
            self.failed(),
            self.skipped()
        );
        out
    }
}
