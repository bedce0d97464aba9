//! Slave pool logic.
//!
//! Separates the computation of "who replicates from whom" from "telling
//! each candidate to do it", so a plan can be computed, logged, or dry-run
//! without touching any candidate.
//!
//! ## Module Structure
//!
//! - [`policy`]: The three sync policies
//! - [`planner`]: Pure assignment planning with `AssignmentPlan`
//! - [`executor`]: Per-candidate execution against a `ReplicaConnector`
//! - [`report`]: Aggregate `RunReport`
//! - [`create`]: The `slavepool create` flow over a `TopologySource`

pub mod create;
pub mod executor;
pub mod planner;
pub mod policy;
pub mod report;

// Re-export commonly used types
pub use create::{TopologySource, create_slave_pool, nothing_to_do};
pub use executor::{
    CandidateOutcome, OutcomeStatus, ReplicaConnector, ReplicaLink, execute_plan, skip_plan,
};
pub use planner::{Assignment, AssignmentPlan, PlanError, plan_assignments, source_index};
pub use policy::{SyncPolicy, UnknownPolicy};
pub use report::RunReport;
