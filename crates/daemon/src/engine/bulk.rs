// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk actions over a commit's jobs.
//!
//! Runs in two phases. The filter phase keeps the jobs whose listed outcome
//! the action applies to and whose fresh status snapshot allows it; a job
//! whose handle or snapshot cannot be fetched is logged and left out. The
//! execution phase runs the action on every remaining job concurrently, one
//! spawned task per job. Every task is joined, and a task that dies still
//! yields a failure, so each attempted job contributes exactly one
//! [`ActionOutcome`].

use std::fmt;

use civet_adapters::{JobLease, JobService, RemoteError};
use civet_core::{CommitHash, JobInfo, JobOutcome, StatusSnapshot};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

/// Action applied to every eligible job of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Cancel,
    RebuildFailed,
    RebuildAll,
}

civet_core::simple_display! {
    BulkAction {
        Cancel => "cancel",
        RebuildFailed => "rebuild-failed",
        RebuildAll => "rebuild-all",
    }
}

impl BulkAction {
    /// Parse the route segment naming the action.
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "cancel" => Some(BulkAction::Cancel),
            "rebuild-failed" => Some(BulkAction::RebuildFailed),
            "rebuild-all" => Some(BulkAction::RebuildAll),
            _ => None,
        }
    }

    /// Whether the action applies to a job with this listed outcome.
    /// Jobs rejected here are skipped without any remote call.
    pub fn selects(&self, outcome: &JobOutcome) -> bool {
        match self {
            BulkAction::Cancel => outcome.is_active_or_pending(),
            BulkAction::RebuildFailed => outcome.is_unsuccessful(),
            BulkAction::RebuildAll => true,
        }
    }

    /// Whether the job's current snapshot allows the action.
    pub fn permits(&self, snapshot: &StatusSnapshot) -> bool {
        match self {
            BulkAction::Cancel => snapshot.can_cancel,
            BulkAction::RebuildFailed | BulkAction::RebuildAll => snapshot.can_rebuild,
        }
    }

    /// Base verb, e.g. "No jobs were eligible to rebuild".
    pub fn verb(&self) -> &'static str {
        match self {
            BulkAction::Cancel => "cancel",
            BulkAction::RebuildFailed | BulkAction::RebuildAll => "rebuild",
        }
    }

    fn progressive(&self) -> &'static str {
        match self {
            BulkAction::Cancel => "Cancelling",
            BulkAction::RebuildFailed | BulkAction::RebuildAll => "Rebuilding",
        }
    }

    fn participle(&self) -> &'static str {
        match self {
            BulkAction::Cancel => "cancelled",
            BulkAction::RebuildFailed | BulkAction::RebuildAll => "rebuilt",
        }
    }
}

/// Result of the action on one attempted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The remote side accepted the action.
    Success(JobInfo),
    Failure { job: JobInfo, reason: String },
}

impl ActionOutcome {
    pub fn job(&self) -> &JobInfo {
        match self {
            ActionOutcome::Success(job) | ActionOutcome::Failure { job, .. } => job,
        }
    }
}

/// Every attempted job and how its action went, sorted by variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub action: BulkAction,
    pub outcomes: Vec<ActionOutcome>,
}

impl BulkReport {
    /// Jobs whose action was accepted.
    pub fn successes(&self) -> impl Iterator<Item = &JobInfo> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ActionOutcome::Success(job) => Some(job),
            ActionOutcome::Failure { .. } => None,
        })
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.attempted() - self.success_count()
    }

    /// Number of jobs the action was run on.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Line introducing the success list, or saying nothing was eligible.
    pub fn headline(&self) -> String {
        if self.attempted() == 0 {
            return format!("No jobs were eligible to {}.", self.action.verb());
        }
        format!("{} {}:", self.action.progressive(), jobs(self.success_count()))
    }

    /// Aggregate failure line.
    pub fn failure_summary(&self) -> String {
        match self.failure_count() {
            0 => "No failures.".to_string(),
            1 => format!("1 job could not be {}.", self.action.participle()),
            n => format!("{} jobs could not be {}.", n, self.action.participle()),
        }
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.headline(), self.failure_summary())
    }
}

fn jobs(n: usize) -> String {
    if n == 1 {
        "1 job".to_string()
    } else {
        format!("{} jobs", n)
    }
}

/// Run `action` on the eligible subset of `jobs`.
pub async fn run_bulk_action(
    service: &dyn JobService,
    commit: &CommitHash,
    jobs: Vec<JobInfo>,
    action: BulkAction,
) -> BulkReport {
    let eligible = filter_eligible(service, commit, jobs, action).await;
    info!(%commit, %action, eligible = eligible.len(), "running bulk action");

    let tasks = eligible.into_iter().map(|(job, lease)| {
        let task = tokio::spawn(perform(action, job.clone(), lease));
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%commit, variant = %job.variant, error = %e, "bulk action task died");
                    ActionOutcome::Failure { job, reason: format!("action task failed: {}", e) }
                }
            }
        }
    });
    let mut outcomes = join_all(tasks).await;
    outcomes.sort_by(|a, b| a.job().variant.cmp(&b.job().variant));

    let report = BulkReport { action, outcomes };
    info!(%commit, %report, "bulk action finished");
    report
}

async fn filter_eligible(
    service: &dyn JobService,
    commit: &CommitHash,
    jobs: Vec<JobInfo>,
    action: BulkAction,
) -> Vec<(JobInfo, JobLease)> {
    let checks = jobs.into_iter().filter(|job| action.selects(&job.outcome)).map(|job| async move {
        let lease = match service.job_handle(commit, &job.variant).await {
            Ok(lease) => lease,
            Err(e) => {
                warn!(%commit, variant = %job.variant, error = %e, "skipping job: handle lookup failed");
                return None;
            }
        };
        match lease.status().await {
            Ok(snapshot) if action.permits(&snapshot) => Some((job, lease)),
            Ok(_) => {
                debug!(%commit, variant = %job.variant, %action, "skipping job: not permitted");
                None
            }
            Err(e) => {
                warn!(%commit, variant = %job.variant, error = %e, "skipping job: status check failed");
                None
            }
        }
    });
    join_all(checks).await.into_iter().flatten().collect()
}

async fn perform(action: BulkAction, job: JobInfo, lease: JobLease) -> ActionOutcome {
    let result: Result<(), RemoteError> = match action {
        BulkAction::Cancel => lease.cancel().await,
        BulkAction::RebuildFailed | BulkAction::RebuildAll => lease.rebuild().await.map(drop),
    };
    match result {
        Ok(()) => ActionOutcome::Success(job),
        Err(e) => {
            warn!(
                variant = %job.variant,
                job_ref = lease.job_ref(),
                error = %e,
                "failed to {} job",
                action.verb()
            );
            ActionOutcome::Failure { job, reason: e.to_string() }
        }
    }
}

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
