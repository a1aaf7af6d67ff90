// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use civet_adapters::{FakeJobService, LogChunk, RemoteJob};
use civet_core::test_support::strategies::arb_job_outcome;
use civet_core::test_support::{job, sample_jobs};
use proptest::prelude::*;
use yare::parameterized;

use super::*;

fn commit() -> CommitHash {
    CommitHash::parse("abc123").unwrap()
}

/// Register `jobs` with every status flag set.
fn service_with(jobs: &[JobInfo]) -> FakeJobService {
    let service = FakeJobService::new();
    for info in jobs {
        service.add_job(&commit(), info.clone()).set_status(true, true);
    }
    service
}

#[parameterized(
    cancel_active = { BulkAction::Cancel, JobOutcome::Active, true },
    cancel_pending = { BulkAction::Cancel, JobOutcome::NotStarted, true },
    cancel_passed = { BulkAction::Cancel, JobOutcome::Passed, false },
    cancel_aborted = { BulkAction::Cancel, JobOutcome::Aborted, false },
    cancel_failed = { BulkAction::Cancel, JobOutcome::Failed("x".into()), false },
    cancel_undefined = { BulkAction::Cancel, JobOutcome::Undefined("?".into()), false },
    failed_failed = { BulkAction::RebuildFailed, JobOutcome::Failed("x".into()), true },
    failed_aborted = { BulkAction::RebuildFailed, JobOutcome::Aborted, true },
    failed_undefined = { BulkAction::RebuildFailed, JobOutcome::Undefined("?".into()), true },
    failed_passed = { BulkAction::RebuildFailed, JobOutcome::Passed, false },
    failed_active = { BulkAction::RebuildFailed, JobOutcome::Active, false },
    all_passed = { BulkAction::RebuildAll, JobOutcome::Passed, true },
    all_active = { BulkAction::RebuildAll, JobOutcome::Active, true },
)]
fn selection_by_outcome(action: BulkAction, outcome: JobOutcome, expected: bool) {
    assert_eq!(action.selects(&outcome), expected);
}

#[parameterized(
    cancel_allowed = { BulkAction::Cancel, true, false, true },
    cancel_denied = { BulkAction::Cancel, false, true, false },
    rebuild_allowed = { BulkAction::RebuildFailed, false, true, true },
    rebuild_denied = { BulkAction::RebuildAll, true, false, false },
)]
fn permission_by_snapshot(action: BulkAction, can_cancel: bool, can_rebuild: bool, expected: bool) {
    assert_eq!(action.permits(&StatusSnapshot { can_cancel, can_rebuild }), expected);
}

#[parameterized(
    cancel = { "cancel", Some(BulkAction::Cancel) },
    rebuild_failed = { "rebuild-failed", Some(BulkAction::RebuildFailed) },
    rebuild_all = { "rebuild-all", Some(BulkAction::RebuildAll) },
    unknown = { "rebuild", None },
)]
fn parses_route_segment(segment: &str, expected: Option<BulkAction>) {
    assert_eq!(BulkAction::parse(segment), expected);
    if let Some(action) = expected {
        assert_eq!(action.to_string(), segment);
    }
}

#[tokio::test]
async fn rebuild_failed_attempts_only_the_failed_job() {
    let service = service_with(&sample_jobs());

    let report =
        run_bulk_action(&service, &commit(), sample_jobs(), BulkAction::RebuildFailed).await;

    assert_eq!(report.attempted(), 1);
    assert_eq!(report.failure_count(), 0);
    let variants: Vec<_> = report.successes().map(|j| j.variant.as_str()).collect();
    assert_eq!(variants, vec!["a/test"]);
    assert_eq!(report.headline(), "Rebuilding 1 job:");
    assert_eq!(report.failure_summary(), "No failures.");

    let failed = service.job(&commit(), "a/test").unwrap();
    assert_eq!(failed.rebuilt().len(), 1);
    for untouched in ["a/build", "b/lint"] {
        let job = service.job(&commit(), untouched).unwrap();
        assert_eq!(job.handles_issued(), 0, "{untouched} was resolved");
        assert_eq!(job.status_calls(), 0, "{untouched} was checked");
        assert!(job.rebuilt().is_empty());
    }
}

#[tokio::test]
async fn every_handle_is_released() {
    let service = service_with(&sample_jobs());
    service.job(&commit(), "b/lint").unwrap().set_status(false, false);

    run_bulk_action(&service, &commit(), sample_jobs(), BulkAction::RebuildAll).await;

    let mut jobs = service.all_jobs();
    jobs.extend(jobs.iter().flat_map(|j| j.rebuilt()).collect::<Vec<_>>());
    assert_eq!(jobs.len(), 5);
    for job in jobs {
        assert_eq!(job.outstanding_refs(), 0, "{} leaked a reference", job.job_ref());
    }
}

#[tokio::test]
async fn cancel_counts_failures_and_skips_unreachable_jobs() {
    let jobs = vec![
        job("linux/build", JobOutcome::Active),
        job("linux/test", JobOutcome::NotStarted),
        job("mac/build", JobOutcome::Active),
        job("mac/test", JobOutcome::Active),
        job("win/build", JobOutcome::Passed),
    ];
    let service = service_with(&jobs);
    let c = commit();
    service.job(&c, "linux/test").unwrap().fail_cancel(RemoteError::Timeout);
    service.job(&c, "mac/build").unwrap().fail_status(RemoteError::Protocol("down".into()));
    service.job(&c, "mac/test").unwrap().fail_handle(RemoteError::NotFound("gone".into()));

    let report = run_bulk_action(&service, &c, jobs, BulkAction::Cancel).await;

    assert_eq!(report.attempted(), 2);
    assert_eq!(
        report.outcomes,
        vec![
            ActionOutcome::Success(job("linux/build", JobOutcome::Active)),
            ActionOutcome::Failure {
                job: job("linux/test", JobOutcome::NotStarted),
                reason: "remote call timed out".to_string(),
            },
        ]
    );
    assert_eq!(report.headline(), "Cancelling 1 job:");
    assert_eq!(report.failure_summary(), "1 job could not be cancelled.");
    assert_eq!(service.job(&c, "mac/build").unwrap().cancels(), 0);
    assert_eq!(service.job(&c, "win/build").unwrap().cancels(), 0);
    assert_eq!(service.job(&c, "mac/build").unwrap().outstanding_refs(), 0);
}

#[tokio::test]
async fn nothing_eligible_is_reported_explicitly() {
    let jobs = vec![job("a/build", JobOutcome::Passed)];
    let service = service_with(&jobs);

    let report = run_bulk_action(&service, &commit(), jobs, BulkAction::Cancel).await;

    assert_eq!(report.attempted(), 0);
    assert_eq!(report.headline(), "No jobs were eligible to cancel.");
}

#[parameterized(
    none = { 0, "No failures." },
    one = { 1, "1 job could not be rebuilt." },
    several = { 3, "3 jobs could not be rebuilt." },
)]
fn failure_summary_is_pluralized(failures: usize, expected: &str) {
    let outcomes = (0..failures)
        .map(|i| ActionOutcome::Failure {
            job: job(&format!("v{i}"), JobOutcome::Aborted),
            reason: "no".to_string(),
        })
        .collect();
    let report = BulkReport { action: BulkAction::RebuildAll, outcomes };
    assert_eq!(report.failure_summary(), expected);
    assert_eq!(report.success_count(), 0);
}

#[test]
fn headline_pluralizes_successes() {
    let outcomes = vec![
        ActionOutcome::Success(job("a", JobOutcome::Active)),
        ActionOutcome::Success(job("b", JobOutcome::Active)),
    ];
    let report = BulkReport { action: BulkAction::Cancel, outcomes };
    assert_eq!(report.headline(), "Cancelling 2 jobs:");
}

/// Job whose cancel panics when `explode` is set; counts releases.
struct ExplodingJob {
    name: String,
    explode: bool,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteJob for ExplodingJob {
    fn job_ref(&self) -> &str {
        &self.name
    }

    async fn status(&self) -> Result<StatusSnapshot, RemoteError> {
        Ok(StatusSnapshot { can_cancel: true, can_rebuild: true })
    }

    async fn read_log(&self, offset: u64) -> Result<LogChunk, RemoteError> {
        Ok(LogChunk { data: Vec::new(), next_offset: offset })
    }

    async fn cancel(&self) -> Result<(), RemoteError> {
        if self.explode {
            panic!("cancel blew up");
        }
        Ok(())
    }

    async fn rebuild(&self) -> Result<JobLease, RemoteError> {
        Err(RemoteError::Protocol("unsupported".into()))
    }

    fn add_ref(&self) {}

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

struct ExplodingService {
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl JobService for ExplodingService {
    async fn list_jobs(&self, _commit: &CommitHash) -> Result<Vec<JobInfo>, RemoteError> {
        Ok(Vec::new())
    }

    async fn job_refs(&self, _commit: &CommitHash) -> Result<BTreeSet<String>, RemoteError> {
        Ok(BTreeSet::new())
    }

    async fn job_handle(
        &self,
        _commit: &CommitHash,
        variant: &str,
    ) -> Result<JobLease, RemoteError> {
        Ok(JobLease::adopt(Arc::new(ExplodingJob {
            name: variant.to_string(),
            explode: variant == "boom",
            released: Arc::clone(&self.released),
        })))
    }
}

#[tokio::test]
async fn panicking_action_still_counts_as_one_failure() {
    let released = Arc::new(AtomicUsize::new(0));
    let service = ExplodingService { released: Arc::clone(&released) };
    let jobs = vec![job("boom", JobOutcome::Active), job("fine", JobOutcome::Active)];

    let report = run_bulk_action(&service, &commit(), jobs, BulkAction::Cancel).await;

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.failure_count(), 1);
    match &report.outcomes[0] {
        ActionOutcome::Failure { job, reason } => {
            assert_eq!(job.variant, "boom");
            assert!(reason.starts_with("action task failed"), "got: {reason}");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(report.successes().map(|j| j.variant.as_str()).collect::<Vec<_>>(), vec!["fine"]);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[derive(Debug, Clone)]
struct Scripted {
    outcome: JobOutcome,
    can_cancel: bool,
    can_rebuild: bool,
    status_fails: bool,
    action_fails: bool,
}

fn arb_scripted() -> impl Strategy<Value = Scripted> {
    (arb_job_outcome(), any::<bool>(), any::<bool>(), prop::bool::weighted(0.2), any::<bool>())
        .prop_map(|(outcome, can_cancel, can_rebuild, status_fails, action_fails)| Scripted {
            outcome,
            can_cancel,
            can_rebuild,
            status_fails,
            action_fails,
        })
}

fn arb_action() -> impl Strategy<Value = BulkAction> {
    prop_oneof![
        Just(BulkAction::Cancel),
        Just(BulkAction::RebuildFailed),
        Just(BulkAction::RebuildAll),
    ]
}

proptest! {
    #[test]
    fn accounting_matches_attempted_jobs(
        scripted in prop::collection::vec(arb_scripted(), 0..12),
        action in arb_action(),
    ) {
        let c = commit();
        let service = FakeJobService::new();
        let mut jobs = Vec::new();
        let mut expected_attempts = 0;
        for (i, s) in scripted.iter().enumerate() {
            let info = job(&format!("v{i:02}"), s.outcome.clone());
            let fake = service.add_job(&c, info.clone());
            fake.set_status(s.can_cancel, s.can_rebuild);
            if s.status_fails {
                fake.fail_status(RemoteError::Timeout);
            }
            if s.action_fails {
                fake.fail_cancel(RemoteError::Protocol("no".into()));
                fake.fail_rebuild(RemoteError::Protocol("no".into()));
            }
            let snapshot = StatusSnapshot { can_cancel: s.can_cancel, can_rebuild: s.can_rebuild };
            if action.selects(&s.outcome) && !s.status_fails && action.permits(&snapshot) {
                expected_attempts += 1;
            }
            jobs.push(info);
        }

        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let report = rt.block_on(run_bulk_action(&service, &c, jobs, action));

        prop_assert_eq!(report.attempted(), expected_attempts);
        prop_assert_eq!(report.success_count() + report.failure_count(), expected_attempts);
        for success in report.successes() {
            prop_assert!(action.selects(&success.outcome));
        }
        let variants: Vec<_> = report.outcomes.iter().map(|o| o.job().variant.clone()).collect();
        let mut sorted = variants.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(variants, sorted);
        for fake in service.all_jobs() {
            prop_assert_eq!(fake.outstanding_refs(), 0);
        }
    }
}
