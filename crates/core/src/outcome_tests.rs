// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    not_started = { JobOutcome::NotStarted,                    StatusClass::Pending },
    active      = { JobOutcome::Active,                        StatusClass::Running },
    passed      = { JobOutcome::Passed,                        StatusClass::Passed },
    aborted     = { JobOutcome::Aborted,                       StatusClass::Aborted },
    failed      = { JobOutcome::Failed("boom".into()),         StatusClass::Failed },
    skipped     = { JobOutcome::Failed("[SKIP] no gpu".into()), StatusClass::Skipped },
    skip_inside = { JobOutcome::Failed("oops [SKIP]".into()),  StatusClass::Failed },
    undefined   = { JobOutcome::Undefined("weird".into()),     StatusClass::Undefined },
)]
fn classifies(outcome: JobOutcome, expected: StatusClass) {
    assert_eq!(outcome.class(), expected);
}

#[test]
fn skip_classification_keeps_failed_outcome() {
    let outcome = JobOutcome::Failed("[SKIP] disabled".to_string());
    assert_eq!(outcome.class(), StatusClass::Skipped);
    assert!(outcome.is_unsuccessful());
    assert_eq!(outcome.detail(), Some("[SKIP] disabled"));
}

#[yare::parameterized(
    not_started = { JobOutcome::NotStarted,            true,  false },
    active      = { JobOutcome::Active,                true,  false },
    passed      = { JobOutcome::Passed,                false, false },
    aborted     = { JobOutcome::Aborted,               false, true },
    failed      = { JobOutcome::Failed("x".into()),    false, true },
    undefined   = { JobOutcome::Undefined("?".into()), false, true },
)]
fn predicates(outcome: JobOutcome, pending: bool, unsuccessful: bool) {
    assert_eq!(outcome.is_active_or_pending(), pending);
    assert_eq!(outcome.is_unsuccessful(), unsuccessful);
}

#[test]
fn outcome_json_shape() {
    let json = serde_json::to_string(&JobOutcome::Failed("boom".into())).unwrap();
    assert_eq!(json, r#"{"state":"failed","detail":"boom"}"#);

    let parsed: JobOutcome = serde_json::from_str(r#"{"state":"not_started"}"#).unwrap();
    assert_eq!(parsed, JobOutcome::NotStarted);
}

#[test]
fn job_info_deserializes() {
    let info: JobInfo =
        serde_json::from_str(r#"{"variant":"a/test","outcome":{"state":"active"}}"#).unwrap();
    assert_eq!(info, JobInfo::new("a/test", JobOutcome::Active));
}

#[test]
fn status_class_display() {
    assert_eq!(StatusClass::Skipped.to_string(), "skipped");
    assert_eq!(StatusClass::Running.to_string(), "running");
}
