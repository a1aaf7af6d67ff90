// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{JobInfo, JobOutcome, VariantPath};

// ── Proptest strategies ─────────────────────────────────────────────────

pub mod strategies {
    use crate::{JobOutcome, VariantPath};
    use proptest::prelude::*;

    /// Short segments from a tiny alphabet so generated paths share prefixes.
    pub fn arb_segment() -> impl Strategy<Value = String> {
        "[abc]{1,2}"
    }

    pub fn arb_variant_path() -> impl Strategy<Value = VariantPath> {
        prop::collection::vec(arb_segment(), 1..4).prop_filter_map("valid variant", |segs| {
            VariantPath::parse(&segs.join("/")).ok()
        })
    }

    pub fn arb_job_outcome() -> impl Strategy<Value = JobOutcome> {
        prop_oneof![
            Just(JobOutcome::NotStarted),
            Just(JobOutcome::Active),
            Just(JobOutcome::Passed),
            Just(JobOutcome::Aborted),
            "[a-z ]{0,8}".prop_map(JobOutcome::Failed),
            Just(JobOutcome::Failed("[SKIP] not applicable".to_string())),
            "[a-z]{1,6}".prop_map(JobOutcome::Undefined),
        ]
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

pub fn variant(raw: &str) -> VariantPath {
    match VariantPath::parse(raw) {
        Ok(v) => v,
        Err(e) => unreachable!("fixture variant {:?} is invalid: {}", raw, e),
    }
}

pub fn job(variant: &str, outcome: JobOutcome) -> JobInfo {
    JobInfo::new(variant, outcome)
}

/// The three-job commit used across daemon scenarios.
pub fn sample_jobs() -> Vec<JobInfo> {
    vec![
        job("a/build", JobOutcome::Passed),
        job("a/test", JobOutcome::Failed("boom".to_string())),
        job("b/lint", JobOutcome::Active),
    ]
}
