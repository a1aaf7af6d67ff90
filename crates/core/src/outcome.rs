// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job outcomes and status snapshots as reported by the job service.

use serde::{Deserialize, Serialize};

/// Failure messages starting with this marker are displayed as skipped.
pub const SKIP_MARKER: &str = "[SKIP]";

/// Last-known outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum JobOutcome {
    NotStarted,
    Active,
    Passed,
    Aborted,
    Failed(String),
    /// Outcome the service reported in a form we do not understand.
    Undefined(String),
}

impl JobOutcome {
    /// Still queued or running: the only outcomes a cancel can apply to.
    pub fn is_active_or_pending(&self) -> bool {
        matches!(self, JobOutcome::NotStarted | JobOutcome::Active)
    }

    /// Finished without passing (aborted, failed, or unknown).
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self, JobOutcome::Aborted | JobOutcome::Failed(_) | JobOutcome::Undefined(_))
    }

    /// Display classification. A `[SKIP]` failure is classed as skipped
    /// without changing the outcome itself.
    pub fn class(&self) -> StatusClass {
        match self {
            JobOutcome::NotStarted => StatusClass::Pending,
            JobOutcome::Active => StatusClass::Running,
            JobOutcome::Passed => StatusClass::Passed,
            JobOutcome::Aborted => StatusClass::Aborted,
            JobOutcome::Failed(msg) if msg.starts_with(SKIP_MARKER) => StatusClass::Skipped,
            JobOutcome::Failed(_) => StatusClass::Failed,
            JobOutcome::Undefined(_) => StatusClass::Undefined,
        }
    }

    /// Message attached to the outcome, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            JobOutcome::Failed(msg) | JobOutcome::Undefined(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Display category of a job, used as a CSS class on rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Pending,
    Running,
    Passed,
    Aborted,
    Failed,
    Skipped,
    Undefined,
}

crate::simple_display! {
    StatusClass {
        Pending => "pending",
        Running => "running",
        Passed => "passed",
        Aborted => "aborted",
        Failed => "failed",
        Skipped => "skipped",
        Undefined => "undefined",
    }
}

/// One entry of a commit's job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Raw segmented identifier; parsed with [`crate::VariantPath::parse`].
    pub variant: String,
    pub outcome: JobOutcome,
}

impl JobInfo {
    pub fn new(variant: impl Into<String>, outcome: JobOutcome) -> Self {
        Self { variant: variant.into(), outcome }
    }
}

/// Point-in-time cancel/rebuild eligibility of one job.
///
/// Fetched once per request and treated as stable for that request, even
/// though the job may change state on the remote side meanwhile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub can_cancel: bool,
    pub can_rebuild: bool,
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
