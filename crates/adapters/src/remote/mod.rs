// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote job handles
//!
//! The job-execution service owns the jobs; the daemon only ever sees them
//! through reference-counted handles. A handle stays valid while at least one
//! reference is held, so every reference must be released exactly once.
//! [`JobLease`] is the only type that holds references: constructing one
//! takes a reference, dropping it releases that reference.
//!
//! ```text
//! JobService ── list_jobs(commit) ──> [JobInfo]
//!      │
//!      └── job_handle(commit, variant) ──> JobLease ──> dyn RemoteJob
//!                                             │
//!                                             └── retain() ──> JobLease (extra ref)
//! ```

mod http;
mod lease;
mod service;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJob, FakeJobService};

pub use lease::JobLease;
pub use service::HttpJobService;

use async_trait::async_trait;
use civet_core::{CommitHash, JobInfo, StatusSnapshot};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from remote job service calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("remote call timed out")]
    Timeout,
}

/// One range of log bytes and the offset to continue from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogChunk {
    pub data: Vec<u8>,
    pub next_offset: u64,
}

impl LogChunk {
    pub fn new(data: impl Into<Vec<u8>>, next_offset: u64) -> Self {
        Self { data: data.into(), next_offset }
    }

    /// No bytes were available at the requested offset.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A live job on the remote service.
///
/// Implementations count references through `add_ref`/`release`; callers
/// never invoke those directly and go through [`JobLease`] instead.
#[async_trait]
pub trait RemoteJob: Send + Sync + 'static {
    /// Service-side identity of this job (for logging).
    fn job_ref(&self) -> &str;

    /// Fetch the job's current cancel/rebuild eligibility.
    async fn status(&self) -> Result<StatusSnapshot, RemoteError>;

    /// Read log bytes starting at `offset`.
    ///
    /// Returns an empty chunk with `next_offset == offset` when nothing
    /// further is available yet.
    async fn read_log(&self, offset: u64) -> Result<LogChunk, RemoteError>;

    /// Ask the service to cancel the job.
    async fn cancel(&self) -> Result<(), RemoteError>;

    /// Start a new job for the same variant; resolves once the new job's
    /// reference has settled, not when the rebuild finishes.
    async fn rebuild(&self) -> Result<JobLease, RemoteError>;

    /// Take one additional reference.
    fn add_ref(&self);

    /// Drop one reference.
    fn release(&self);
}

/// Lookup of jobs by commit.
#[async_trait]
pub trait JobService: Send + Sync + 'static {
    /// All jobs recorded for a commit, in the service's order.
    async fn list_jobs(&self, commit: &CommitHash) -> Result<Vec<JobInfo>, RemoteError>;

    /// Service references of the commit's live jobs.
    async fn job_refs(&self, commit: &CommitHash) -> Result<BTreeSet<String>, RemoteError>;

    /// Resolve one job; the returned lease owns the handle's initial reference.
    async fn job_handle(&self, commit: &CommitHash, variant: &str)
        -> Result<JobLease, RemoteError>;
}
