// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job service for tests.
//!
//! Jobs are registered per commit with [`FakeJobService::add_job`]. Each
//! returned [`FakeJob`] serves its log in fixed-size chunks, answers status
//! and action calls with configurable results, and counts references so tests
//! can assert every handle was released exactly once.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use civet_core::{CommitHash, JobInfo, StatusSnapshot};
use parking_lot::Mutex;

use super::{JobLease, JobService, LogChunk, RemoteError, RemoteJob};

#[derive(Debug)]
struct FakeJobState {
    status: Result<StatusSnapshot, RemoteError>,
    log: Vec<u8>,
    chunk_size: usize,
    read_error_from: Option<u64>,
    cancel_result: Result<(), RemoteError>,
    rebuild_result: Result<(), RemoteError>,
    handle_error: Option<RemoteError>,
    handles_issued: usize,
    add_refs: usize,
    releases: usize,
    reads: Vec<u64>,
    status_calls: usize,
    cancels: usize,
    rebuilds: Vec<Arc<FakeJob>>,
}

/// A scripted remote job.
#[derive(Debug)]
pub struct FakeJob {
    job_ref: String,
    state: Mutex<FakeJobState>,
}

impl FakeJob {
    pub fn new(job_ref: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            job_ref: job_ref.into(),
            state: Mutex::new(FakeJobState {
                status: Ok(StatusSnapshot::default()),
                log: Vec::new(),
                chunk_size: 1024,
                read_error_from: None,
                cancel_result: Ok(()),
                rebuild_result: Ok(()),
                handle_error: None,
                handles_issued: 0,
                add_refs: 0,
                releases: 0,
                reads: Vec::new(),
                status_calls: 0,
                cancels: 0,
                rebuilds: Vec::new(),
            }),
        })
    }

    /// Hand out a lease carrying one service-counted reference.
    pub fn lease(self: &Arc<Self>) -> JobLease {
        self.state.lock().handles_issued += 1;
        JobLease::adopt(Arc::clone(self) as Arc<dyn RemoteJob>)
    }

    // ── Scripting ───────────────────────────────────────────────────────

    pub fn set_status(&self, can_cancel: bool, can_rebuild: bool) {
        self.state.lock().status = Ok(StatusSnapshot { can_cancel, can_rebuild });
    }

    pub fn fail_status(&self, err: RemoteError) {
        self.state.lock().status = Err(err);
    }

    pub fn set_log(&self, log: impl Into<Vec<u8>>) {
        self.state.lock().log = log.into();
    }

    /// Maximum bytes returned by one `read_log`.
    pub fn set_chunk_size(&self, size: usize) {
        self.state.lock().chunk_size = size.max(1);
    }

    /// Fail every `read_log` at or beyond `offset`.
    pub fn fail_reads_from(&self, offset: u64) {
        self.state.lock().read_error_from = Some(offset);
    }

    pub fn fail_cancel(&self, err: RemoteError) {
        self.state.lock().cancel_result = Err(err);
    }

    pub fn fail_rebuild(&self, err: RemoteError) {
        self.state.lock().rebuild_result = Err(err);
    }

    /// Make `job_handle` lookups of this job fail.
    pub fn fail_handle(&self, err: RemoteError) {
        self.state.lock().handle_error = Some(err);
    }

    // ── Observations ────────────────────────────────────────────────────

    pub fn handles_issued(&self) -> usize {
        self.state.lock().handles_issued
    }

    pub fn add_refs(&self) -> usize {
        self.state.lock().add_refs
    }

    pub fn releases(&self) -> usize {
        self.state.lock().releases
    }

    /// References taken minus references released.
    pub fn outstanding_refs(&self) -> isize {
        let s = self.state.lock();
        (s.handles_issued + s.add_refs) as isize - s.releases as isize
    }

    /// Offsets passed to `read_log`, in call order.
    pub fn reads(&self) -> Vec<u64> {
        self.state.lock().reads.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().status_calls
    }

    pub fn cancels(&self) -> usize {
        self.state.lock().cancels
    }

    /// Jobs created by successful `rebuild` calls.
    pub fn rebuilt(&self) -> Vec<Arc<FakeJob>> {
        self.state.lock().rebuilds.clone()
    }
}

#[async_trait]
impl RemoteJob for FakeJob {
    fn job_ref(&self) -> &str {
        &self.job_ref
    }

    async fn status(&self) -> Result<StatusSnapshot, RemoteError> {
        let mut s = self.state.lock();
        s.status_calls += 1;
        s.status.clone()
    }

    async fn read_log(&self, offset: u64) -> Result<LogChunk, RemoteError> {
        let mut s = self.state.lock();
        s.reads.push(offset);
        if s.read_error_from.is_some_and(|from| offset >= from) {
            return Err(RemoteError::Protocol("log read failed".to_string()));
        }
        let start = match usize::try_from(offset) {
            Ok(start) if start < s.log.len() => start,
            _ => return Ok(LogChunk::new(Vec::new(), offset)),
        };
        let end = start.saturating_add(s.chunk_size).min(s.log.len());
        Ok(LogChunk::new(&s.log[start..end], end as u64))
    }

    async fn cancel(&self) -> Result<(), RemoteError> {
        let mut s = self.state.lock();
        s.cancels += 1;
        s.cancel_result.clone()
    }

    async fn rebuild(&self) -> Result<JobLease, RemoteError> {
        let job = {
            let mut s = self.state.lock();
            s.rebuild_result.clone()?;
            let job = FakeJob::new(format!("{}-rebuild-{}", self.job_ref, s.rebuilds.len() + 1));
            s.rebuilds.push(Arc::clone(&job));
            job
        };
        Ok(job.lease())
    }

    fn add_ref(&self) {
        self.state.lock().add_refs += 1;
    }

    fn release(&self) {
        self.state.lock().releases += 1;
    }
}

#[derive(Debug, Default)]
struct FakeServiceState {
    jobs: HashMap<CommitHash, Vec<(JobInfo, Arc<FakeJob>)>>,
    list_error: Option<RemoteError>,
}

/// In-memory [`JobService`].
#[derive(Debug, Clone, Default)]
pub struct FakeJobService {
    state: Arc<Mutex<FakeServiceState>>,
}

impl FakeJobService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job for `commit`; its reference is `{commit}:{variant}`.
    pub fn add_job(&self, commit: &CommitHash, info: JobInfo) -> Arc<FakeJob> {
        let job = FakeJob::new(format!("{}:{}", commit, info.variant));
        self.state.lock().jobs.entry(commit.clone()).or_default().push((info, Arc::clone(&job)));
        job
    }

    pub fn job(&self, commit: &CommitHash, variant: &str) -> Option<Arc<FakeJob>> {
        let state = self.state.lock();
        let jobs = state.jobs.get(commit)?;
        jobs.iter().find(|(info, _)| info.variant == variant).map(|(_, job)| Arc::clone(job))
    }

    /// Every registered job, across commits.
    pub fn all_jobs(&self) -> Vec<Arc<FakeJob>> {
        let state = self.state.lock();
        state.jobs.values().flatten().map(|(_, job)| Arc::clone(job)).collect()
    }

    pub fn fail_list(&self, err: RemoteError) {
        self.state.lock().list_error = Some(err);
    }
}

#[async_trait]
impl JobService for FakeJobService {
    async fn list_jobs(&self, commit: &CommitHash) -> Result<Vec<JobInfo>, RemoteError> {
        let state = self.state.lock();
        if let Some(err) = &state.list_error {
            return Err(err.clone());
        }
        Ok(state
            .jobs
            .get(commit)
            .map(|jobs| jobs.iter().map(|(info, _)| info.clone()).collect())
            .unwrap_or_default())
    }

    async fn job_refs(&self, commit: &CommitHash) -> Result<BTreeSet<String>, RemoteError> {
        let state = self.state.lock();
        Ok(state
            .jobs
            .get(commit)
            .map(|jobs| jobs.iter().map(|(_, job)| job.job_ref.clone()).collect())
            .unwrap_or_default())
    }

    async fn job_handle(
        &self,
        commit: &CommitHash,
        variant: &str,
    ) -> Result<JobLease, RemoteError> {
        let job = self
            .job(commit, variant)
            .ok_or_else(|| RemoteError::NotFound(format!("{} on {}", variant, commit)))?;
        if let Some(err) = job.state.lock().handle_error.clone() {
            return Err(err);
        }
        Ok(job.lease())
    }
}
