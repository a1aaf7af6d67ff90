// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `JobService` over the job service's HTTP/JSON API.
//!
//! The service counts one reference per handle it hands out. Locally, all
//! leases of one handle share an `HttpJob` whose counter starts at that one
//! reference; when the last local reference goes away a single `release`
//! call is sent.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use civet_core::{CommitHash, JobInfo, StatusSnapshot};
use serde::Deserialize;
use tracing::{debug, warn};
use urlencoding::encode;

use super::http::HttpClient;
use super::{JobLease, JobService, LogChunk, RemoteError, RemoteJob};

/// Header carrying the offset to continue reading from.
const NEXT_OFFSET_HEADER: &str = "X-Next-Offset";

#[derive(Debug, Deserialize)]
struct HandleReply {
    #[serde(rename = "ref")]
    job_ref: String,
}

/// Job service reached over TCP at `addr`.
#[derive(Debug, Clone)]
pub struct HttpJobService {
    client: HttpClient,
}

impl HttpJobService {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { client: HttpClient::new(addr, timeout) }
    }

    fn adopt(&self, job_ref: String) -> JobLease {
        JobLease::adopt(Arc::new(HttpJob::new(self.client.clone(), job_ref)))
    }
}

#[async_trait]
impl JobService for HttpJobService {
    async fn list_jobs(&self, commit: &CommitHash) -> Result<Vec<JobInfo>, RemoteError> {
        self.client.get(&format!("/commits/{}/jobs", commit)).await?.json()
    }

    async fn job_refs(&self, commit: &CommitHash) -> Result<BTreeSet<String>, RemoteError> {
        let refs: Vec<String> = self.client.get(&format!("/commits/{}/refs", commit)).await?.json()?;
        Ok(refs.into_iter().collect())
    }

    async fn job_handle(
        &self,
        commit: &CommitHash,
        variant: &str,
    ) -> Result<JobLease, RemoteError> {
        let path = format!("/commits/{}/variants/{}/handle", commit, encode(variant));
        let reply: HandleReply = self.client.post(&path, "{}").await?.json()?;
        debug!(commit = %commit, variant, job_ref = %reply.job_ref, "acquired job handle");
        Ok(self.adopt(reply.job_ref))
    }
}

/// One handle on the service, shared by all local leases of it.
struct HttpJob {
    client: HttpClient,
    job_ref: String,
    refs: AtomicUsize,
}

impl HttpJob {
    fn new(client: HttpClient, job_ref: String) -> Self {
        Self { client, job_ref, refs: AtomicUsize::new(1) }
    }

    fn path(&self, action: &str) -> String {
        format!("/jobs/{}/{}", encode(&self.job_ref), action)
    }
}

#[async_trait]
impl RemoteJob for HttpJob {
    fn job_ref(&self) -> &str {
        &self.job_ref
    }

    async fn status(&self) -> Result<StatusSnapshot, RemoteError> {
        self.client.get(&self.path("status")).await?.json()
    }

    async fn read_log(&self, offset: u64) -> Result<LogChunk, RemoteError> {
        let reply = self.client.get(&format!("{}?offset={}", self.path("log"), offset)).await?;
        let next_offset = reply
            .header(NEXT_OFFSET_HEADER)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                RemoteError::Protocol(format!("log reply is missing {}", NEXT_OFFSET_HEADER))
            })?;
        Ok(LogChunk { data: reply.body, next_offset })
    }

    async fn cancel(&self) -> Result<(), RemoteError> {
        self.client.post(&self.path("cancel"), "{}").await?;
        Ok(())
    }

    async fn rebuild(&self) -> Result<JobLease, RemoteError> {
        let reply: HandleReply = self.client.post(&self.path("rebuild"), "{}").await?.json()?;
        debug!(job_ref = %self.job_ref, new_ref = %reply.job_ref, "rebuild accepted");
        Ok(JobLease::adopt(Arc::new(HttpJob::new(self.client.clone(), reply.job_ref))))
    }

    fn add_ref(&self) {
        self.refs.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        if self.refs.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        let client = self.client.clone();
        let path = self.path("release");
        let job_ref = self.job_ref.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = client.post(&path, "{}").await {
                        warn!(job_ref = %job_ref, error = %e, "failed to release job handle");
                    }
                });
            }
            Err(_) => warn!(job_ref = %job_ref, "no runtime to release job handle on"),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
