// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::RemoteJob;

/// One counted reference to a remote job, released on drop.
///
/// Dropping happens exactly once on every path out of the owning scope,
/// including early returns, `?`, and a cancelled future, so holders never
/// call `release` themselves.
pub struct JobLease {
    job: Arc<dyn RemoteJob>,
}

impl JobLease {
    /// Take ownership of a reference the service already counted for us
    /// (the one a handle lookup or rebuild hands out).
    pub fn adopt(job: Arc<dyn RemoteJob>) -> Self {
        Self { job }
    }

    /// Take an extra reference to the same job.
    ///
    /// Used to keep a job alive past the request that resolved it, e.g. for
    /// the length of a log stream.
    pub fn retain(&self) -> Self {
        self.job.add_ref();
        Self { job: Arc::clone(&self.job) }
    }
}

impl Deref for JobLease {
    type Target = dyn RemoteJob;

    fn deref(&self) -> &Self::Target {
        self.job.as_ref()
    }
}

impl Drop for JobLease {
    fn drop(&mut self) {
        self.job.release();
    }
}

impl fmt::Debug for JobLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobLease").field("job_ref", &self.job.job_ref()).finish()
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
