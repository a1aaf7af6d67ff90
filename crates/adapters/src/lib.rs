// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for reaching jobs on the remote job-execution service.

pub mod remote;

pub use remote::{HttpJobService, JobLease, JobService, LogChunk, RemoteError, RemoteJob};

#[cfg(any(test, feature = "test-support"))]
pub use remote::{FakeJob, FakeJobService};
