// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! civet daemon library
//!
//! Serves build status pages for commits: the status tree of a commit's
//! jobs, live job logs, and cancel/rebuild actions, all backed by the remote
//! job-execution service.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod engine;
pub mod env;
pub mod http;
pub mod lifecycle;
pub mod listener;
pub mod pages;

pub use lifecycle::{Config, LifecycleError};
pub use listener::{ListenCtx, Listener};
