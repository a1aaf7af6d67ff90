// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-scoped operations on remote jobs: streaming one job's log and
//! fanning an action out over a commit's jobs.

pub mod bulk;
pub mod stream;

pub use bulk::{run_bulk_action, ActionOutcome, BulkAction, BulkReport};
pub use stream::{stream_log, LogPage, StreamEnd};
