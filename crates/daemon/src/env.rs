// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Address the HTTP front listens on (`CIVET_LISTEN`).
pub fn listen_addr() -> String {
    std::env::var("CIVET_LISTEN")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "127.0.0.1:8080".to_string())
}

/// `host:port` of the job-execution service. Required.
pub fn remote_addr() -> Result<String, LifecycleError> {
    std::env::var("CIVET_REMOTE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(LifecycleError::MissingVar("CIVET_REMOTE"))
}

/// URL prefix the daemon is mounted under, normalized to either `""` or
/// `/prefix` without a trailing slash.
pub fn base_path() -> String {
    std::env::var("CIVET_BASE_PATH").map(|s| normalize_base_path(&s)).unwrap_or_default()
}

pub(crate) fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Per-call timeout for the job service transport
pub fn remote_timeout() -> Duration {
    duration_ms("CIVET_REMOTE_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Time allowed to read an inbound request head
pub fn request_timeout() -> Duration {
    duration_ms("CIVET_REQUEST_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Directory for `civetd.log`. Logs go to stderr when unset.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("CIVET_LOG_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
