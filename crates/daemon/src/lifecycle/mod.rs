// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration and startup.

mod startup;
pub use startup::{bind, startup};

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::env;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP front binds to
    pub listen_addr: String,
    /// `host:port` of the job-execution service
    pub remote_addr: String,
    /// URL prefix stripped before routing and prepended to links
    pub base_path: String,
    /// Per-call timeout of the job service transport
    pub remote_timeout: Duration,
    /// Time allowed to read an inbound request head
    pub request_timeout: Duration,
    /// Directory for `civetd.log`, stderr when unset
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self {
            listen_addr: env::listen_addr(),
            remote_addr: env::remote_addr()?,
            base_path: env::base_path(),
            remote_timeout: env::remote_timeout(),
            request_timeout: env::request_timeout(),
            log_dir: env::log_dir(),
        })
    }
}

/// Errors that stop the daemon from starting
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
