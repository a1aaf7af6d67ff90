// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: connect the job service and bind the HTTP listener.

use std::sync::Arc;

use civet_adapters::{HttpJobService, JobService};
use tokio::net::TcpListener;
use tracing::info;

use crate::listener::{ListenCtx, Listener};

use super::{Config, LifecycleError};

/// Start the daemon against the configured job service.
pub async fn startup(config: &Config) -> Result<Listener, LifecycleError> {
    let service = HttpJobService::new(config.remote_addr.clone(), config.remote_timeout);
    info!(remote = %config.remote_addr, "using job service");
    bind(config, Arc::new(service)).await
}

/// Bind the HTTP listener with an explicit job service.
pub async fn bind(
    config: &Config,
    service: Arc<dyn JobService>,
) -> Result<Listener, LifecycleError> {
    let tcp = TcpListener::bind(&config.listen_addr).await.map_err(|source| {
        LifecycleError::BindFailed { addr: config.listen_addr.clone(), source }
    })?;
    let ctx = ListenCtx {
        service,
        base_path: config.base_path.clone(),
        request_timeout: config.request_timeout,
    };
    Ok(Listener::new(tcp, Arc::new(ctx)))
}
