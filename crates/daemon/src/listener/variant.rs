// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variant handlers: the streamed log view and single-job actions.

use civet_adapters::{JobLease, JobService, LogChunk, RemoteError};
use civet_core::{CommitHash, StatusSnapshot};
use tokio::io::AsyncWrite;
use tracing::{debug, info, warn};

use super::routes::JobAction;
use super::{ConnectionError, ListenCtx};
use crate::engine::{stream_log, LogPage};
use crate::http::{self, ChunkedWriter, Response};
use crate::pages;

const HTML: &str = "text/html; charset=utf-8";

/// Stream a job's log page.
///
/// Everything that can fail before the first byte (handle lookup, status,
/// first log read) is answered with a plain error page. After the head is
/// sent, failures end up in the body.
pub(super) async fn stream<W>(
    ctx: &ListenCtx,
    commit: &CommitHash,
    variant: &str,
    writer: &mut W,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Unpin + Send,
{
    let (request_lease, snapshot, first) = match open(ctx.service.as_ref(), commit, variant).await
    {
        Ok(opened) => opened,
        Err(e) => {
            warn!(%commit, variant, error = %e, "cannot open log");
            http::write_response(writer, &ctx.error_response(500, &e.to_string())).await?;
            return Ok(());
        }
    };

    http::write_stream_head(writer, HTML).await?;

    // The stream holds its own reference; the request's goes away here.
    let lease = request_lease.retain();
    drop(request_lease);

    let page = LogPage {
        prologue: pages::log_prologue(&ctx.base_path, commit, variant, &snapshot),
        epilogue: pages::log_epilogue(&ctx.base_path, commit, variant, &snapshot),
    };
    let mut out = ChunkedWriter::new(writer);
    let end = stream_log(lease, &mut out, page, first).await;
    debug!(%commit, variant, ?end, "log stream ended");
    Ok(())
}

async fn open(
    service: &dyn JobService,
    commit: &CommitHash,
    variant: &str,
) -> Result<(JobLease, StatusSnapshot, LogChunk), RemoteError> {
    let lease = service.job_handle(commit, variant).await?;
    let snapshot = lease.status().await?;
    let first = lease.read_log(0).await?;
    Ok((lease, snapshot, first))
}

/// Run a single-job action and redirect back to the job's log.
pub(super) async fn act(
    ctx: &ListenCtx,
    commit: &CommitHash,
    variant: &str,
    action: JobAction,
) -> Response {
    match run_action(ctx.service.as_ref(), commit, variant, action).await {
        Ok(()) => {
            info!(%commit, variant, %action, "job action accepted");
            Response::redirect(pages::variant_url(&ctx.base_path, commit, variant))
        }
        Err(e) => {
            warn!(%commit, variant, %action, error = %e, "job action failed");
            ctx.error_response(500, &e.to_string())
        }
    }
}

async fn run_action(
    service: &dyn JobService,
    commit: &CommitHash,
    variant: &str,
    action: JobAction,
) -> Result<(), RemoteError> {
    let lease = service.job_handle(commit, variant).await?;
    match action {
        JobAction::Cancel => lease.cancel().await,
        JobAction::Rebuild => lease.rebuild().await.map(drop),
    }
}
