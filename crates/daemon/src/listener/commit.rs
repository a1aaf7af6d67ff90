// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit-level handlers: lookup, status tree page, bulk actions.

use civet_core::CommitHash;
use tracing::warn;

use super::ListenCtx;
use crate::engine::{run_bulk_action, BulkAction};
use crate::http::Response;
use crate::pages;

/// Redirect the index form to the commit page.
pub(super) fn lookup(ctx: &ListenCtx, raw: &str) -> Response {
    match CommitHash::parse(raw) {
        Ok(commit) => Response::redirect(pages::commit_url(&ctx.base_path, &commit)),
        Err(e) => ctx.error_response(400, &format!("invalid commit: {}", e)),
    }
}

pub(super) async fn show(ctx: &ListenCtx, commit: &CommitHash) -> Response {
    let (jobs, refs) =
        tokio::join!(ctx.service.list_jobs(commit), ctx.service.job_refs(commit));
    match (jobs, refs) {
        (Ok(jobs), Ok(refs)) => {
            Response::html(200, pages::commit_page(&ctx.base_path, commit, &jobs, refs.len()))
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(%commit, error = %e, "failed to list jobs");
            ctx.error_response(500, &e.to_string())
        }
    }
}

pub(super) async fn bulk(ctx: &ListenCtx, commit: &CommitHash, action: BulkAction) -> Response {
    let jobs = match ctx.service.list_jobs(commit).await {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!(%commit, %action, error = %e, "failed to list jobs");
            return ctx.error_response(500, &e.to_string());
        }
    };
    let report = run_bulk_action(ctx.service.as_ref(), commit, jobs, action).await;
    Response::html(200, pages::bulk_page(&ctx.base_path, commit, &report))
}
