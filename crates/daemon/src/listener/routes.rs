// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! URL routing.
//!
//! ```text
//! GET  /                                        index (?commit= redirects)
//! GET  /commit/{hash}                           status tree
//! POST /commit/{hash}/{cancel|rebuild-failed|rebuild-all}
//! GET  /commit/{hash}/variant/{variant}         streamed log
//! POST /commit/{hash}/variant/{variant}/{rebuild|cancel}
//! ```
//!
//! `{variant}` is a single percent-encoded segment, so a variant's own
//! separators arrive as `%2F`.

use civet_core::{CommitError, CommitHash};
use thiserror::Error;

use crate::engine::BulkAction;
use crate::http::{Method, Request};

/// Action on a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobAction {
    Cancel,
    Rebuild,
}

civet_core::simple_display! {
    JobAction {
        Cancel => "cancel",
        Rebuild => "rebuild",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Index,
    /// Index form submission with the raw `commit` field.
    Lookup(String),
    Commit(CommitHash),
    Bulk { commit: CommitHash, action: BulkAction },
    Variant { commit: CommitHash, variant: String },
    VariantAction { commit: CommitHash, variant: String, action: JobAction },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RouteError {
    #[error("no such page: {0}")]
    NotFound(String),

    #[error("method not allowed, use {0}")]
    MethodNotAllowed(&'static str),

    #[error("invalid commit: {0}")]
    BadCommit(#[from] CommitError),

    #[error("invalid variant segment: {0}")]
    BadVariant(String),
}

impl RouteError {
    pub(crate) fn status(&self) -> u16 {
        match self {
            RouteError::NotFound(_) => 404,
            RouteError::MethodNotAllowed(_) => 405,
            RouteError::BadCommit(_) | RouteError::BadVariant(_) => 400,
        }
    }
}

/// Resolve a request against the routes mounted under `base`.
pub(crate) fn route(req: &Request, base: &str) -> Result<Route, RouteError> {
    let not_found = || RouteError::NotFound(req.path.clone());
    let path = strip_base(&req.path, base).ok_or_else(not_found)?;

    let mut segments: Vec<&str> = path.split('/').skip(1).collect();
    if segments.len() > 1 && segments.last() == Some(&"") {
        segments.pop();
    }

    match segments.as_slice() {
        [""] => {
            expect_method(req, Method::Get, "GET")?;
            Ok(match req.query_param("commit") {
                Some(raw) if !raw.trim().is_empty() => Route::Lookup(raw),
                _ => Route::Index,
            })
        }
        ["commit", hash] => {
            expect_method(req, Method::Get, "GET")?;
            Ok(Route::Commit(CommitHash::parse(hash)?))
        }
        ["commit", hash, action] => {
            let action = BulkAction::parse(action).ok_or_else(not_found)?;
            expect_method(req, Method::Post, "POST")?;
            Ok(Route::Bulk { commit: CommitHash::parse(hash)?, action })
        }
        ["commit", hash, "variant", variant] => {
            expect_method(req, Method::Get, "GET")?;
            Ok(Route::Variant { commit: CommitHash::parse(hash)?, variant: decode(variant)? })
        }
        ["commit", hash, "variant", variant, action] => {
            let action = match *action {
                "rebuild" => JobAction::Rebuild,
                "cancel" => JobAction::Cancel,
                _ => return Err(not_found()),
            };
            expect_method(req, Method::Post, "POST")?;
            Ok(Route::VariantAction {
                commit: CommitHash::parse(hash)?,
                variant: decode(variant)?,
                action,
            })
        }
        _ => Err(not_found()),
    }
}

/// Path relative to `base`, always starting with `/`.
fn strip_base<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return path.starts_with('/').then_some(path);
    }
    let rest = path.strip_prefix(base)?;
    match rest {
        "" => Some("/"),
        _ if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

fn expect_method(req: &Request, method: Method, name: &'static str) -> Result<(), RouteError> {
    if req.method == method {
        Ok(())
    } else {
        Err(RouteError::MethodNotAllowed(name))
    }
}

fn decode(segment: &str) -> Result<String, RouteError> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| RouteError::BadVariant(segment.to_string()))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
