// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn request(method: Method, target: &str) -> Request {
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (target.to_string(), None),
    };
    Request { method, path, query, headers: Vec::new() }
}

fn get(target: &str) -> Result<Route, RouteError> {
    route(&request(Method::Get, target), "")
}

fn post(target: &str) -> Result<Route, RouteError> {
    route(&request(Method::Post, target), "")
}

fn hash() -> CommitHash {
    CommitHash::parse("abc123").unwrap()
}

#[test]
fn index_and_lookup() {
    assert_eq!(get("/"), Ok(Route::Index));
    assert_eq!(get("/?commit="), Ok(Route::Index));
    assert_eq!(get("/?commit=ABC123"), Ok(Route::Lookup("ABC123".to_string())));
}

#[test]
fn commit_page() {
    assert_eq!(get("/commit/abc123"), Ok(Route::Commit(hash())));
    assert_eq!(get("/commit/abc123/"), Ok(Route::Commit(hash())));
}

#[test]
fn variant_segment_is_percent_decoded() {
    assert_eq!(
        get("/commit/abc123/variant/linux%2Fx86%2064"),
        Ok(Route::Variant { commit: hash(), variant: "linux/x86 64".to_string() })
    );
}

#[parameterized(
    rebuild = { "rebuild", JobAction::Rebuild },
    cancel = { "cancel", JobAction::Cancel },
)]
fn variant_actions(segment: &str, action: JobAction) {
    assert_eq!(
        post(&format!("/commit/abc123/variant/a%2Ftest/{segment}")),
        Ok(Route::VariantAction { commit: hash(), variant: "a/test".to_string(), action })
    );
    assert_eq!(action.to_string(), segment);
}

#[parameterized(
    cancel = { "cancel", BulkAction::Cancel },
    rebuild_failed = { "rebuild-failed", BulkAction::RebuildFailed },
    rebuild_all = { "rebuild-all", BulkAction::RebuildAll },
)]
fn bulk_actions(segment: &str, action: BulkAction) {
    assert_eq!(
        post(&format!("/commit/abc123/{segment}")),
        Ok(Route::Bulk { commit: hash(), action })
    );
}

#[parameterized(
    unknown_top = { "/jobs" },
    unknown_action = { "/commit/abc123/restart" },
    unknown_variant_action = { "/commit/abc123/variant/a/retry" },
    empty_variant = { "/commit/abc123/variant/" },
    too_deep = { "/commit/abc123/variant/a/rebuild/now" },
)]
fn unknown_paths_are_not_found(path: &str) {
    assert!(matches!(get(path), Err(RouteError::NotFound(_))));
    assert!(matches!(post(path), Err(RouteError::NotFound(_))));
}

#[test]
fn wrong_method_on_known_route() {
    assert_eq!(post("/commit/abc123"), Err(RouteError::MethodNotAllowed("GET")));
    assert_eq!(get("/commit/abc123/rebuild-all"), Err(RouteError::MethodNotAllowed("POST")));
    assert_eq!(
        get("/commit/abc123/variant/a/rebuild"),
        Err(RouteError::MethodNotAllowed("POST"))
    );
    let other = route(&request(Method::Other("PUT".to_string()), "/"), "");
    assert_eq!(other.map_err(|e| e.status()), Err(405));
}

#[test]
fn bad_commit_is_bad_request() {
    let err = get("/commit/xyz").unwrap_err();
    assert!(matches!(err, RouteError::BadCommit(_)));
    assert_eq!(err.status(), 400);
}

#[test]
fn undecodable_variant_is_bad_request() {
    let err = get("/commit/abc123/variant/%FF").unwrap_err();
    assert_eq!(err, RouteError::BadVariant("%FF".to_string()));
}

#[parameterized(
    root = { "/ci", Some("/") },
    root_slash = { "/ci/", Some("/") },
    nested = { "/ci/commit/abc123", Some("/commit/abc123") },
    outside = { "/commit/abc123", None },
    prefix_only = { "/cix", None },
)]
fn base_path_is_stripped(path: &str, expected: Option<&str>) {
    assert_eq!(strip_base(path, "/ci"), expected);
}

#[test]
fn routes_under_base_path() {
    let req = request(Method::Get, "/ci/commit/abc123");
    assert_eq!(route(&req, "/ci"), Ok(Route::Commit(hash())));
    let outside = route(&request(Method::Get, "/commit/abc123"), "/ci");
    assert!(matches!(outside, Err(RouteError::NotFound(_))));
}
