// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use yare::parameterized;

fn clear() {
    for var in [
        "CIVET_LISTEN",
        "CIVET_REMOTE",
        "CIVET_BASE_PATH",
        "CIVET_REMOTE_TIMEOUT_MS",
        "CIVET_REQUEST_TIMEOUT_MS",
        "CIVET_LOG_DIR",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_apply_when_unset() {
    clear();
    assert_eq!(listen_addr(), "127.0.0.1:8080");
    assert_eq!(base_path(), "");
    assert_eq!(remote_timeout(), Duration::from_secs(5));
    assert_eq!(request_timeout(), Duration::from_secs(5));
    assert_eq!(log_dir(), None);
    assert!(matches!(remote_addr(), Err(LifecycleError::MissingVar("CIVET_REMOTE"))));
}

#[test]
#[serial]
fn values_are_read_from_environment() {
    clear();
    std::env::set_var("CIVET_LISTEN", "0.0.0.0:9000");
    std::env::set_var("CIVET_REMOTE", " jobs.internal:7000 ");
    std::env::set_var("CIVET_REMOTE_TIMEOUT_MS", "250");
    std::env::set_var("CIVET_LOG_DIR", "/var/log/civet");

    assert_eq!(listen_addr(), "0.0.0.0:9000");
    assert_eq!(remote_addr().unwrap(), "jobs.internal:7000");
    assert_eq!(remote_timeout(), Duration::from_millis(250));
    assert_eq!(log_dir(), Some(PathBuf::from("/var/log/civet")));
    clear();
}

#[test]
#[serial]
fn unparseable_timeout_falls_back_to_default() {
    clear();
    std::env::set_var("CIVET_REQUEST_TIMEOUT_MS", "soon");
    assert_eq!(request_timeout(), Duration::from_secs(5));
    clear();
}

#[parameterized(
    empty = { "", "" },
    root = { "/", "" },
    bare = { "ci", "/ci" },
    leading = { "/ci", "/ci" },
    trailing = { "/ci/", "/ci" },
    nested = { "tools/ci/", "/tools/ci" },
)]
fn base_path_is_normalized(raw: &str, expected: &str) {
    assert_eq!(normalize_base_path(raw), expected);
}
