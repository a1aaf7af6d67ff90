// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_splits_path_and_label() {
    let v = VariantPath::parse("linux/gcc/test").unwrap();
    assert_eq!(v.segments(), ["linux", "gcc", "test"]);
    assert_eq!(v.path(), ["linux", "gcc"]);
    assert_eq!(v.label(), "test");
}

#[test]
fn single_segment_has_empty_path() {
    let v = VariantPath::parse("lint").unwrap();
    assert!(v.path().is_empty());
    assert_eq!(v.label(), "lint");
}

#[test]
fn display_rejoins_segments() {
    let v: VariantPath = "a/b/c".parse().unwrap();
    assert_eq!(v.to_string(), "a/b/c");
}

#[test]
fn empty_identifier_is_rejected() {
    assert_eq!(VariantPath::parse(""), Err(VariantError::Empty));
}

#[yare::parameterized(
    leading  = { "/a/b", 0 },
    trailing = { "a/b/", 2 },
    doubled  = { "a//b", 1 },
    only_sep = { "/",    0 },
)]
fn empty_segment_is_rejected(raw: &str, index: usize) {
    match VariantPath::parse(raw) {
        Err(VariantError::EmptySegment { index: got, .. }) => assert_eq!(got, index),
        other => panic!("expected EmptySegment for {:?}, got {:?}", raw, other),
    }
}

#[test]
fn error_message_names_the_identifier() {
    let err = VariantPath::parse("a//b").unwrap_err();
    assert!(err.to_string().contains("\"a//b\""), "got: {}", err);
}
