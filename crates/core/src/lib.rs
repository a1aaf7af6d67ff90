// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! civet-core: data model shared by the civet daemon and its adapters.
//!
//! Everything in this crate is pure: no I/O, no async. The daemon builds
//! status trees and decodes log bytes with these types; the adapters
//! serialize them to and from the job-execution service.

pub mod macros;

pub mod commit;
pub mod decode;
pub mod outcome;
pub mod tree;
pub mod variant;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use commit::{CommitError, CommitHash};
pub use decode::{escape_html, LogDecoder};
pub use outcome::{JobInfo, JobOutcome, StatusClass, StatusSnapshot, SKIP_MARKER};
pub use tree::{Node, StatusTree};
pub use variant::{VariantError, VariantPath, VARIANT_SEPARATOR};
