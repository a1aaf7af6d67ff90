// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit hash newtype.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Number of hex digits shown in page headers.
const SHORT_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("commit hash must be 4 to 64 hex digits, got {0} characters")]
    Length(usize),
    #[error("commit hash contains a non-hex character: {0:?}")]
    NotHex(char),
}

/// A (possibly abbreviated) lowercase hex commit hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitHash(SmolStr);

impl CommitHash {
    /// Validate and normalize a hash from a URL or form field.
    pub fn parse(raw: &str) -> Result<Self, CommitError> {
        let raw = raw.trim();
        if !(4..=64).contains(&raw.len()) {
            return Err(CommitError::Length(raw.chars().count()));
        }
        if let Some(c) = raw.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(CommitError::NotHex(c));
        }
        Ok(Self(SmolStr::new(raw.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display.
    pub fn short(&self) -> &str {
        let end = std::cmp::min(SHORT_LEN, self.0.len());
        &self.0[..end]
    }
}

impl std::fmt::Display for CommitHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;
