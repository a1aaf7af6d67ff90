// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Segmented job-variant identifiers.
//!
//! A variant such as `linux/gcc/test` names one build job of a commit. The
//! final segment is the display label; the segments before it form the path
//! used to group variants in the status tree.

use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// Character joining the segments of a variant identifier.
pub const VARIANT_SEPARATOR: char = '/';

/// Why a variant identifier could not be split into segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("variant identifier is empty")]
    Empty,
    #[error("variant identifier {raw:?} has an empty segment at position {index}")]
    EmptySegment { raw: String, index: usize },
}

/// A parsed, immutable variant identifier with at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantPath {
    segments: Vec<SmolStr>,
}

impl VariantPath {
    /// Split `raw` on [`VARIANT_SEPARATOR`].
    ///
    /// Rejects the empty string and any empty segment (leading, trailing, or
    /// doubled separators).
    pub fn parse(raw: &str) -> Result<Self, VariantError> {
        if raw.is_empty() {
            return Err(VariantError::Empty);
        }
        let mut segments = Vec::new();
        for (index, segment) in raw.split(VARIANT_SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(VariantError::EmptySegment { raw: raw.to_string(), index });
            }
            segments.push(SmolStr::new(segment));
        }
        Ok(Self { segments })
    }

    /// All segments, label included.
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// Segments leading up to the label (may be empty).
    pub fn path(&self) -> &[SmolStr] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The final segment.
    pub fn label(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(SmolStr::as_str).unwrap_or_default()
    }
}

impl fmt::Display for VariantPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", VARIANT_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VariantPath {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "variant_tests.rs"]
mod tests;
