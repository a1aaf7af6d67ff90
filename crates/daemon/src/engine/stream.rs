// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log streaming
//!
//! Copies a job's log to an already-started chunked response as it grows:
//!
//! ```text
//! prologue + first read ──> read_log(cursor) ──┬─ bytes ──> decoded chunk, advance cursor, repeat
//!                                              ├─ empty ──> epilogue, terminator
//!                                              └─ error ──> error line, terminator
//! ```
//!
//! The stream owns a [`JobLease`] for its whole duration. Every way out of
//! [`stream_log`], including the caller dropping the future when the client
//! goes away, drops the lease and releases the job exactly once.

use civet_adapters::{JobLease, LogChunk, RemoteError};
use civet_core::LogDecoder;
use tokio::io::AsyncWrite;
use tracing::debug;

use crate::http::ChunkedWriter;
use crate::pages;

/// Page chrome around the streamed log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    /// Everything before the first log byte.
    pub prologue: String,
    /// Everything after the last log byte on a clean end.
    pub epilogue: String,
}

/// How a log stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// Reached the end of the available log; `bytes` raw log bytes were sent.
    Complete { bytes: u64 },
    /// A log read failed; the error was shown in the page.
    RemoteFailed { bytes: u64, error: String },
    /// Writing to the client failed.
    Disconnected { bytes: u64, error: String },
}

/// Stream `job`'s log after `first`, the read that was made at offset zero
/// before the response head was sent.
pub async fn stream_log<W: AsyncWrite + Unpin>(
    job: JobLease,
    out: &mut ChunkedWriter<W>,
    page: LogPage,
    first: LogChunk,
) -> StreamEnd {
    let mut decoder = LogDecoder::new();
    let mut cursor = first.next_offset;
    let mut bytes = first.data.len() as u64;

    let mut opening = page.prologue;
    opening.push_str(&decoder.feed(&first.data));
    if let Err(e) = out.send(opening.as_bytes()).await {
        return StreamEnd::Disconnected { bytes, error: e.to_string() };
    }

    loop {
        let chunk = match job.read_log(cursor).await {
            Ok(chunk) => check_advance(cursor, chunk),
            Err(e) => Err(e),
        };

        let (tail, end) = match chunk {
            Ok(chunk) if chunk.is_empty() => {
                let mut tail = decoder.finish();
                tail.push_str(&page.epilogue);
                (tail, StreamEnd::Complete { bytes })
            }
            Ok(chunk) => {
                cursor = chunk.next_offset;
                bytes += chunk.data.len() as u64;
                let fragment = decoder.feed(&chunk.data);
                if let Err(e) = out.send(fragment.as_bytes()).await {
                    return StreamEnd::Disconnected { bytes, error: e.to_string() };
                }
                continue;
            }
            Err(e) => {
                debug!(job_ref = job.job_ref(), offset = cursor, error = %e, "log read failed");
                let mut tail = decoder.finish();
                tail.push_str(&pages::log_failure(&e));
                (tail, StreamEnd::RemoteFailed { bytes, error: e.to_string() })
            }
        };

        let written = match out.send(tail.as_bytes()).await {
            Ok(()) => out.finish().await,
            Err(e) => Err(e),
        };
        return match written {
            Ok(()) => end,
            Err(e) => StreamEnd::Disconnected { bytes, error: e.to_string() },
        };
    }
}

/// A read must not move the cursor backwards, and a read that returned
/// bytes must move it forwards.
fn check_advance(cursor: u64, chunk: LogChunk) -> Result<LogChunk, RemoteError> {
    if chunk.next_offset < cursor {
        return Err(RemoteError::Protocol(format!(
            "log offset moved backwards from {} to {}",
            cursor, chunk.next_offset
        )));
    }
    if !chunk.is_empty() && chunk.next_offset == cursor {
        return Err(RemoteError::Protocol(format!(
            "log read at {} returned {} bytes without advancing",
            cursor,
            chunk.data.len()
        )));
    }
    Ok(chunk)
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
