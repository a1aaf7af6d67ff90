// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Chunked transfer-encoding framer.
///
/// Every call to [`send`](Self::send) writes one chunk and flushes it so the
/// client sees output as soon as it is produced. A zero-length chunk ends the
/// body, so empty fragments are skipped rather than framed.
#[derive(Debug)]
pub struct ChunkedWriter<W> {
    inner: W,
    finished: bool,
}

impl<W: AsyncWrite + Unpin> ChunkedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, finished: false }
    }

    /// Frame and flush one fragment.
    pub async fn send(&mut self, data: &[u8]) -> std::io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut frame = Vec::with_capacity(data.len() + 12);
        frame.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
        frame.extend_from_slice(data);
        frame.extend_from_slice(b"\r\n");
        self.inner.write_all(&frame).await?;
        self.inner.flush().await
    }

    /// Write the terminating chunk. Later calls are no-ops.
    pub async fn finish(&mut self) -> std::io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.inner.write_all(b"0\r\n\r\n").await?;
        self.inner.flush().await
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
#[path = "chunked_tests.rs"]
mod tests;
