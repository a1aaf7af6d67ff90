// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the job service's TCP API.
//!
//! Sends one HTTP/1.1 request per connection and reads the response using
//! Content-Length framing, falling back to reading until close when the
//! service omits it.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::RemoteError;

/// Largest response body accepted from the service.
const MAX_BODY: usize = 16 * 1024 * 1024;

/// Parsed response from the service.
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: u16,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Decode the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, RemoteError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| RemoteError::Protocol(format!("invalid JSON reply: {}", e)))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    addr: String,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { addr: addr.into(), timeout }
    }

    pub async fn get(&self, path: &str) -> Result<HttpReply, RemoteError> {
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, self.addr
        );
        self.timed_request(&request).await
    }

    pub async fn post(&self, path: &str, body: &str) -> Result<HttpReply, RemoteError> {
        let request = format!(
            "POST {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            path,
            self.addr,
            body.len(),
            body
        );
        self.timed_request(&request).await
    }

    /// Connect, send, and read under one timeout covering the whole exchange.
    async fn timed_request(&self, request: &str) -> Result<HttpReply, RemoteError> {
        tokio::time::timeout(self.timeout, self.send_request(request))
            .await
            .map_err(|_| RemoteError::Timeout)?
    }

    async fn send_request(&self, request: &str) -> Result<HttpReply, RemoteError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| RemoteError::Protocol(format!("connect to {} failed: {}", self.addr, e)))?;
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| RemoteError::Protocol(format!("write failed: {}", e)))?;

        let mut reader = BufReader::new(&mut stream);
        let reply = read_http_response(&mut reader).await?;
        check_status(reply)
    }
}

/// Map 4xx/5xx replies to errors carrying the body text.
fn check_status(reply: HttpReply) -> Result<HttpReply, RemoteError> {
    if reply.status < 400 {
        return Ok(reply);
    }
    let text = String::from_utf8_lossy(&reply.body).trim().to_string();
    if reply.status == 404 {
        Err(RemoteError::NotFound(text))
    } else {
        Err(RemoteError::Protocol(format!("HTTP {}: {}", reply.status, text)))
    }
}

/// Read and parse an HTTP/1.1 response from a buffered stream.
pub(crate) async fn read_http_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<HttpReply, RemoteError> {
    let mut status_line = String::new();
    reader
        .read_line(&mut status_line)
        .await
        .map_err(|e| RemoteError::Protocol(format!("read status failed: {}", e)))?;

    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| RemoteError::Protocol(format!("bad status line: {:?}", status_line)))?;

    let mut headers = Vec::new();
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| RemoteError::Protocol(format!("read header failed: {}", e)))?;
        if line == "\r\n" || line == "\n" || line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else { continue };
        let (name, value) = (name.trim().to_string(), value.trim().to_string());
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok();
        }
        headers.push((name, value));
    }

    let body = match content_length {
        Some(len) if len > MAX_BODY => {
            return Err(RemoteError::Protocol(format!("reply body too large: {} bytes", len)));
        }
        Some(len) => {
            let mut buf = vec![0u8; len];
            reader
                .read_exact(&mut buf)
                .await
                .map_err(|e| RemoteError::Protocol(format!("read body failed: {}", e)))?;
            buf
        }
        None => {
            let mut buf = Vec::new();
            reader
                .take(MAX_BODY as u64)
                .read_to_end(&mut buf)
                .await
                .map_err(|e| RemoteError::Protocol(format!("read body failed: {}", e)))?;
            buf
        }
    };

    Ok(HttpReply { status, headers, body })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
