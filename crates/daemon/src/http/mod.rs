// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/1.1 server side of the front end.
//!
//! Each connection carries exactly one request and is closed after the
//! response. Responses are either buffered with `Content-Length` framing or
//! streamed with chunked transfer encoding through [`ChunkedWriter`].

mod chunked;
pub use chunked::ChunkedWriter;

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Upper bound on the request line plus headers.
pub const MAX_HEAD: usize = 16 * 1024;

/// Upper bound on a (discarded) request body.
const MAX_BODY: u64 = 64 * 1024;

/// Errors reading a request or writing a response
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request too large")]
    TooLarge,

    #[error("timed out reading request")]
    Timeout,

    #[error("connection closed before a request was received")]
    ConnectionClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }
}

/// A parsed request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Raw (still percent-encoded) path, without the query string.
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decoded value of a query parameter (form encoding, `+` is a space).
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key != name {
                return None;
            }
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|v| v.into_owned())
        })
    }
}

/// Read one request, bounded by `timeout`. Any body is read and discarded.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    timeout: Duration,
) -> Result<Request, HttpError> {
    tokio::time::timeout(timeout, read_request_inner(reader))
        .await
        .map_err(|_| HttpError::Timeout)?
}

async fn read_request_inner<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<Request, HttpError> {
    let lines = read_head(reader).await?;
    let (request_line, header_lines) = match lines.split_first() {
        Some(split) => split,
        None => return Err(HttpError::BadRequest("empty request".to_string())),
    };

    let mut parts = request_line.split(' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(m), Some(t), Some(v), None) if !m.is_empty() => (m, t, v),
        _ => return Err(HttpError::BadRequest(format!("malformed request line: {request_line}"))),
    };
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::BadRequest(format!("unsupported version: {version}")));
    }
    if !target.starts_with('/') {
        return Err(HttpError::BadRequest(format!("unsupported target: {target}")));
    }
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    };

    let mut headers = Vec::with_capacity(header_lines.len());
    for line in header_lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::BadRequest(format!("malformed header: {line}")))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let request = Request { method: Method::parse(method), path, query, headers };
    discard_body(reader, &request).await?;
    Ok(request)
}

/// Read header lines up to the blank line, without line terminators.
async fn read_head<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<Vec<String>, HttpError> {
    let mut limited = (&mut *reader).take(MAX_HEAD as u64);
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let n = limited.read_line(&mut line).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                HttpError::BadRequest("request head is not valid UTF-8".to_string())
            }
            _ => HttpError::Io(e),
        })?;
        if n == 0 && lines.is_empty() && line.is_empty() {
            return Err(HttpError::ConnectionClosed);
        }
        if !line.ends_with('\n') {
            if limited.limit() == 0 {
                return Err(HttpError::TooLarge);
            }
            return Err(HttpError::BadRequest("truncated request head".to_string()));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Ok(lines);
        }
        lines.push(line.to_string());
    }
}

async fn discard_body<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    request: &Request,
) -> Result<(), HttpError> {
    let Some(raw) = request.header("content-length") else {
        return Ok(());
    };
    let len: u64 =
        raw.parse().map_err(|_| HttpError::BadRequest(format!("bad content-length: {raw}")))?;
    if len > MAX_BODY {
        return Err(HttpError::TooLarge);
    }
    let copied = tokio::io::copy(&mut (&mut *reader).take(len), &mut tokio::io::sink()).await?;
    if copied < len {
        return Err(HttpError::BadRequest("truncated request body".to_string()));
    }
    Ok(())
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Response {
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", "text/html; charset=utf-8".to_string())],
            body,
        }
    }

    /// `302 Found` to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self { status: 302, headers: vec![("Location", location.into())], body: String::new() }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Write a buffered response and flush it.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> std::io::Result<()> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", response.status, reason(response.status));
    for (name, value) in &response.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
    head.push_str("Connection: close\r\n\r\n");

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(response.body.as_bytes()).await?;
    writer.flush().await
}

/// Write the head of a `200 OK` chunked response that intermediaries must
/// pass through unbuffered.
pub async fn write_stream_head<W: AsyncWrite + Unpin>(
    writer: &mut W,
    content_type: &str,
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nTransfer-Encoding: chunked\r\n\
         Cache-Control: no-cache\r\nX-Accel-Buffering: no\r\nConnection: close\r\n\r\n"
    );
    writer.write_all(head.as_bytes()).await?;
    writer.flush().await
}

/// Reason phrase for the status codes the daemon emits.
pub fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Content Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
