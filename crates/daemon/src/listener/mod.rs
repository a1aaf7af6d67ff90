// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the HTTP front.
//!
//! The accept loop spawns one task per connection. Each connection carries
//! one request: it is read with a timeout, routed, answered, and closed.
//! Log views write their chunked body straight to the socket; every other
//! route produces a buffered [`Response`].

mod commit;
mod routes;
mod variant;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use civet_adapters::JobService;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::http::{self, HttpError, Request, Response};
use crate::pages;
use routes::{Route, RouteError};

/// Shared context for all request handlers.
pub struct ListenCtx {
    pub service: Arc<dyn JobService>,
    /// URL prefix, `""` or `/prefix`
    pub base_path: String,
    /// Time allowed to read a request head
    pub request_timeout: Duration,
}

impl ListenCtx {
    fn error_response(&self, status: u16, message: &str) -> Response {
        Response::html(status, pages::error_page(&self.base_path, status, message))
    }
}

/// Listener task for accepting HTTP connections.
pub struct Listener {
    tcp: TcpListener,
    ctx: Arc<ListenCtx>,
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener").field("tcp", &self.tcp).finish_non_exhaustive()
    }
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Listener {
    pub fn new(tcp: TcpListener, ctx: Arc<ListenCtx>) -> Self {
        Self { tcp, ctx }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tcp.local_addr()
    }

    /// Accept connections until `shutdown` is cancelled. Connections already
    /// accepted finish on their own tasks.
    pub async fn run(self, shutdown: CancellationToken) {
        if let Ok(addr) = self.tcp.local_addr() {
            info!(%addr, "listening");
        }
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("listener stopped");
                    return;
                }
                result = self.tcp.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("TCP connection from {}", addr);
                            let ctx = Arc::clone(&self.ctx);
                            tokio::spawn(async move {
                                let (reader, writer) = stream.into_split();
                                if let Err(e) = handle_connection(reader, writer, &ctx).await {
                                    log_connection_error(e);
                                }
                            });
                        }
                        Err(e) => error!("TCP accept error: {}", e),
                    }
                }
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Http(HttpError::ConnectionClosed) => debug!("Client disconnected"),
        ConnectionError::Http(HttpError::Timeout) => warn!("Connection timeout"),
        ConnectionError::Http(HttpError::BadRequest(_) | HttpError::TooLarge) => {
            debug!("Rejected request: {}", e)
        }
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection.
///
/// Generic over reader/writer types so tests can drive it over in-memory
/// pipes as well as TCP.
async fn handle_connection<R, W>(
    reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let mut reader = BufReader::new(reader);
    let request = match http::read_request(&mut reader, ctx.request_timeout).await {
        Ok(request) => request,
        Err(e) => {
            let status = match e {
                HttpError::BadRequest(_) => 400,
                HttpError::TooLarge => 413,
                _ => return Err(e.into()),
            };
            let _ = http::write_response(&mut writer, &ctx.error_response(status, &e.to_string()))
                .await;
            return Err(e.into());
        }
    };

    info!(method = ?request.method, path = %request.path, "received request");
    handle_request(request, ctx, &mut writer).await?;
    let _ = writer.shutdown().await;
    Ok(())
}

async fn handle_request<W>(
    request: Request,
    ctx: &ListenCtx,
    writer: &mut W,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Unpin + Send,
{
    let route = match routes::route(&request, &ctx.base_path) {
        Ok(route) => route,
        Err(e) => {
            debug!(path = %request.path, error = %e, "no route");
            let mut response = ctx.error_response(e.status(), &e.to_string());
            if let RouteError::MethodNotAllowed(allowed) = e {
                response.headers.push(("Allow", allowed.to_string()));
            }
            http::write_response(writer, &response).await?;
            return Ok(());
        }
    };

    let response = match route {
        Route::Index => Response::html(200, pages::index_page(&ctx.base_path)),
        Route::Lookup(raw) => commit::lookup(ctx, &raw),
        Route::Commit(hash) => commit::show(ctx, &hash).await,
        Route::Bulk { commit, action } => commit::bulk(ctx, &commit, action).await,
        Route::VariantAction { commit, variant, action } => {
            variant::act(ctx, &commit, &variant, action).await
        }
        Route::Variant { commit, variant } => {
            return variant::stream(ctx, &commit, &variant, writer).await;
        }
    };
    http::write_response(writer, &response).await?;
    Ok(())
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
