//! Read-only HTTP serving of a finished report.
//!
//! The snapshot is built once before the listener starts and shared through
//! an [`Arc`]; every request renders from it without locking or mutation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use report_data::ingest::ReportSnapshot;
use report_ui::html::render_html;
use report_ui::json::render_json;
use report_ui::view::ReportView;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Upper bound on the request head we are willing to buffer.
const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// How long one connection may take from accept to the last byte written.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

// ── Response ──────────────────────────────────────────────────────────────────

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body)
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    /// Serialize status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

/// Map a request line onto a response. Pure: reads `snapshot` only.
pub fn route(snapshot: &ReportSnapshot, method: &str, target: &str) -> Response {
    let path = target.split('?').next().unwrap_or(target);

    if method != "GET" {
        return Response::text(405, "method not allowed\n");
    }

    match path {
        "/" | "/index.html" => match ReportView::build(&snapshot.aggregate) {
            Ok(view) => Response::new(
                200,
                "text/html; charset=utf-8",
                render_html(&view, &snapshot.metadata),
            ),
            Err(e) => {
                tracing::error!("Failed to build report view: {}", e);
                Response::text(500, "failed to render report\n")
            }
        },
        "/report.json" => match render_json(snapshot) {
            Ok(body) => Response::new(200, "application/json", body),
            Err(e) => {
                tracing::error!("Failed to serialize report: {}", e);
                Response::text(500, "failed to serialize report\n")
            }
        },
        _ => Response::text(404, "not found\n"),
    }
}

// ── ReportServer ──────────────────────────────────────────────────────────────

/// Serves one immutable [`ReportSnapshot`].
pub struct ReportServer {
    snapshot: Arc<ReportSnapshot>,
    connection_timeout: Duration,
}

impl ReportServer {
    pub fn new(snapshot: Arc<ReportSnapshot>) -> Self {
        Self {
            snapshot,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// Drop connections that have not finished within `timeout`.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Bind `addr` (e.g. `"127.0.0.1:5000"`).
    pub async fn bind(addr: &str) -> std::io::Result<TcpListener> {
        TcpListener::bind(addr).await
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!("accept failed: {}", e);
                            continue;
                        }
                    };
                    let snapshot = Arc::clone(&self.snapshot);
                    let limit = self.connection_timeout;
                    tokio::spawn(async move {
                        let connection = handle_connection(stream, peer, &snapshot);
                        match tokio::time::timeout(limit, connection).await {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => tracing::debug!(%peer, "connection error: {}", e),
                            Err(_) => {
                                tracing::debug!(%peer, "connection timed out after {:?}", limit)
                            }
                        }
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!("Report server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Spawn [`ReportServer::serve`] on a tokio task.
    pub fn start(self, listener: TcpListener) -> ServerHandle {
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(self.serve(listener, async move {
            let _ = rx.await;
        }));
        ServerHandle {
            shutdown: Some(tx),
            handle,
        }
    }
}

// ── ServerHandle ──────────────────────────────────────────────────────────────

/// Handle to a running [`ReportServer`] task.
pub struct ServerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Ask the server to stop and wait for the accept loop to exit.
    pub async fn shutdown(mut self) -> std::io::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        }
    }
}

// ── Connection handling ───────────────────────────────────────────────────────

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    snapshot: &ReportSnapshot,
) -> std::io::Result<()> {
    let head = read_request_head(&mut stream).await?;

    let response = match parse_request_line(&head) {
        Some((method, target)) => {
            tracing::debug!(%peer, "{} {}", method, target);
            route(snapshot, method, target)
        }
        None => Response::text(400, "bad request\n"),
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

/// Read until the blank line that ends the request head.
async fn read_request_head(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    while !buf.windows(4).any(|w| w == b"\r\n\r\n") && buf.len() < MAX_REQUEST_HEAD {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `"GET /path HTTP/1.1"` → `("GET", "/path")`.
fn parse_request_line(head: &str) -> Option<(&str, &str)> {
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    parts.next()?.starts_with("HTTP/").then_some((method, target))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
