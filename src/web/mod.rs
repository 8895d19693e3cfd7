//! Embedded web console for aiswitch.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page console for channels, models, tests, analytics and config generation
//! - Console API endpoints backed by the shared [`AnalyticsView`]
//! - A pass-through for every other `/api/...` route to the backend
//!
//! Launched via `aiswitch web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::analytics::snapshot::AnalyticsView;
use crate::backend::{BackendClient, StatusError};
use crate::config::ConsoleConfig;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by every worker thread.
#[derive(Debug)]
pub struct ConsoleState {
    pub config: ConsoleConfig,
    pub client: BackendClient,
    pub view: AnalyticsView,
}

impl ConsoleState {
    pub fn new(config: ConsoleConfig) -> Self {
        let client = BackendClient::from_config(&config.backend);
        Self {
            config,
            client,
            view: AnalyticsView::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web console on `config.web.addr` (or `addr_override`).
///
/// Blocks the current thread. Requests are served by `web.workers` threads
/// pulling from the same listener, so a slow backend call does not stall
/// the whole console. Errors are handled per request.
pub fn serve(config: ConsoleConfig, addr_override: Option<&str>) -> Result<()> {
    let addr = addr_override.unwrap_or(&config.web.addr).to_string();
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;
    let server = Arc::new(server);

    let workers = config.web.workers.max(1);
    let open = config.web.open_browser;
    let state = Arc::new(ConsoleState::new(config));

    println!("aiswitch console running at http://{addr}");
    println!("Backend: {}", state.client.base_url());
    println!("Press Ctrl+C to stop.\n");
    tracing::info!(%addr, workers, backend = state.client.base_url(), "web console started");

    if open && let Err(e) = open_browser(&format!("http://{addr}")) {
        tracing::debug!(error = %e, "could not open browser");
    }

    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            thread::Builder::new()
                .name(format!("aiswitch-web-{i}"))
                .spawn(move || {
                    for request in server.incoming_requests() {
                        handle_request(&state, request);
                    }
                })
                .context("failed to spawn web worker")
        })
        .collect::<Result<_>>()?;

    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("web worker panicked");
        }
    }

    Ok(())
}

fn handle_request(state: &ConsoleState, mut request: Request) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();

    // Read body up-front for methods that carry one
    let body = if matches!(
        method,
        Method::Put | Method::Post | Method::Patch | Method::Delete
    ) {
        let mut buf = String::new();
        if let Err(e) = request.as_reader().read_to_string(&mut buf) {
            tracing::warn!(error = %e, %url, "failed to read request body");
        }
        Some(buf).filter(|b| !b.is_empty())
    } else {
        None
    };

    let reply = dispatch(state, method.as_str(), &url, body.as_deref());
    let status = reply.status;
    if let Err(e) = request.respond(reply.into_response()) {
        tracing::debug!(error = %e, %url, "client went away before response");
    }

    tracing::info!(
        method = method.as_str(),
        %url,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch a request to the appropriate handler.
pub fn dispatch(state: &ConsoleState, method: &str, url: &str, body: Option<&str>) -> Reply {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    let result = match (method, path) {
        // Frontend
        ("GET", "/") | ("GET", "/index.html") => Ok(Reply::html(frontend::INDEX_HTML)),

        // Console API
        ("GET", "/api/console/analytics") => api::get_console_analytics(state, url),
        ("GET", "/api/console/trend") => api::get_console_trend(state, url),
        ("GET", "/api/console/settings") => api::get_console_settings(state),
        ("POST", "/api/console/models/import") => api::import_models(state, body),

        // Everything else under /api goes to the backend
        (_, p) if p.starts_with("/api/") && !p.starts_with("/api/console/") => {
            api::forward(state, method, url, body)
        }

        // 404
        _ => Ok(Reply::not_found()),
    };

    result.unwrap_or_else(|e| {
        let status = e
            .downcast_ref::<StatusError>()
            .map(|se| se.status)
            .unwrap_or(500);
        Reply::error(status, &format!("{e:#}"))
    })
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// A response body plus status, before it is handed to `tiny_http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    html: bool,
}

impl Reply {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            html: false,
        }
    }

    fn html(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            html: true,
        }
    }

    fn not_found() -> Self {
        Self::json(404, r#"{"error": "not found"}"#.to_string())
    }

    pub(crate) fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let header = if self.html {
            content_type_html()
        } else {
            content_type_json()
        };
        Response::from_data(self.body.into_bytes())
            .with_header(header)
            .with_status_code(StatusCode(self.status))
    }
}

/// JSON content type header.
fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_state() -> ConsoleState {
        let mut config = ConsoleConfig::default();
        config.backend.base_url = "http://127.0.0.1:9".to_string();
        config.backend.timeout_ms = 200;
        ConsoleState::new(config)
    }

    #[test]
    fn serves_frontend_at_root() {
        let reply = dispatch(&offline_state(), "GET", "/", None);
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn unknown_paths_are_404() {
        let reply = dispatch(&offline_state(), "GET", "/favicon.ico", None);
        assert_eq!(reply.status, 404);
        let reply = dispatch(&offline_state(), "POST", "/api/console/analytics", None);
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn unreachable_backend_is_an_error_reply() {
        let reply = dispatch(&offline_state(), "GET", "/api/channels/", None);
        assert_eq!(reply.status, 502);
        assert!(reply.body.contains("\"error\""));
    }

    #[test]
    fn settings_report_backend_url() {
        let reply = dispatch(&offline_state(), "GET", "/api/console/settings", None);
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("http://127.0.0.1:9"));
    }
}
