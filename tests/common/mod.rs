//! In-process fake backend for integration tests.
//!
//! Binds `tiny_http` to an ephemeral port and answers every request through a
//! caller-supplied handler. Each request is served on its own thread so slow
//! responses can overlap.

#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use aiswitch_console::backend::BackendClient;
use tiny_http::{Header, Response, Server, StatusCode};

/// One request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub body: String,
}

pub struct FakeBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBackend {
    /// Start a backend whose responses come from `handler(method, url, body)`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let method = request.method().as_str().to_string();
                    let url = request.url().to_string();

                    let (status, response) = handler(&method, &url, &body);
                    log.lock().unwrap().push(Recorded { method, url, body });

                    let header = Header::from_bytes("Content-Type", "application/json").unwrap();
                    let _ = request.respond(
                        Response::from_string(response)
                            .with_status_code(StatusCode(status))
                            .with_header(header),
                    );
                });
            }
        });

        Self {
            url: format!("http://127.0.0.1:{port}"),
            requests,
        }
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.url, Duration::from_secs(5))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// `?days=N` of a request URL.
pub fn days_of(url: &str) -> Option<u32> {
    url.split('?')
        .nth(1)?
        .split('&')
        .find_map(|pair| pair.strip_prefix("days="))?
        .parse()
        .ok()
}

/// A backend serving consistent analytics for any day range: one history day
/// per range, dated `2024-05-{days}`.
pub fn analytics_handler(method: &str, url: &str, _body: &str) -> (u16, String) {
    let path = url.split('?').next().unwrap_or(url);
    let days = days_of(url).unwrap_or(7);
    match (method, path) {
        ("GET", "/api/analytics/test-history") => (
            200,
            format!(
                r#"[
                  {{"date":"2024-05-{days:02}","test_type":"speed","total":10,"success_count":9,"success_rate":0.9,"avg_response_time":100.0}},
                  {{"date":"2024-05-{days:02}","test_type":"code","total":5,"success_count":4,"success_rate":0.8,"avg_response_time":140.0}}
                ]"#
            ),
        ),
        ("GET", "/api/analytics/model-comparison") => (
            200,
            r#"[{"model_id":1,"model_name":"gpt-4o","total_tests":15,"success_count":13,
                "success_rate":86.7,"avg_response_time":120.0,"avg_quality":4.2}]"#
                .to_string(),
        ),
        ("GET", "/api/analytics/test-type-distribution") => (
            200,
            r#"[{"test_type":"speed","count":10,"success_count":9,"success_rate":90.0},
                {"test_type":"code","count":5,"success_count":4,"success_rate":80.0}]"#
                .to_string(),
        ),
        _ => (404, r#"{"detail":"Not Found"}"#.to_string()),
    }
}
