//! Blocking HTTP client for the backend REST API.
//!
//! Every network call the console makes goes through [`BackendClient`],
//! which is built once from the resolved [`BackendConfig`]. No other module
//! knows where the backend lives.
//!
//! Uses the synchronous `ureq` client with an agent-level timeout. Non-2xx
//! responses become a [`StatusError`] (wrapped in `anyhow::Error`) carrying
//! the HTTP status and the backend's `detail` message, so callers that relay
//! responses can recover the status with `downcast_ref`.

pub mod import;
pub mod types;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::schema::BackendConfig;
use crate::analytics::range::DayRange;
use types::{
    Channel, ChannelCreate, ChannelUpdate, DailyTestRecord, DetailedHealth, GeneratedConfig, Model,
    ModelBatchCreate, ModelComparison, ModelCreate, ModelHealth, ModelRanking, ModelUpdate,
    PerformanceTrends, TestRequest, TestResultRow, TestRunAck, TestType, TestTypeDistribution,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A non-2xx response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub status: u16,
    pub method: String,
    pub path: String,
    /// The backend's `detail` field, or the raw body when it has none.
    pub detail: String,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "backend returned {} for {} {}",
            self.status, self.method, self.path
        )?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatusError {}

/// Pull a human-readable message out of an error body.
///
/// FastAPI puts it in `detail`, which is either a string or a list of
/// validation errors.
fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Forwarded responses
// ---------------------------------------------------------------------------

/// A backend response relayed without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarded {
    pub status: u16,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client.
///
/// Cheap to clone: the underlying `ureq::Agent` shares its connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    agent: ureq::Agent,
}

impl BackendClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// The configured base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        // "localhost" may resolve to ::1 first while the backend only binds
        // IPv4, which stalls every request until the IPv6 attempt times out.
        format!("{}{}", self.base_url, path).replace("://localhost", "://127.0.0.1")
    }

    /// Issue a request and decode a JSON response.
    fn send<B, T>(&self, method: &str, path: &str, query: &[(&str, String)], body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.agent.request(method, &self.url(path));
        for (key, value) in query {
            request = request.query(key, value);
        }

        tracing::debug!(method, path, "backend request");
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(StatusError {
                    status,
                    method: method.to_string(),
                    path: path.to_string(),
                    detail: extract_detail(&body),
                }
                .into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("failed to reach backend at {}", self.base_url));
            }
        };

        response
            .into_json::<T>()
            .with_context(|| format!("failed to parse backend response for {method} {path}"))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.send::<(), T>("GET", path, query, None)
    }

    /// Extract the `message` of a `{ "message": ... }` acknowledgement.
    fn message(value: serde_json::Value) -> String {
        value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("ok")
            .to_string()
    }

    // -- health -------------------------------------------------------------

    /// `GET /health`: the backend's liveness probe.
    pub fn health(&self) -> Result<serde_json::Value> {
        self.get("/health", &[])
    }

    /// Database, system and model checks.
    pub fn detailed_health(&self) -> Result<DetailedHealth> {
        self.get("/api/monitoring/health/detailed", &[])
    }

    // -- channels -----------------------------------------------------------

    pub fn list_channels(&self) -> Result<Vec<Channel>> {
        self.get("/api/channels/", &[])
    }

    pub fn get_channel(&self, id: i64) -> Result<Channel> {
        self.get(&format!("/api/channels/{id}"), &[])
    }

    pub fn create_channel(&self, channel: &ChannelCreate) -> Result<Channel> {
        self.send("POST", "/api/channels/", &[], Some(channel))
    }

    pub fn update_channel(&self, id: i64, update: &ChannelUpdate) -> Result<Channel> {
        self.send("PUT", &format!("/api/channels/{id}"), &[], Some(update))
    }

    pub fn delete_channel(&self, id: i64) -> Result<String> {
        let value = self.send::<(), serde_json::Value>("DELETE", &format!("/api/channels/{id}"), &[], None)?;
        Ok(Self::message(value))
    }

    // -- models -------------------------------------------------------------

    /// `GET /api/models/`, optionally restricted to one channel.
    pub fn list_models(&self, channel_id: Option<i64>) -> Result<Vec<Model>> {
        let query: Vec<(&str, String)> = channel_id
            .map(|id| ("channel_id", id.to_string()))
            .into_iter()
            .collect();
        self.get("/api/models/", &query)
    }

    pub fn get_model(&self, id: i64) -> Result<Model> {
        self.get(&format!("/api/models/{id}"), &[])
    }

    pub fn create_model(&self, model: &ModelCreate) -> Result<Model> {
        self.send("POST", "/api/models/", &[], Some(model))
    }

    pub fn update_model(&self, id: i64, update: &ModelUpdate) -> Result<Model> {
        self.send("PUT", &format!("/api/models/{id}"), &[], Some(update))
    }

    pub fn delete_model(&self, id: i64) -> Result<String> {
        let value = self.send::<(), serde_json::Value>("DELETE", &format!("/api/models/{id}"), &[], None)?;
        Ok(Self::message(value))
    }

    pub fn create_models_batch(&self, batch: &ModelBatchCreate) -> Result<Vec<Model>> {
        self.send("POST", "/api/models/batch", &[], Some(batch))
    }

    pub fn model_rankings(&self) -> Result<Vec<ModelRanking>> {
        self.get("/api/models/ranking", &[])
    }

    // -- tests --------------------------------------------------------------

    /// Queue tests for the given models. Results arrive asynchronously.
    pub fn run_tests(&self, model_ids: &[i64], test_type: TestType) -> Result<TestRunAck> {
        if model_ids.is_empty() {
            anyhow::bail!("no models specified");
        }
        let body = TestRequest {
            model_ids: model_ids.to_vec(),
            test_type,
        };
        self.send("POST", "/api/test/run", &[], Some(&body))
    }

    pub fn test_results(&self, limit: u32, model_id: Option<i64>) -> Result<Vec<TestResultRow>> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(id) = model_id {
            query.push(("model_id", id.to_string()));
        }
        self.get("/api/test/results", &query)
    }

    pub fn model_health(&self, model_id: i64) -> Result<ModelHealth> {
        self.get(&format!("/api/test/health/{model_id}"), &[])
    }

    /// Ask the backend to recompute rankings in the background.
    pub fn update_rankings(&self) -> Result<String> {
        let value = self.send::<(), serde_json::Value>("POST", "/api/test/update-rankings", &[], None)?;
        Ok(Self::message(value))
    }

    // -- analytics ----------------------------------------------------------

    pub fn test_history(&self, days: DayRange) -> Result<Vec<DailyTestRecord>> {
        self.get("/api/analytics/test-history", &[("days", days.to_string())])
    }

    pub fn model_comparison(&self, days: DayRange) -> Result<Vec<ModelComparison>> {
        self.get("/api/analytics/model-comparison", &[("days", days.to_string())])
    }

    pub fn test_type_distribution(&self, days: DayRange) -> Result<Vec<TestTypeDistribution>> {
        self.get("/api/analytics/test-type-distribution", &[("days", days.to_string())])
    }

    pub fn performance_trends(&self, model_id: i64, days: u32) -> Result<PerformanceTrends> {
        self.get(
            "/api/analytics/performance-trends",
            &[("model_id", model_id.to_string()), ("days", days.to_string())],
        )
    }

    // -- config generation --------------------------------------------------

    /// Generate the downstream config from the top `top_n` ranked models,
    /// across all channels or for a single one.
    pub fn generate_config(&self, top_n: u32, channel_id: Option<i64>) -> Result<GeneratedConfig> {
        let query = [("top_n", top_n.to_string())];
        match channel_id {
            Some(id) => self.get(&format!("/api/config/generate/{id}"), &query),
            None => self.send::<(), GeneratedConfig>("POST", "/api/config/generate", &query, None),
        }
    }

    // -- pass-through -------------------------------------------------------

    /// Relay a raw request (path including any query string) and return the
    /// backend's status and body untouched. Transport failures are errors;
    /// HTTP error statuses are not.
    pub fn forward(&self, method: &str, path_and_query: &str, body: Option<&str>) -> Result<Forwarded> {
        let request = self.agent.request(method, &self.url(path_and_query));
        let result = match body {
            Some(body) => request
                .set("Content-Type", "application/json")
                .send_string(body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("failed to reach backend at {}", self.base_url));
            }
        };

        let status = response.status();
        let body = response
            .into_string()
            .context("failed to read backend response body")?;
        Ok(Forwarded { status, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash() {
        let client = BackendClient::new("http://localhost:8000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn url_avoids_localhost_ipv6_lookup() {
        let client = BackendClient::new("http://localhost:8000", Duration::from_secs(1));
        assert_eq!(client.url("/api/models/"), "http://127.0.0.1:8000/api/models/");
    }

    #[test]
    fn from_config_uses_base_url() {
        let config = BackendConfig {
            base_url: "http://backend.internal:8000".to_string(),
            timeout_ms: 500,
        };
        let client = BackendClient::from_config(&config);
        assert_eq!(client.base_url(), "http://backend.internal:8000");
    }

    #[test]
    fn extract_detail_prefers_fastapi_detail() {
        assert_eq!(extract_detail(r#"{"detail":"Channel not found"}"#), "Channel not found");
        assert_eq!(
            extract_detail(r#"{"detail":[{"loc":["body"],"msg":"bad"}]}"#),
            r#"[{"loc":["body"],"msg":"bad"}]"#
        );
        assert_eq!(extract_detail("Internal Server Error\n"), "Internal Server Error");
    }

    #[test]
    fn status_error_display_includes_detail() {
        let err = StatusError {
            status: 404,
            method: "GET".to_string(),
            path: "/api/models/9".to_string(),
            detail: "Model not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend returned 404 for GET /api/models/9: Model not found"
        );
    }

    #[test]
    fn run_tests_rejects_empty_selection() {
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(50));
        let err = client.run_tests(&[], TestType::Speed).unwrap_err();
        assert!(err.to_string().contains("no models"));
    }
}
