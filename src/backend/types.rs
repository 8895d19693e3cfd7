//! Wire types exchanged with the backend REST API.
//!
//! Field names follow the backend's JSON exactly. Fields the backend may omit
//! or send as `null` are `Option`s; unknown fields are ignored, so newer
//! backends stay readable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// An upstream API provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_auth_type() -> String {
    "bearer".to_string()
}

/// Body of `POST /api/channels/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCreate {
    pub name: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub auth_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    pub is_active: bool,
}

/// Body of `PUT /api/channels/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ChannelUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// A model registered under a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub channel_id: i64,
    pub name: String,
    pub model_identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub context_window: Option<u64>,
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub supports_tools: bool,
    #[serde(default)]
    pub supports_vision: bool,
    #[serde(default)]
    pub cost_input: Option<f64>,
    #[serde(default)]
    pub cost_output: Option<f64>,
    pub is_active: bool,
    pub created_at: String,
}

/// Model attributes shared by single and batch creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub model_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    pub supports_tools: bool,
    pub supports_vision: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_input: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_output: Option<f64>,
    pub is_active: bool,
}

impl ModelSpec {
    /// A minimal active model with no capability metadata.
    pub fn new(name: impl Into<String>, model_identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_identifier: model_identifier.into(),
            display_name: None,
            context_window: None,
            max_tokens: None,
            supports_tools: false,
            supports_vision: false,
            cost_input: None,
            cost_output: None,
            is_active: true,
        }
    }
}

/// Body of `POST /api/models/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCreate {
    pub channel_id: i64,
    #[serde(flatten)]
    pub spec: ModelSpec,
}

/// Body of `PUT /api/models/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_tools: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_vision: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_input: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_output: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ModelUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `POST /api/models/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBatchCreate {
    pub channel_id: i64,
    pub models: Vec<ModelSpec>,
}

/// Channel summary embedded in a ranking entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingChannel {
    pub name: String,
    pub base_url: String,
}

/// One entry of `GET /api/models/ranking`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRanking {
    pub id: i64,
    pub name: String,
    pub model_identifier: String,
    /// `999` for models the ranker has not scored yet.
    pub rank: u32,
    pub score: f64,
    pub channel: RankingChannel,
}

impl ModelRanking {
    pub const UNRANKED: u32 = 999;

    pub fn is_ranked(&self) -> bool {
        self.rank != Self::UNRANKED
    }
}

// ---------------------------------------------------------------------------
// Test runs
// ---------------------------------------------------------------------------

/// Category of quality probe run against a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Latency probe.
    #[default]
    Speed,
    /// Code-generation probe.
    Code,
    /// Tool-invocation probe.
    Tool,
}

impl TestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Code => "code",
            Self::Tool => "tool",
        }
    }

    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "speed" => Some(Self::Speed),
            "code" | "code-generation" => Some(Self::Code),
            "tool" | "tool-invocation" => Some(Self::Tool),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/test/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub model_ids: Vec<i64>,
    pub test_type: TestType,
}

/// Acknowledgement from `POST /api/test/run`; tests run asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunAck {
    pub message: String,
    #[serde(default)]
    pub model_ids: Vec<i64>,
    #[serde(default)]
    pub test_type: String,
}

/// One row of `GET /api/test/results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultRow {
    pub model_id: i64,
    pub model_name: String,
    pub test_type: String,
    pub success: bool,
    /// Seconds, not milliseconds.
    #[serde(default)]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: String,
}

/// Response of `GET /api/test/health/{model_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHealth {
    pub model_id: i64,
    #[serde(default)]
    pub model_name: Option<String>,
    /// `healthy`, `degraded`, `unhealthy` or `unknown`.
    pub status: String,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub avg_response_time_ms: Option<f64>,
    #[serde(default)]
    pub recent_tests: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Monitoring
// ---------------------------------------------------------------------------

/// Response of `GET /api/monitoring/health/detailed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedHealth {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub checks: BTreeMap<String, HealthCheck>,
}

/// One named check (`database`, `system`, `models`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Check-specific figures such as `cpu_percent` or `active_models`.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// One day × test type summary from `GET /api/analytics/test-history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTestRecord {
    pub date: String,
    pub test_type: String,
    pub total: u64,
    #[serde(default)]
    pub success_count: u64,
    /// Backend-computed; the trend view recomputes it from the counts.
    #[serde(default)]
    pub success_rate: f64,
    /// Milliseconds; `None` when no timed samples exist.
    #[serde(default)]
    pub avg_response_time: Option<f64>,
}

/// One entry of `GET /api/analytics/model-comparison`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub model_id: i64,
    pub model_name: String,
    pub total_tests: u64,
    #[serde(default)]
    pub success_count: u64,
    pub success_rate: f64,
    #[serde(default)]
    pub avg_response_time: Option<f64>,
    #[serde(default)]
    pub avg_quality: Option<f64>,
}

/// One entry of `GET /api/analytics/test-type-distribution`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTypeDistribution {
    pub test_type: String,
    pub count: u64,
    #[serde(default)]
    pub success_count: u64,
    pub success_rate: f64,
}

/// One day of a single model's performance trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: String,
    pub total: u64,
    #[serde(default)]
    pub success_count: u64,
    pub success_rate: f64,
    #[serde(default)]
    pub avg_response_time: Option<f64>,
    #[serde(default)]
    pub min_response_time: Option<f64>,
    #[serde(default)]
    pub max_response_time: Option<f64>,
}

/// Response of `GET /api/analytics/performance-trends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTrends {
    pub model_id: i64,
    pub model_name: String,
    pub trends: Vec<PerformancePoint>,
}

// ---------------------------------------------------------------------------
// Config generation
// ---------------------------------------------------------------------------

/// Response of the config generation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedConfig {
    /// The downstream configuration, as pretty-printed JSON text.
    pub config: String,
    #[serde(default)]
    pub models_count: u32,
    #[serde(default)]
    pub channel: Option<String>,
}

/// Outcome of a model CSV import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_tolerates_missing_optional_fields() {
        let json = r#"{"id":1,"name":"openai","base_url":"https://api.openai.com",
            "is_active":true,"created_at":"2024-01-01T00:00:00","extra":42}"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.auth_type, "bearer");
        assert_eq!(channel.api_key, None);
        assert_eq!(channel.updated_at, None);
    }

    #[test]
    fn updates_only_send_set_fields() {
        let update = ChannelUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"is_active":false}"#);
        assert!(ModelUpdate::default().is_empty());
    }

    #[test]
    fn model_create_flattens_spec() {
        let body = ModelCreate {
            channel_id: 3,
            spec: ModelSpec::new("gpt-4o", "gpt-4o-2024-08-06"),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["channel_id"], 3);
        assert_eq!(value["model_identifier"], "gpt-4o-2024-08-06");
        assert_eq!(value["is_active"], true);
        assert!(value.get("display_name").is_none());
    }

    #[test]
    fn daily_record_accepts_null_latency() {
        let json = r#"{"date":"2024-01-01","test_type":"code","total":5,
            "success_count":5,"success_rate":1.0,"avg_response_time":null}"#;
        let record: DailyTestRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.avg_response_time, None);
    }

    #[test]
    fn test_type_parses_aliases() {
        assert_eq!(TestType::parse("SPEED"), Some(TestType::Speed));
        assert_eq!(TestType::parse("code-generation"), Some(TestType::Code));
        assert_eq!(TestType::parse("tool"), Some(TestType::Tool));
        assert_eq!(TestType::parse("vision"), None);
        assert_eq!(serde_json::to_string(&TestType::Tool).unwrap(), "\"tool\"");
    }
}
