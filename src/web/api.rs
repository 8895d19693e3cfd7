//! JSON API handlers for the web console.
//!
//! Each handler corresponds to an API endpoint and returns a [`Reply`] with
//! JSON content.

use anyhow::{Context, Result};
use serde::Serialize;

use super::{ConsoleState, Reply};
use crate::analytics::range::DayRange;
use crate::analytics::snapshot::{AnalyticsSnapshot, Outcome};
use crate::analytics::trend::{self, AggregatedDayPoint};
use crate::analytics::activity;
use crate::backend::import;

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Analytics API response: the refresh outcome plus the view's current data.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsResponse {
    outcome: Outcome,
    requested_days: DayRange,
    /// Last published snapshot; may be for an earlier range if this refresh
    /// failed or was superseded.
    snapshot: Option<AnalyticsSnapshot>,
    error: Option<String>,
}

/// Trend API response.
#[derive(Serialize)]
struct TrendResponse {
    days: DayRange,
    points: Vec<AggregatedDayPoint>,
}

/// Settings API response.
#[derive(Serialize)]
struct SettingsResponse<'a> {
    backend_url: &'a str,
    timeout_ms: u64,
    default_days: DayRange,
    day_ranges: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Reply> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Reply::json(200, body))
}

/// Parse the `?days=N` query parameter from a URL.
fn parse_days_param(url: &str) -> Option<u32> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "days" { v.parse().ok() } else { None }
    })
}

/// Resolve `?days=` against the supported ranges, falling back to `default`
/// when the parameter is absent.
fn resolve_days(url: &str, default: DayRange) -> std::result::Result<DayRange, Reply> {
    let has_param = url
        .split('?')
        .nth(1)
        .is_some_and(|q| q.split('&').any(|pair| pair.starts_with("days=")));
    if !has_param {
        return Ok(default);
    }
    parse_days_param(url)
        .and_then(DayRange::from_days)
        .ok_or_else(|| Reply::error(400, "days must be one of 7, 14, 30"))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/console/analytics?days=N`: refresh the shared view.
///
/// Returns 502 only when the refresh failed and there is nothing cached to
/// fall back on.
pub fn get_console_analytics(state: &ConsoleState, url: &str) -> Result<Reply> {
    let days = match resolve_days(url, state.config.analytics.default_days) {
        Ok(days) => days,
        Err(reply) => return Ok(reply),
    };

    let done = state.view.refresh(&state.client, days);
    let failed = done.outcome == Outcome::Failed;
    let resp = AnalyticsResponse {
        outcome: done.outcome,
        requested_days: days,
        snapshot: state.view.snapshot(),
        error: if failed { done.error } else { None },
    };

    if failed {
        activity::record(
            &state.config.logging,
            "analytics.fetch",
            resp.error.as_deref().unwrap_or(""),
            false,
        );
        if resp.snapshot.is_none() {
            let body = serde_json::to_string(&resp).context("failed to serialize JSON response")?;
            return Ok(Reply::json(502, body));
        }
    }

    json_response(&resp)
}

/// `GET /api/console/trend?days=N`: aggregated trend only.
pub fn get_console_trend(state: &ConsoleState, url: &str) -> Result<Reply> {
    let days = match resolve_days(url, state.config.analytics.default_days) {
        Ok(days) => days,
        Err(reply) => return Ok(reply),
    };

    let history = state.client.test_history(days)?;
    json_response(&TrendResponse {
        days,
        points: trend::aggregate(&history),
    })
}

/// `GET /api/console/settings`: effective console settings.
pub fn get_console_settings(state: &ConsoleState) -> Result<Reply> {
    json_response(&SettingsResponse {
        backend_url: state.client.base_url(),
        timeout_ms: state.config.backend.timeout_ms,
        default_days: state.config.analytics.default_days,
        day_ranges: DayRange::ALL.iter().map(|d| d.days()).collect(),
    })
}

/// `POST /api/console/models/import`: body is the raw CSV text.
///
/// Per-row and per-channel problems are reported in the summary, not as an
/// error status.
pub fn import_models(state: &ConsoleState, body: Option<&str>) -> Result<Reply> {
    let Some(text) = body.filter(|b| !b.trim().is_empty()) else {
        return Ok(Reply::error(400, "request body must be CSV text"));
    };
    let summary = activity::record_result(
        &state.config.logging,
        "model.import",
        "web upload",
        import::import_models(&state.client, text),
    )?;
    json_response(&summary)
}

/// Relay any other `/api/...` request to the backend.
///
/// The backend's status and body are passed through unchanged; an
/// unreachable backend becomes a 502.
pub fn forward(state: &ConsoleState, method: &str, url: &str, body: Option<&str>) -> Result<Reply> {
    match state.client.forward(method, url, body) {
        Ok(fwd) => Ok(Reply::json(fwd.status, fwd.body)),
        Err(e) => {
            tracing::warn!(method, %url, error = %format!("{e:#}"), "backend unreachable");
            Ok(Reply::error(502, &format!("{e:#}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_days_param_extracts_value() {
        assert_eq!(parse_days_param("/api/console/analytics?days=7"), Some(7));
        assert_eq!(parse_days_param("/api/console/trend?foo=bar&days=14"), Some(14));
    }

    #[test]
    fn parse_days_param_returns_none_for_missing_or_invalid() {
        assert_eq!(parse_days_param("/api/console/trend"), None);
        assert_eq!(parse_days_param("/api/console/trend?days=abc"), None);
        assert_eq!(parse_days_param("/api/console/trend?days="), None);
    }

    #[test]
    fn resolve_days_defaults_when_absent() {
        assert_eq!(
            resolve_days("/api/console/trend", DayRange::Fortnight),
            Ok(DayRange::Fortnight)
        );
        assert_eq!(
            resolve_days("/api/console/trend?days=30", DayRange::Week),
            Ok(DayRange::Month)
        );
    }

    #[test]
    fn resolve_days_rejects_unsupported_ranges() {
        let reply = resolve_days("/api/console/trend?days=90", DayRange::Week).unwrap_err();
        assert_eq!(reply.status, 400);
        let reply = resolve_days("/api/console/trend?days=x", DayRange::Week).unwrap_err();
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn analytics_response_serializes_camel_case() {
        let resp = AnalyticsResponse {
            outcome: Outcome::Stale,
            requested_days: DayRange::Week,
            snapshot: None,
            error: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"outcome\":\"stale\""));
        assert!(json.contains("\"requestedDays\":7"));
    }
}
