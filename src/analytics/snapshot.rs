//! Analytics snapshot fetching and the shared view state.
//!
//! A snapshot is the result of the three analytics endpoints queried for
//! the same day range, plus the aggregated trend. The endpoints are fetched
//! in parallel; the snapshot only exists if all three succeed.
//!
//! [`AnalyticsView`] holds the last-known-good snapshot for a long-lived
//! consumer (the dashboard). Refreshes are ticketed so that when two
//! refreshes overlap, only the most recently *issued* one may publish:
//! an older, slower response is dropped rather than overwriting newer data.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::range::DayRange;
use super::trend::{self, AggregatedDayPoint};
use crate::backend::BackendClient;
use crate::backend::types::{DailyTestRecord, ModelComparison, TestTypeDistribution};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything the analytics view renders for one day range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub days: DayRange,
    pub fetched_at: DateTime<Utc>,
    pub history: Vec<DailyTestRecord>,
    pub trend: Vec<AggregatedDayPoint>,
    pub comparison: Vec<ModelComparison>,
    pub distribution: Vec<TestTypeDistribution>,
}

impl AnalyticsSnapshot {
    /// Assemble a snapshot from already-fetched parts.
    pub fn from_parts(
        days: DayRange,
        history: Vec<DailyTestRecord>,
        comparison: Vec<ModelComparison>,
        distribution: Vec<TestTypeDistribution>,
    ) -> Self {
        let trend = trend::aggregate(&history);
        Self {
            days,
            fetched_at: Utc::now(),
            history,
            trend,
            comparison,
            distribution,
        }
    }
}

/// Fetch all three analytics endpoints concurrently and join the results.
///
/// Fails as a whole if any one request fails.
pub fn fetch_snapshot(client: &BackendClient, days: DayRange) -> Result<AnalyticsSnapshot> {
    let (history, comparison, distribution) = thread::scope(|s| {
        let history = s.spawn(|| client.test_history(days));
        let comparison = s.spawn(|| client.model_comparison(days));
        let distribution = s.spawn(|| client.test_type_distribution(days));
        (join(history), join(comparison), join(distribution))
    });

    Ok(AnalyticsSnapshot::from_parts(
        days,
        history.context("failed to fetch test history")?,
        comparison.context("failed to fetch model comparison")?,
        distribution.context("failed to fetch test type distribution")?,
    ))
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("analytics fetch thread panicked"))?
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Identifies one refresh. Tickets are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to a completed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The snapshot was published.
    Applied,
    /// A newer refresh was issued meanwhile; the result was discarded.
    Stale,
    /// The fetch failed; the previous snapshot was kept.
    Failed,
}

/// How a refresh ended, with its own failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub outcome: Outcome,
    /// Set when this refresh's fetch failed, even if it was also stale.
    pub error: Option<String>,
}

impl Completion {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            error: None,
        }
    }
}

/// Last-known-good analytics state shared between request handlers.
#[derive(Debug, Default)]
pub struct AnalyticsView {
    issued: AtomicU64,
    current: Mutex<Option<(Ticket, AnalyticsSnapshot)>>,
}

impl AnalyticsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh. Any ticket issued earlier becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Finish a refresh started with [`begin`](Self::begin).
    ///
    /// Stale results, failed or not, leave the view untouched.
    pub fn complete(&self, ticket: Ticket, result: Result<AnalyticsSnapshot>) -> Completion {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let error = format!("{e:#}");
                let outcome = if self.is_latest(ticket) {
                    tracing::warn!(%error, "analytics refresh failed; keeping previous data");
                    Outcome::Failed
                } else {
                    tracing::debug!(ticket = ticket.0, %error, "discarding stale failed analytics refresh");
                    Outcome::Stale
                };
                return Completion {
                    outcome,
                    error: Some(error),
                };
            }
        };

        let Ok(mut current) = self.current.lock() else {
            return Completion {
                outcome: Outcome::Failed,
                error: Some("analytics state is unavailable".to_string()),
            };
        };

        // Checked under the lock so a newer ticket that has already published
        // can't be overwritten either.
        let newer_published = current.as_ref().is_some_and(|(t, _)| *t > ticket);
        if !self.is_latest(ticket) || newer_published {
            tracing::debug!(ticket = ticket.0, "discarding stale analytics refresh");
            return Completion::new(Outcome::Stale);
        }

        *current = Some((ticket, snapshot));
        Completion::new(Outcome::Applied)
    }

    /// Fetch a fresh snapshot and publish it if still the latest request.
    pub fn refresh(&self, client: &BackendClient, days: DayRange) -> Completion {
        let ticket = self.begin();
        let result = fetch_snapshot(client, days);
        self.complete(ticket, result)
    }

    /// The last published snapshot, if any.
    pub fn snapshot(&self) -> Option<AnalyticsSnapshot> {
        self.current
            .lock()
            .ok()
            .and_then(|current| current.as_ref().map(|(_, s)| s.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(days: DayRange, date: &str) -> AnalyticsSnapshot {
        let history = vec![DailyTestRecord {
            date: date.to_string(),
            test_type: "speed".to_string(),
            total: 2,
            success_count: 1,
            success_rate: 0.5,
            avg_response_time: Some(80.0),
        }];
        AnalyticsSnapshot::from_parts(days, history, Vec::new(), Vec::new())
    }

    #[test]
    fn from_parts_aggregates_trend() {
        let snap = snapshot(DayRange::Week, "2024-05-01");
        assert_eq!(snap.trend.len(), 1);
        assert_eq!(snap.trend[0].success_rate, 50.0);
    }

    #[test]
    fn latest_ticket_is_applied() {
        let view = AnalyticsView::new();
        let ticket = view.begin();
        assert_eq!(view.complete(ticket, Ok(snapshot(DayRange::Week, "a"))).outcome, Outcome::Applied);
        assert_eq!(view.snapshot().unwrap().days, DayRange::Week);
    }

    #[test]
    fn earlier_request_resolving_late_is_discarded() {
        let view = AnalyticsView::new();
        let slow = view.begin();
        let fast = view.begin();

        assert_eq!(
            view.complete(fast, Ok(snapshot(DayRange::Month, "new"))).outcome,
            Outcome::Applied
        );
        assert_eq!(
            view.complete(slow, Ok(snapshot(DayRange::Week, "old"))).outcome,
            Outcome::Stale
        );

        let current = view.snapshot().unwrap();
        assert_eq!(current.days, DayRange::Month);
        assert_eq!(current.trend[0].date, "new");
    }

    #[test]
    fn superseded_request_is_discarded_even_if_first_to_finish() {
        let view = AnalyticsView::new();
        let first = view.begin();
        let _second = view.begin();

        assert_eq!(view.complete(first, Ok(snapshot(DayRange::Week, "x"))).outcome, Outcome::Stale);
        assert!(view.snapshot().is_none());
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let view = AnalyticsView::new();
        let ok = view.begin();
        view.complete(ok, Ok(snapshot(DayRange::Fortnight, "kept")));

        let failing = view.begin();
        let done = view.complete(failing, Err(anyhow::anyhow!("connection refused")));

        assert_eq!(done.outcome, Outcome::Failed);
        assert!(done.error.unwrap().contains("connection refused"));
        assert_eq!(view.snapshot().unwrap().trend[0].date, "kept");
    }

    #[test]
    fn stale_failure_leaves_newer_snapshot_alone() {
        let view = AnalyticsView::new();
        let slow = view.begin();
        let fast = view.begin();
        view.complete(fast, Ok(snapshot(DayRange::Month, "new")));

        let done = view.complete(slow, Err(anyhow::anyhow!("timed out")));

        assert_eq!(done.outcome, Outcome::Stale);
        assert_eq!(done.error.as_deref(), Some("timed out"));
        assert_eq!(view.snapshot().unwrap().trend[0].date, "new");
    }

    #[test]
    fn tickets_increase() {
        let view = AnalyticsView::new();
        let a = view.begin();
        let b = view.begin();
        assert!(b > a);
        assert!(view.is_latest(b));
        assert!(!view.is_latest(a));
    }
}
