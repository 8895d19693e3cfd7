/// Integration tests for analytics: trend aggregation over realistic backend
/// payloads, the all-or-nothing snapshot fetch, and last-request-wins
/// refreshes of the shared view.
mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use aiswitch_console::analytics::range::DayRange;
use aiswitch_console::analytics::snapshot::{AnalyticsView, Outcome, fetch_snapshot};
use aiswitch_console::analytics::trend::aggregate;
use aiswitch_console::backend::types::DailyTestRecord;
use common::{FakeBackend, analytics_handler, days_of};

fn records(json: &str) -> Vec<DailyTestRecord> {
    serde_json::from_str(json).unwrap()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[test]
fn two_types_on_one_day_fold_into_one_point() {
    let history = records(
        r#"[
          {"date":"2024-01-01","test_type":"speed","total":10,"success_count":9,"success_rate":0.9,"avg_response_time":100},
          {"date":"2024-01-01","test_type":"code","total":5,"success_count":4,"success_rate":0.8,"avg_response_time":140}
        ]"#,
    );
    let points = aggregate(&history);

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].date, "2024-01-01");
    assert_eq!(points[0].total, 15);
    assert_eq!(points[0].success_rate, 86.7);
    assert_eq!(points[0].avg_response_time, 120);
}

#[test]
fn day_with_no_timings_reports_zero_and_no_samples() {
    let history = records(
        r#"[
          {"date":"2024-01-02","test_type":"tool","total":3,"success_count":3,"success_rate":1.0,"avg_response_time":null}
        ]"#,
    );
    let points = aggregate(&history);

    assert_eq!(points[0].success_rate, 100.0);
    assert_eq!(points[0].avg_response_time, 0);
    assert_eq!(points[0].timed_samples, 0);
    assert_eq!(points[0].response_time(), None);
}

#[test]
fn empty_day_has_zero_rate() {
    let history = records(
        r#"[{"date":"2024-01-03","test_type":"speed","total":0,"success_count":0,"success_rate":0,"avg_response_time":null}]"#,
    );
    let points = aggregate(&history);
    assert_eq!(points[0].total, 0);
    assert_eq!(points[0].success_rate, 0.0);
}

#[test]
fn dates_keep_first_appearance_order() {
    let history = records(
        r#"[
          {"date":"2024-01-02","test_type":"speed","total":1,"success_count":1,"success_rate":1,"avg_response_time":50},
          {"date":"2024-01-01","test_type":"speed","total":1,"success_count":0,"success_rate":0,"avg_response_time":70},
          {"date":"2024-01-02","test_type":"code","total":1,"success_count":0,"success_rate":0,"avg_response_time":90}
        ]"#,
    );
    let dates: Vec<String> = aggregate(&history).into_iter().map(|p| p.date).collect();
    assert_eq!(dates, vec!["2024-01-02", "2024-01-01"]);
}

// ---------------------------------------------------------------------------
// Snapshot fetch
// ---------------------------------------------------------------------------

#[test]
fn fetch_snapshot_queries_all_three_endpoints() {
    let backend = FakeBackend::start(analytics_handler);

    let snap = fetch_snapshot(&backend.client(), DayRange::Fortnight).unwrap();

    assert_eq!(snap.days, DayRange::Fortnight);
    assert_eq!(snap.history.len(), 2);
    assert_eq!(snap.trend.len(), 1);
    assert_eq!(snap.trend[0].date, "2024-05-14");
    assert_eq!(snap.comparison[0].model_name, "gpt-4o");
    assert_eq!(snap.distribution.len(), 2);

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| days_of(&r.url) == Some(14)));
}

#[test]
fn one_failing_endpoint_fails_the_whole_fetch() {
    let backend = FakeBackend::start(|method, url, body| {
        if url.starts_with("/api/analytics/model-comparison") {
            (500, r#"{"detail":"database is locked"}"#.to_string())
        } else {
            analytics_handler(method, url, body)
        }
    });

    let err = fetch_snapshot(&backend.client(), DayRange::Week).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("model comparison"), "{message}");
    assert!(message.contains("database is locked"), "{message}");
}

// ---------------------------------------------------------------------------
// Shared view
// ---------------------------------------------------------------------------

#[test]
fn failed_refresh_keeps_previous_snapshot() {
    let backend = FakeBackend::start(|method, url, body| {
        if days_of(url) == Some(30) {
            (503, r#"{"detail":"maintenance"}"#.to_string())
        } else {
            analytics_handler(method, url, body)
        }
    });
    let client = backend.client();
    let view = AnalyticsView::new();

    assert_eq!(view.refresh(&client, DayRange::Week).outcome, Outcome::Applied);
    let failed = view.refresh(&client, DayRange::Month);
    assert_eq!(failed.outcome, Outcome::Failed);
    assert!(failed.error.unwrap().contains("maintenance"));

    let kept = view.snapshot().unwrap();
    assert_eq!(kept.days, DayRange::Week);
}

#[test]
fn slow_earlier_refresh_never_overwrites_a_newer_one() {
    let backend = FakeBackend::start(|method, url, body| {
        if days_of(url) == Some(30) {
            thread::sleep(Duration::from_millis(400));
        }
        analytics_handler(method, url, body)
    });
    let client = backend.client();
    let view = Arc::new(AnalyticsView::new());

    let slow = {
        let view = Arc::clone(&view);
        let client = client.clone();
        thread::spawn(move || view.refresh(&client, DayRange::Month))
    };
    // Let the 30-day refresh take its ticket before the 7-day one starts.
    thread::sleep(Duration::from_millis(100));
    let fast = view.refresh(&client, DayRange::Week);
    let slow = slow.join().unwrap();

    assert_eq!(fast.outcome, Outcome::Applied);
    assert_eq!(slow.outcome, Outcome::Stale);
    assert_eq!(view.snapshot().unwrap().days, DayRange::Week);
}
