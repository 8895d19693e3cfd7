//! Trend aggregation for the analytics view.
//!
//! The backend reports one [`DailyTestRecord`] per day × test type. The
//! trend chart plots one point per day, so records sharing a date are folded
//! together: totals are summed, the success rate is recomputed from the raw
//! counts, and the per-type latencies are averaged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::backend::types::DailyTestRecord;

/// One day of the combined trend, across all test types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDayPoint {
    pub date: String,
    pub total: u64,
    /// Percentage in `[0, 100]`, one decimal place. `0` when `total` is `0`.
    pub success_rate: f64,
    /// Mean latency in milliseconds, rounded. `0` when no record for the day
    /// carried a timing, so check `timed_samples` before reading it as "fast".
    pub avg_response_time: u64,
    /// Number of records that contributed to `avg_response_time`.
    pub timed_samples: usize,
}

impl AggregatedDayPoint {
    /// Latency for display, `None` when the day had no timed samples.
    pub fn response_time(&self) -> Option<u64> {
        (self.timed_samples > 0).then_some(self.avg_response_time)
    }
}

#[derive(Debug, Default)]
struct DayAccumulator {
    total: u64,
    success_sum: u64,
    time_sum: f64,
    time_count: usize,
}

/// Fold per-type daily records into one point per distinct date.
///
/// Output order is the order in which each date first appears in `records`;
/// the backend already sorts by date, so nothing is re-sorted here.
pub fn aggregate(records: &[DailyTestRecord]) -> Vec<AggregatedDayPoint> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut days: Vec<(&str, DayAccumulator)> = Vec::new();

    for record in records {
        let slot = *index.entry(record.date.as_str()).or_insert_with(|| {
            days.push((record.date.as_str(), DayAccumulator::default()));
            days.len() - 1
        });

        let acc = &mut days[slot].1;
        acc.total += record.total;
        acc.success_sum += record.success_count;
        if let Some(ms) = record.avg_response_time {
            acc.time_sum += ms;
            acc.time_count += 1;
        }
    }

    days.into_iter()
        .map(|(date, acc)| AggregatedDayPoint {
            date: date.to_string(),
            total: acc.total,
            success_rate: if acc.total > 0 {
                round1(acc.success_sum as f64 / acc.total as f64 * 100.0)
            } else {
                0.0
            },
            avg_response_time: if acc.time_count > 0 {
                (acc.time_sum / acc.time_count as f64).round() as u64
            } else {
                0
            },
            timed_samples: acc.time_count,
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, test_type: &str, total: u64, ok: u64, ms: Option<f64>) -> DailyTestRecord {
        DailyTestRecord {
            date: date.to_string(),
            test_type: test_type.to_string(),
            total,
            success_count: ok,
            success_rate: 0.0,
            avg_response_time: ms,
        }
    }

    #[test]
    fn merges_test_types_sharing_a_date() {
        let records = vec![
            record("2024-01-01", "speed", 10, 8, Some(120.0)),
            record("2024-01-01", "code", 5, 5, None),
        ];
        let points = aggregate(&records);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2024-01-01");
        assert_eq!(points[0].total, 15);
        assert_eq!(points[0].success_rate, 86.7);
        assert_eq!(points[0].avg_response_time, 120);
        assert_eq!(points[0].timed_samples, 1);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn zero_totals_do_not_divide() {
        let records = vec![
            record("2024-01-01", "speed", 0, 0, None),
            record("2024-01-02", "speed", 0, 0, None),
        ];
        let points = aggregate(&records);

        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.success_rate == 0.0));
        assert!(points.iter().all(|p| p.avg_response_time == 0));
    }

    #[test]
    fn null_timings_yield_zero_and_no_samples() {
        let points = aggregate(&[record("2024-03-01", "tool", 4, 2, None)]);
        assert_eq!(points[0].avg_response_time, 0);
        assert_eq!(points[0].response_time(), None);
    }

    #[test]
    fn averages_only_present_timings() {
        let records = vec![
            record("2024-03-01", "speed", 1, 1, Some(100.0)),
            record("2024-03-01", "code", 1, 0, None),
            record("2024-03-01", "tool", 1, 1, Some(251.0)),
        ];
        let points = aggregate(&records);
        // (100 + 251) / 2 = 175.5
        assert_eq!(points[0].avg_response_time, 176);
        assert_eq!(points[0].timed_samples, 2);
        assert_eq!(points[0].success_rate, 66.7);
    }

    #[test]
    fn preserves_first_seen_order_without_sorting() {
        let records = vec![
            record("2024-01-03", "speed", 1, 1, None),
            record("2024-01-01", "speed", 1, 1, None),
            record("2024-01-03", "code", 1, 0, None),
            record("2024-01-02", "speed", 1, 1, None),
        ];
        let dates: Vec<String> = aggregate(&records).into_iter().map(|p| p.date).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-01", "2024-01-02"]);
    }

    #[test]
    fn ignores_backend_success_rate() {
        let mut r = record("2024-01-01", "speed", 4, 1, None);
        r.success_rate = 0.99;
        assert_eq!(aggregate(&[r])[0].success_rate, 25.0);
    }

    #[test]
    fn is_idempotent() {
        let records = vec![
            record("2024-01-01", "speed", 3, 2, Some(90.5)),
            record("2024-01-02", "code", 7, 7, Some(300.0)),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn success_rate_stays_in_bounds() {
        let records: Vec<DailyTestRecord> = (0..20)
            .map(|i| record(&format!("d{}", i % 5), "speed", 1 + i, i / 2, None))
            .collect();
        for point in aggregate(&records) {
            assert!((0.0..=100.0).contains(&point.success_rate), "{point:?}");
        }
    }

    #[test]
    fn serializes_with_chart_field_names() {
        let points = aggregate(&[record("2024-01-01", "speed", 2, 1, Some(10.0))]);
        let json = serde_json::to_string(&points[0]).unwrap();
        assert!(json.contains("\"successRate\":50.0"));
        assert!(json.contains("\"avgResponseTime\":10"));
        assert!(json.contains("\"timedSamples\":1"));
    }
}
