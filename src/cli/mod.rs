//! CLI command implementations for the console.
//!
//! Provides subcommand handlers for:
//! - `aiswitch analytics --days N`: trend, model comparison, type distribution
//! - `aiswitch performance <model>`: one model's daily performance
//! - `aiswitch channels|models ...`: catalog management (see [`catalog`])
//! - `aiswitch test ...`: trigger tests and inspect results (see [`testing`])
//! - `aiswitch generate`: downstream config generation
//! - `aiswitch health`: backend reachability and local config status
//! - `aiswitch activity`: recent console actions
//! - `aiswitch config show|init|set|reset`: console configuration management

pub mod catalog;
pub mod testing;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::activity;
use crate::analytics::range::DayRange;
use crate::analytics::snapshot::{self, AnalyticsSnapshot};
use crate::backend::BackendClient;
use crate::backend::types::{DetailedHealth, HealthCheck, PerformanceTrends};
use crate::config::{self, ConsoleConfig};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Resolved configuration plus the backend client built from it.
#[derive(Debug, Clone)]
pub struct Console {
    pub config: ConsoleConfig,
    pub client: BackendClient,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Self {
        let client = BackendClient::from_config(&config.backend);
        Self { config, client }
    }

    /// Append to the activity log.
    pub(crate) fn record<T>(&self, action: &str, detail: &str, result: Result<T>) -> Result<T> {
        activity::record_result(&self.config.logging, action, detail, result)
    }
}

// ---------------------------------------------------------------------------
// aiswitch analytics
// ---------------------------------------------------------------------------

/// Show the analytics overview for the last `days` days.
pub fn run_analytics(console: &Console, days: Option<u32>, format: OutputFormat) -> Result<()> {
    let range = resolve_days(console, days)?;
    let snap = match snapshot::fetch_snapshot(&console.client, range) {
        Ok(snap) => snap,
        Err(e) => {
            activity::record(&console.config.logging, "analytics.fetch", &format!("{e:#}"), false);
            return Err(e);
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snap)?),
        OutputFormat::Csv => print!("{}", trend_csv(&snap)?),
        OutputFormat::Table => print_analytics_table(&snap),
    }

    Ok(())
}

fn resolve_days(console: &Console, days: Option<u32>) -> Result<DayRange> {
    match days {
        None => Ok(console.config.analytics.default_days),
        Some(d) => DayRange::from_days(d)
            .with_context(|| format!("unsupported day range {d} (use 7, 14 or 30)")),
    }
}

fn print_analytics_table(snap: &AnalyticsSnapshot) {
    println!(
        "{}",
        format!("Test Analytics: Last {} Days", snap.days).bold().cyan()
    );
    println!("{}", "=".repeat(56));

    println!();
    println!("{}", "Trend".bold().cyan());
    if snap.trend.is_empty() {
        println!("  {}", "No data.".yellow());
    } else {
        println!(
            "  {:<12} {:>8} {:>10} {:>12}",
            "Date", "Tests", "Success", "Avg (ms)"
        );
        println!("  {}", "-".repeat(45));
        for point in &snap.trend {
            println!(
                "  {:<12} {:>8} {} {:>12}",
                truncate(&point.date, 12),
                format_number(point.total),
                colorize_rate(point.success_rate, 10),
                point
                    .response_time()
                    .map(format_number)
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    println!();
    println!("{}", "Model Comparison".bold().cyan());
    if snap.comparison.is_empty() {
        println!("  {}", "No data.".yellow());
    } else {
        println!(
            "  {:<24} {:>7} {:>10} {:>10} {:>8}",
            "Model", "Tests", "Success", "Avg (ms)", "Quality"
        );
        println!("  {}", "-".repeat(63));
        for (i, m) in snap.comparison.iter().enumerate() {
            let line = format!(
                "  {:<24} {:>7} {} {:>10} {:>8}",
                truncate(&m.model_name, 24),
                format_number(m.total_tests),
                colorize_rate(m.success_rate, 10),
                fmt_opt(m.avg_response_time, 0),
                fmt_opt(m.avg_quality, 2),
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
    }

    println!();
    println!("{}", "Test Type Distribution".bold().cyan());
    if snap.distribution.is_empty() {
        println!("  {}", "No data.".yellow());
    } else {
        let total: u64 = snap.distribution.iter().map(|d| d.count).sum();
        for d in &snap.distribution {
            let share = if total == 0 {
                0.0
            } else {
                d.count as f64 / total as f64 * 100.0
            };
            println!(
                "  {:<10} {:>7} ({:>5.1}%)  success {}",
                d.test_type,
                format_number(d.count),
                share,
                colorize_rate(d.success_rate, 0),
            );
        }
    }
}

fn trend_csv(snap: &AnalyticsSnapshot) -> Result<String> {
    to_csv(
        &["date", "total", "success_rate", "avg_response_time", "timed_samples"],
        snap.trend.iter().map(|p| {
            [
                p.date.clone(),
                p.total.to_string(),
                format!("{:.1}", p.success_rate),
                p.avg_response_time.to_string(),
                p.timed_samples.to_string(),
            ]
        }),
    )
}

// ---------------------------------------------------------------------------
// aiswitch performance
// ---------------------------------------------------------------------------

/// Show one model's day-by-day performance.
pub fn run_performance(console: &Console, model_id: i64, days: u32, format: OutputFormat) -> Result<()> {
    let trends = console.client.performance_trends(model_id, days)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trends)?),
        OutputFormat::Csv => print!("{}", performance_csv(&trends)?),
        OutputFormat::Table => print_performance_table(&trends, days),
    }
    Ok(())
}

fn print_performance_table(trends: &PerformanceTrends, days: u32) {
    println!(
        "{}",
        format!("{}: Last {} Days", trends.model_name, days).bold().cyan()
    );
    println!("{}", "=".repeat(60));

    if trends.trends.is_empty() {
        println!("  {}", format!("No tests in the last {days} days.").yellow());
        return;
    }

    println!(
        "  {:<12} {:>6} {:>10} {:>9} {:>9} {:>9}",
        "Date", "Tests", "Success", "Avg ms", "Min ms", "Max ms"
    );
    println!("  {}", "-".repeat(58));
    for t in &trends.trends {
        println!(
            "  {:<12} {:>6} {} {:>9} {:>9} {:>9}",
            truncate(&t.date, 12),
            t.total,
            colorize_rate(t.success_rate, 10),
            fmt_opt(t.avg_response_time, 0),
            fmt_opt(t.min_response_time, 0),
            fmt_opt(t.max_response_time, 0),
        );
    }
}

fn performance_csv(trends: &PerformanceTrends) -> Result<String> {
    to_csv(
        &[
            "date",
            "total",
            "success_count",
            "success_rate",
            "avg_response_time",
            "min_response_time",
            "max_response_time",
        ],
        trends.trends.iter().map(|t| {
            [
                t.date.clone(),
                t.total.to_string(),
                t.success_count.to_string(),
                format!("{:.2}", t.success_rate),
                csv_opt(t.avg_response_time),
                csv_opt(t.min_response_time),
                csv_opt(t.max_response_time),
            ]
        }),
    )
}

// ---------------------------------------------------------------------------
// aiswitch generate
// ---------------------------------------------------------------------------

/// Generate the downstream config and print it or write it to `output`.
pub fn run_generate(console: &Console, top_n: u32, channel_id: Option<i64>, output: Option<&Path>) -> Result<()> {
    let scope = match channel_id {
        Some(id) => format!("channel {id}, top {top_n}"),
        None => format!("top {top_n}"),
    };
    let generated = console.record(
        "config.generate",
        &scope,
        console.client.generate_config(top_n, channel_id),
    )?;

    match output {
        Some(path) => {
            fs::write(path, &generated.config)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} Config for {} models written to {}",
                "✓".green().bold(),
                generated.models_count,
                path.display()
            );
        }
        None => println!("{}", generated.config),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// aiswitch health
// ---------------------------------------------------------------------------

/// Check backend reachability and local configuration.
pub fn run_health(console: &Console) -> Result<()> {
    println!("{}", "aiswitch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.aiswitch/config.toml found"
        } else {
            "not found (run `aiswitch config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".aiswitch.toml found"
        } else {
            "none (optional)"
        },
    );

    match console.client.health() {
        Ok(body) => {
            let version = body
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown version");
            print_health_item(
                "Backend",
                true,
                &format!("reachable at {} ({version})", console.client.base_url()),
            );
            match console.client.detailed_health() {
                Ok(detailed) => print_detailed_health(&detailed),
                Err(e) => {
                    tracing::debug!(error = %format!("{e:#}"), "detailed health unavailable");
                    println!("    {}", "detailed checks unavailable".dimmed());
                }
            }
        }
        Err(e) => print_health_item(
            "Backend",
            false,
            &format!("{}: {e}", console.client.base_url()),
        ),
    }

    let log_path = activity::activity_log_path(&console.config.logging);
    let log_exists = log_path.exists();
    print_health_item(
        "Activity log",
        log_exists || !console.config.logging.enabled,
        &if !console.config.logging.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{} entries", activity::read_entries(&log_path).len())
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_detailed_health(health: &DetailedHealth) {
    println!("    {:<14} {}", "overall", testing::status_label(&health.status));
    for (name, check) in &health.checks {
        println!(
            "    {:<14} {} {}",
            name,
            testing::status_label(&check.status),
            check_summary(check).dimmed()
        );
    }
}

/// The check's message, or its figures as `key=value` pairs.
fn check_summary(check: &HealthCheck) -> String {
    if let Some(message) = &check.message {
        return message.clone();
    }
    check
        .metrics
        .iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// aiswitch activity
// ---------------------------------------------------------------------------

/// Show the most recent console actions.
pub fn run_activity(console: &Console, limit: usize, format: OutputFormat) -> Result<()> {
    let entries = activity::read_recent(&activity::activity_log_path(&console.config.logging), limit);

    if entries.is_empty() {
        println!("{}", "No activity recorded yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => print!(
            "{}",
            to_csv(
                &["timestamp", "action", "success", "detail"],
                entries.iter().map(|e| {
                    [
                        e.timestamp.clone(),
                        e.action.clone(),
                        e.success.to_string(),
                        e.detail.clone(),
                    ]
                }),
            )?
        ),
        OutputFormat::Table => {
            for e in &entries {
                let mark = if e.success { "✓".green() } else { "✗".red() };
                println!(
                    "  {} {} {:<18} {}",
                    mark,
                    e.timestamp.get(..19).unwrap_or(&e.timestamp).dimmed(),
                    e.action,
                    e.detail
                );
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// aiswitch config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective aiswitch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.aiswitch/config.toml", global_exists);
    print_source(".aiswitch.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "AISWITCH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.aiswitch/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Right-aligned percentage, green ≥ 80, yellow ≥ 50, red below.
pub(crate) fn colorize_rate(rate: f64, width: usize) -> colored::ColoredString {
    let text = format!("{:>width$}", format!("{rate:.1}%"));
    if rate >= 80.0 {
        text.green()
    } else if rate >= 50.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Optional number with `decimals` places, `-` when absent.
pub(crate) fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "-".to_string())
}

fn csv_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render a header and rows as CSV text, quoting fields as needed.
pub(crate) fn to_csv<R>(header: &[&str], rows: impl IntoIterator<Item = R>) -> Result<String>
where
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV output: {e}"))?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::DailyTestRecord;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("通义千问大模型", 4), "通义千…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(123.456), 0), "123");
        assert_eq!(fmt_opt(Some(4.256), 2), "4.26");
        assert_eq!(fmt_opt(None, 2), "-");
    }

    #[test]
    fn test_to_csv_quotes_when_needed() {
        let out = to_csv(
            &["name", "detail"],
            [["plain", "a,b"], ["say \"hi\"", "two\nlines"]],
        )
        .unwrap();
        assert_eq!(
            out,
            "name,detail\nplain,\"a,b\"\n\"say \"\"hi\"\"\",\"two\nlines\"\n"
        );
    }

    #[test]
    fn trend_csv_quotes_dates() {
        let history = vec![DailyTestRecord {
            date: "May 1, 2024".to_string(),
            test_type: "speed".to_string(),
            total: 4,
            success_count: 3,
            success_rate: 0.75,
            avg_response_time: None,
        }];
        let snap = AnalyticsSnapshot::from_parts(DayRange::Week, history, Vec::new(), Vec::new());

        assert_eq!(
            trend_csv(&snap).unwrap(),
            "date,total,success_rate,avg_response_time,timed_samples\n\"May 1, 2024\",4,75.0,0,0\n"
        );
    }

    #[test]
    fn check_summary_prefers_message_then_metrics() {
        let db: HealthCheck = serde_json::from_str(
            r#"{"status":"healthy","message":"Database connection OK"}"#,
        )
        .unwrap();
        assert_eq!(check_summary(&db), "Database connection OK");

        let system: HealthCheck = serde_json::from_str(
            r#"{"status":"healthy","cpu_percent":12.5,"disk_percent":40}"#,
        )
        .unwrap();
        assert_eq!(check_summary(&system), "cpu_percent=12.5, disk_percent=40");
    }

    #[test]
    fn resolve_days_validates_range() {
        let console = Console::new(ConsoleConfig::default());
        assert_eq!(resolve_days(&console, None).unwrap(), DayRange::Week);
        assert_eq!(resolve_days(&console, Some(30)).unwrap(), DayRange::Month);
        assert!(resolve_days(&console, Some(10)).is_err());
    }
}
