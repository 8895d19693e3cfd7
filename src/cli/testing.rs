//! `aiswitch test ...`: trigger test runs and inspect results.

use anyhow::Result;
use colored::Colorize;

use super::{Console, OutputFormat, fmt_opt, to_csv, truncate};
use crate::backend::types::{ModelHealth, TestType};

/// Queue tests for `model_ids`. The backend runs them asynchronously.
pub fn run_test(console: &Console, model_ids: &[i64], test_type: TestType) -> Result<()> {
    let ids = model_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let ack = console.record(
        "test.run",
        &format!("models {ids} ({test_type})"),
        console.client.run_tests(model_ids, test_type),
    )?;
    println!("{} {}", "✓".green().bold(), ack.message);
    println!(
        "  {}",
        "Results appear under `aiswitch test results` once the run completes.".dimmed()
    );
    Ok(())
}

pub fn run_results(console: &Console, limit: u32, model_id: Option<i64>, format: OutputFormat) -> Result<()> {
    let rows = console.client.test_results(limit, model_id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => print!(
            "{}",
            to_csv(
                &[
                    "created_at",
                    "model_id",
                    "model_name",
                    "test_type",
                    "success",
                    "response_time_ms",
                    "error",
                ],
                rows.iter().map(|r| {
                    [
                        r.created_at.clone(),
                        r.model_id.to_string(),
                        r.model_name.clone(),
                        r.test_type.to_string(),
                        r.success.to_string(),
                        r.response_time
                            .map(|s| (s * 1000.0).round().to_string())
                            .unwrap_or_default(),
                        r.error_message.clone().unwrap_or_default(),
                    ]
                }),
            )?
        ),
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No test results yet.".yellow());
                return Ok(());
            }
            println!(
                "  {:<19} {:<24} {:<6} {:<4} {:>9}  {}",
                "Time", "Model", "Type", "OK", "Time (ms)", "Error"
            );
            println!("  {}", "-".repeat(86));
            for r in &rows {
                let ok = if r.success { "✓".green() } else { "✗".red() };
                println!(
                    "  {:<19} {:<24} {:<6} {:<4} {:>9}  {}",
                    truncate(&r.created_at, 19),
                    truncate(&r.model_name, 24),
                    r.test_type,
                    ok,
                    fmt_opt(r.response_time.map(|s| s * 1000.0), 0),
                    truncate(r.error_message.as_deref().unwrap_or(""), 30).dimmed()
                );
            }
        }
    }
    Ok(())
}

pub fn run_model_health(console: &Console, model_id: i64) -> Result<()> {
    let health = console.client.model_health(model_id)?;
    print_model_health(&health);
    Ok(())
}

fn print_model_health(h: &ModelHealth) {
    let name = h
        .model_name
        .clone()
        .unwrap_or_else(|| format!("model {}", h.model_id));
    println!("{} {}", name.bold().cyan(), status_label(&h.status));
    if let Some(rate) = h.success_rate {
        println!("  {:<16} {:.1}%", "Success rate", rate);
    }
    if let Some(avg) = h.avg_response_time_ms {
        println!("  {:<16} {:.0} ms", "Avg response", avg);
    }
    if let Some(n) = h.recent_tests {
        println!("  {:<16} {}", "Recent tests", n);
    }
    if let Some(msg) = &h.message {
        println!("  {}", msg.dimmed());
    }
}

pub(crate) fn status_label(status: &str) -> colored::ColoredString {
    match status {
        "healthy" => status.green().bold(),
        "degraded" => status.yellow().bold(),
        "unhealthy" | "error" => status.red().bold(),
        _ => status.dimmed(),
    }
}

pub fn run_rerank(console: &Console) -> Result<()> {
    let message = console.record("ranking.update", "", console.client.update_rankings())?;
    println!("{} {}", "✓".green().bold(), message);
    Ok(())
}
