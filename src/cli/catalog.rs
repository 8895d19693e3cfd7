//! `aiswitch channels ...` and `aiswitch models ...`: catalog management.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{Console, OutputFormat, to_csv, truncate};
use crate::backend::import;
use crate::backend::types::{
    Channel, ChannelCreate, ChannelUpdate, Model, ModelCreate, ModelRanking, ModelUpdate,
};

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

pub fn run_channels_list(console: &Console, format: OutputFormat) -> Result<()> {
    let channels = console.client.list_channels()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&channels)?),
        OutputFormat::Csv => print!(
            "{}",
            to_csv(
                &["id", "name", "base_url", "auth_type", "is_active"],
                channels.iter().map(|c| {
                    [
                        c.id.to_string(),
                        c.name.clone(),
                        c.base_url.clone(),
                        c.auth_type.to_string(),
                        c.is_active.to_string(),
                    ]
                }),
            )?
        ),
        OutputFormat::Table => {
            if channels.is_empty() {
                println!("{}", "No channels configured.".yellow());
                return Ok(());
            }
            println!(
                "  {:>4}  {:<20} {:<40} {:<8} {}",
                "ID", "Name", "Base URL", "Auth", "Active"
            );
            println!("  {}", "-".repeat(82));
            for c in &channels {
                println!(
                    "  {:>4}  {:<20} {:<40} {:<8} {}",
                    c.id,
                    truncate(&c.name, 20),
                    truncate(&c.base_url, 40),
                    c.auth_type,
                    active_mark(c.is_active)
                );
            }
        }
    }
    Ok(())
}

pub fn run_channel_show(console: &Console, id: i64) -> Result<()> {
    let channel = console.client.get_channel(id)?;
    print_channel(&channel);
    Ok(())
}

pub fn run_channel_add(console: &Console, channel: &ChannelCreate) -> Result<()> {
    let created = console.record(
        "channel.create",
        &channel.name,
        console.client.create_channel(channel),
    )?;
    println!(
        "{} Created channel {} (id {})",
        "✓".green().bold(),
        created.name.bold(),
        created.id
    );
    Ok(())
}

pub fn run_channel_update(console: &Console, id: i64, update: &ChannelUpdate) -> Result<()> {
    if update.is_empty() {
        anyhow::bail!("nothing to update; pass at least one field");
    }
    let updated = console.record(
        "channel.update",
        &id.to_string(),
        console.client.update_channel(id, update),
    )?;
    println!("{} Updated channel {}", "✓".green().bold(), updated.name.bold());
    Ok(())
}

pub fn run_channel_delete(console: &Console, id: i64) -> Result<()> {
    let message = console.record(
        "channel.delete",
        &id.to_string(),
        console.client.delete_channel(id),
    )?;
    println!("{} {}", "✓".green().bold(), message);
    Ok(())
}

fn print_channel(c: &Channel) {
    println!("{}", c.name.bold().cyan());
    println!("  {:<12} {}", "ID", c.id);
    println!("  {:<12} {}", "Base URL", c.base_url);
    println!("  {:<12} {}", "Auth", c.auth_type);
    println!(
        "  {:<12} {}",
        "API key",
        c.api_key.as_deref().map(mask_key).unwrap_or_else(|| "-".to_string())
    );
    if let Some(headers) = &c.headers
        && !headers.is_empty()
    {
        println!("  {:<12}", "Headers");
        for (k, v) in headers {
            println!("    {k}: {v}");
        }
    }
    println!("  {:<12} {}", "Active", active_mark(c.is_active));
    println!("  {:<12} {}", "Created", c.created_at.dimmed());
    if let Some(updated) = &c.updated_at {
        println!("  {:<12} {}", "Updated", updated.dimmed());
    }
}

/// Show only the last four characters of a secret.
pub(crate) fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(8))
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

pub fn run_models_list(console: &Console, channel_id: Option<i64>, format: OutputFormat) -> Result<()> {
    let models = console.client.list_models(channel_id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        OutputFormat::Csv => print!(
            "{}",
            to_csv(
                &[
                    "id",
                    "channel_id",
                    "name",
                    "model_identifier",
                    "supports_tools",
                    "supports_vision",
                    "is_active",
                ],
                models.iter().map(|m| {
                    [
                        m.id.to_string(),
                        m.channel_id.to_string(),
                        m.name.clone(),
                        m.model_identifier.clone(),
                        m.supports_tools.to_string(),
                        m.supports_vision.to_string(),
                        m.is_active.to_string(),
                    ]
                }),
            )?
        ),
        OutputFormat::Table => {
            if models.is_empty() {
                println!("{}", "No models found.".yellow());
                return Ok(());
            }
            println!(
                "  {:>4} {:>5}  {:<24} {:<28} {:<6} {:<6} {}",
                "ID", "Chan", "Name", "Identifier", "Tools", "Vision", "Active"
            );
            println!("  {}", "-".repeat(86));
            for m in &models {
                println!(
                    "  {:>4} {:>5}  {:<24} {:<28} {:<6} {:<6} {}",
                    m.id,
                    m.channel_id,
                    truncate(m.display_name.as_deref().unwrap_or(&m.name), 24),
                    truncate(&m.model_identifier, 28),
                    yes_no(m.supports_tools),
                    yes_no(m.supports_vision),
                    active_mark(m.is_active)
                );
            }
        }
    }
    Ok(())
}

pub fn run_model_show(console: &Console, id: i64) -> Result<()> {
    let model = console.client.get_model(id)?;
    print_model(&model);
    Ok(())
}

pub fn run_model_add(console: &Console, model: &ModelCreate) -> Result<()> {
    let created = console.record(
        "model.create",
        &format!("{} (channel {})", model.spec.model_identifier, model.channel_id),
        console.client.create_model(model),
    )?;
    println!(
        "{} Created model {} (id {})",
        "✓".green().bold(),
        created.name.bold(),
        created.id
    );
    Ok(())
}

pub fn run_model_update(console: &Console, id: i64, update: &ModelUpdate) -> Result<()> {
    if update.is_empty() {
        anyhow::bail!("nothing to update; pass at least one field");
    }
    let updated = console.record(
        "model.update",
        &id.to_string(),
        console.client.update_model(id, update),
    )?;
    println!("{} Updated model {}", "✓".green().bold(), updated.name.bold());
    Ok(())
}

pub fn run_model_delete(console: &Console, id: i64) -> Result<()> {
    let message = console.record(
        "model.delete",
        &id.to_string(),
        console.client.delete_model(id),
    )?;
    println!("{} {}", "✓".green().bold(), message);
    Ok(())
}

/// Import models from a CSV file.
pub fn run_models_import(console: &Console, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let summary = console.record(
        "model.import",
        &path.display().to_string(),
        import::import_models(&console.client, &text),
    )?;

    println!(
        "{} Imported {} models from {}",
        if summary.errors.is_empty() {
            "✓".green().bold()
        } else {
            "!".yellow().bold()
        },
        summary.imported,
        path.display()
    );
    for error in &summary.errors {
        println!("  {} {}", "✗".red(), error);
    }
    Ok(())
}

pub fn run_models_ranking(console: &Console, format: OutputFormat) -> Result<()> {
    let rankings = console.client.model_rankings()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rankings)?),
        OutputFormat::Csv => print!(
            "{}",
            to_csv(
                &["rank", "id", "name", "model_identifier", "channel", "score"],
                rankings.iter().map(|r| {
                    [
                        r.rank.to_string(),
                        r.id.to_string(),
                        r.name.clone(),
                        r.model_identifier.clone(),
                        r.channel.name.clone(),
                        format!("{:.4}", r.score),
                    ]
                }),
            )?
        ),
        OutputFormat::Table => print_rankings(&rankings),
    }
    Ok(())
}

fn print_rankings(rankings: &[ModelRanking]) {
    if rankings.is_empty() {
        println!("{}", "No active models.".yellow());
        return;
    }
    println!("{}", "Model Ranking".bold().cyan());
    println!(
        "  {:>5}  {:<26} {:<20} {:>8}",
        "Rank", "Model", "Channel", "Score"
    );
    println!("  {}", "-".repeat(62));
    for r in rankings {
        let rank = if r.is_ranked() {
            format!("#{}", r.rank)
        } else {
            "-".to_string()
        };
        let line = format!(
            "  {:>5}  {:<26} {:<20} {:>8.3}",
            rank,
            truncate(&r.name, 26),
            truncate(&r.channel.name, 20),
            r.score
        );
        if r.is_ranked() {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_model(m: &Model) {
    println!("{}", m.display_name.as_deref().unwrap_or(&m.name).bold().cyan());
    println!("  {:<16} {}", "ID", m.id);
    println!("  {:<16} {}", "Channel", m.channel_id);
    println!("  {:<16} {}", "Name", m.name);
    println!("  {:<16} {}", "Identifier", m.model_identifier);
    if let Some(ctx) = m.context_window {
        println!("  {:<16} {}", "Context window", ctx);
    }
    if let Some(max) = m.max_tokens {
        println!("  {:<16} {}", "Max tokens", max);
    }
    println!("  {:<16} {}", "Tools", yes_no(m.supports_tools));
    println!("  {:<16} {}", "Vision", yes_no(m.supports_vision));
    if m.cost_input.is_some() || m.cost_output.is_some() {
        println!(
            "  {:<16} in {} / out {}",
            "Cost (per 1K)",
            super::fmt_opt(m.cost_input, 4),
            super::fmt_opt(m.cost_output, 4)
        );
    }
    println!("  {:<16} {}", "Active", active_mark(m.is_active));
    println!("  {:<16} {}", "Created", m.created_at.dimmed());
}

fn active_mark(active: bool) -> colored::ColoredString {
    if active {
        "✓".green()
    } else {
        "✗".red()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_key_keeps_tail() {
        assert_eq!(mask_key("sk-abcdef123456"), "********3456");
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key(""), "");
    }
}
