//! Console activity log, one JSON line per operator action.
//!
//! Records mutations (channel/model edits, imports), triggered test runs,
//! config generation and failed analytics refreshes, so an operator can see
//! what was changed from this console and when.
//!
//! Log file: `~/.aiswitch/activity.jsonl` (configurable via `logging.path`).

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Activity entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    /// Short action name, e.g. `"channel.create"` or `"test.run"`.
    pub action: String,
    /// Free-form human-readable detail.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(default = "default_true")]
    pub success: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Record an action. Best-effort; failures are logged at debug level and
/// otherwise ignored.
pub fn record(logging: &LoggingConfig, action: &str, detail: &str, success: bool) {
    if !logging.enabled {
        return;
    }

    let entry = ActivityEntry {
        timestamp: Utc::now().to_rfc3339(),
        action: action.to_string(),
        detail: detail.to_string(),
        success,
    };

    if let Err(e) = append_entry(&activity_log_path(logging), &entry) {
        tracing::debug!(error = %e, "could not write activity log");
    }
}

/// Record the outcome of a fallible action and pass the result through.
pub fn record_result<T>(logging: &LoggingConfig, action: &str, detail: &str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => record(logging, action, detail, true),
        Err(e) => record(logging, action, &format!("{detail}: {e:#}"), false),
    }
    result
}

/// Resolved path of the activity log.
pub fn activity_log_path(logging: &LoggingConfig) -> PathBuf {
    config::expand_home(&logging.path)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

pub fn append_entry(path: &Path, entry: &ActivityEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Read all entries, silently skipping malformed lines. Returns an empty vec
/// if the file does not exist or cannot be read.
pub fn read_entries(path: &Path) -> Vec<ActivityEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(std::result::Result::ok)
        .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
        .collect()
}

/// The `limit` most recent entries, newest last.
pub fn read_recent(path: &Path, limit: usize) -> Vec<ActivityEntry> {
    let entries = read_entries(path);
    let skip = entries.len().saturating_sub(limit);
    entries.into_iter().skip(skip).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
