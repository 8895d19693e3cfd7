//! Configuration system for the console.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: hardcoded in [`schema::ConsoleConfig::default()`]
//! 2. **User global config**: `~/.aiswitch/config.toml`
//! 3. **Project local config**: `.aiswitch.toml` in the current working directory
//! 4. **Environment variables**: `AISWITCH_*` overrides (highest precedence)
//!
//! Later layers override earlier ones at the key level: each file is parsed
//! as a raw TOML tree and deep-merged, so a project file that only sets
//! `backend.base_url` keeps everything else from the global file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aiswitch_console::config;
//!
//! let cfg = config::load();
//! let client = BackendClient::from_config(&cfg.backend);
//! ```

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analytics::range::DayRange;

pub use schema::ConsoleConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved console configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for everything that needs
/// configuration.
pub fn load() -> ConsoleConfig {
    let layers: Vec<PathBuf> = [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
        .collect();

    let mut config = load_layers(&layers);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files (in order) over the built-in defaults.
///
/// Missing or malformed files are skipped. A merged tree that no longer
/// matches the schema (e.g. an unsupported `default_days`) falls back to the
/// last layer that did.
pub fn load_layers(paths: &[PathBuf]) -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    let Ok(mut merged) = toml::Value::try_from(&config) else {
        return config;
    };

    for path in paths {
        let Some(layer) = load_toml_value(path) else {
            continue;
        };
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);

        match candidate.clone().try_into::<ConsoleConfig>() {
            Ok(parsed) => {
                merged = candidate;
                config = parsed;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config layer");
            }
        }
    }

    config
}

/// Read a TOML file into a raw value tree.
///
/// Returns `None` if the file doesn't exist or is malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other
/// value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.aiswitch/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".aiswitch").join("config.toml"))
}

/// Path to the project local config: `.aiswitch.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".aiswitch.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `AISWITCH_BACKEND_URL`: backend base URL
/// - `AISWITCH_BACKEND_TIMEOUT_MS`: per-request timeout
/// - `AISWITCH_WEB_ADDR`: dashboard listen address
/// - `AISWITCH_DAYS`: default analytics day range (`7`, `14`, `30`)
/// - `AISWITCH_LOG_LEVEL`: diagnostic level
/// - `AISWITCH_LOGGING`: activity log switch (`1`/`true`/`yes`/`on`)
pub fn apply_env_overrides(config: &mut ConsoleConfig) {
    if let Ok(val) = std::env::var("AISWITCH_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("AISWITCH_BACKEND_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("AISWITCH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("AISWITCH_DAYS")
        && let Some(range) = val.parse::<u32>().ok().and_then(DayRange::from_days)
    {
        config.analytics.default_days = range;
    }
    if let Ok(val) = std::env::var("AISWITCH_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val.to_ascii_lowercase();
    }
    if let Ok(val) = std::env::var("AISWITCH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.aiswitch/config.toml`.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    init_config_at(&path, force)?;
    Ok(path)
}

/// Write the default annotated config to `path`.
///
/// Creates parent directories as needed. Returns an error if the file
/// already exists (use `force = true` to overwrite).
pub fn init_config_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, ConsoleConfig::default_toml()).context("failed to write config file")
}

/// Set a single config key to a value in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

/// Set a single dotted config key (e.g. `backend.base_url`) in the file at
/// `path`, creating the file from defaults if it does not exist.
///
/// The raw value is parsed according to the type of the key in the schema.
/// The update is rejected if the resulting file would no longer load.
pub fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let defaults =
        toml::Value::try_from(ConsoleConfig::default()).context("failed to serialize defaults")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        defaults.clone()
    };

    let template = lookup(&defaults, key)
        .with_context(|| format!("unknown config key: '{key}'"))?;
    let new_value = parse_like(template, key, value)?;
    set_toml_value(&mut root, key, new_value)?;

    let mut check = defaults;
    merge_values(&mut check, root.clone());
    check
        .try_into::<ConsoleConfig>()
        .with_context(|| format!("invalid value for '{key}': '{value}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")
}

/// Look up a dotted key in a TOML value tree.
fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}

/// Parse `raw` into the same TOML type as `template`.
fn parse_like(template: &toml::Value, key: &str, raw: &str) -> Result<toml::Value> {
    let value = match template {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw)),
        toml::Value::Integer(_) => {
            let n: i64 = raw
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw}'"))?;
            toml::Value::Float(f)
        }
        toml::Value::Table(_) => anyhow::bail!("'{key}' is a section, not a value"),
        _ => toml::Value::String(raw.to_string()),
    };
    Ok(value)
}

/// Set a value in a TOML value tree using a dotted key path, creating
/// intermediate tables when they are missing.
fn set_toml_value(root: &mut toml::Value, key: &str, new_value: toml::Value) -> Result<()> {
    let (sections, leaf) = match key.rsplit_once('.') {
        Some((sections, leaf)) => (Some(sections), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for part in sections.into_iter().flat_map(|s| s.split('.')) {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}' in '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{}'", sections.unwrap_or("")))?;
    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn merge_values_is_key_level() {
        let mut base: toml::Value =
            toml::from_str("[backend]\nbase_url = \"a\"\ntimeout_ms = 5\n").unwrap();
        let overlay: toml::Value = toml::from_str("[backend]\ntimeout_ms = 9\n").unwrap();
        merge_values(&mut base, overlay);

        assert_eq!(base["backend"]["base_url"].as_str(), Some("a"));
        assert_eq!(base["backend"]["timeout_ms"].as_integer(), Some(9));
    }

    #[test]
    fn load_layers_applies_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[backend]\nbase_url = \"http://global:8000\"\ntimeout_ms = 3000\n")
            .unwrap();
        fs::write(&project, "[backend]\nbase_url = \"http://project:8000\"\n").unwrap();

        let config = load_layers(&[global, project]);
        assert_eq!(config.backend.base_url, "http://project:8000");
        assert_eq!(config.backend.timeout_ms, 3000);
    }

    #[test]
    fn load_layers_skips_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[backend\nbase_url = ").unwrap();
        let invalid = dir.path().join("invalid.toml");
        fs::write(&invalid, "[analytics]\ndefault_days = 3\n").unwrap();

        let config = load_layers(&[dir.path().join("missing.toml"), broken, invalid]);
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn init_config_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config_at(&path, false).unwrap();
        assert!(init_config_at(&path, false).is_err());
        init_config_at(&path, true).unwrap();
    }

    #[test]
    fn set_config_value_creates_file_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        set_config_value_at(&path, "backend.base_url", "http://api:9000").unwrap();
        set_config_value_at(&path, "web.workers", "8").unwrap();
        set_config_value_at(&path, "web.open_browser", "no").unwrap();

        let config = load_layers(&[path]);
        assert_eq!(config.backend.base_url, "http://api:9000");
        assert_eq!(config.web.workers, 8);
        assert!(!config.web.open_browser);
    }

    #[test]
    fn set_config_value_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\ntimeout_ms = 500\n").unwrap();

        set_config_value_at(&path, "analytics.default_days", "14").unwrap();

        let config = load_layers(&[path]);
        assert_eq!(config.backend.timeout_ms, 500);
        assert_eq!(config.analytics.default_days, DayRange::Fortnight);
    }

    #[test]
    fn set_config_value_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(set_config_value_at(&path, "nonexistent.key", "x").is_err());
        assert!(set_config_value_at(&path, "web.workers", "many").is_err());
        assert!(set_config_value_at(&path, "analytics.default_days", "9").is_err());
        assert!(set_config_value_at(&path, "backend", "x").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/a.jsonl"), PathBuf::from("/tmp/a.jsonl"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x/y"), home.join("x").join("y"));
        }
    }
}
