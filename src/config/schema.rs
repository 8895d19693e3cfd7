//! Configuration schema and defaults for the console.
//!
//! Defines the TOML-serializable configuration structure with all sections:
//! `[backend]`, `[web]`, `[analytics]` and `[logging]`.
//!
//! Every field has a sensible built-in default. Users only need to set the
//! values they want to override.

use serde::{Deserialize, Serialize};

use crate::analytics::range::DayRange;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level console configuration.
///
/// Maps directly to the `~/.aiswitch/config.toml` and `.aiswitch.toml` file
/// schemas. All sections and fields are optional; missing values fall back
/// to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub web: WebConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Location of the backend REST service.
///
/// This is the only place the backend address is defined; every network
/// call receives it through [`crate::backend::BackendClient::from_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, without the `/api` suffix.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address (`host:port`).
    pub addr: String,
    /// Number of request worker threads.
    pub workers: usize,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            workers: 4,
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [analytics]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Day range used when none (or an unsupported one) is requested.
    pub default_days: DayRange,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_days: DayRange::Week,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the activity log is written.
    pub enabled: bool,
    /// Path to the activity log file. `~` is expanded to the home directory.
    pub path: String,
    /// Diagnostic level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.aiswitch/activity.jsonl".to_string(),
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ConsoleConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `aiswitch config init` to create a starting config file with
    /// all settings documented.
    pub fn default_toml() -> String {
        r#"# aiswitch console configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (AISWITCH_*)
#   2. Project config (.aiswitch.toml in current directory)
#   3. User global config (~/.aiswitch/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://localhost:8000"    # AISWITCH_BACKEND_URL
timeout_ms = 10000                    # AISWITCH_BACKEND_TIMEOUT_MS

[web]
addr = "127.0.0.1:9747"               # AISWITCH_WEB_ADDR
workers = 4
open_browser = true

[analytics]
default_days = 7                      # 7 | 14 | 30 (AISWITCH_DAYS)

[logging]
enabled = true                        # AISWITCH_LOGGING
path = "~/.aiswitch/activity.jsonl"
level = "warn"                        # error | warn | info | debug | trace (AISWITCH_LOG_LEVEL)
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let toml_str = ConsoleConfig::default_toml();
        let config: ConsoleConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: ConsoleConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.web.workers, 4);
        assert_eq!(config.analytics.default_days, DayRange::Week);
        assert!(config.logging.enabled);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let toml_str = r#"
[backend]
base_url = "http://10.0.0.5:8000"

[analytics]
default_days = 30
"#;
        let config: ConsoleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.backend.timeout_ms, 10_000);
        assert_eq!(config.analytics.default_days, DayRange::Month);
        assert_eq!(config.web.addr, "127.0.0.1:9747");
    }

    #[test]
    fn unsupported_day_range_is_rejected() {
        let toml_str = "[analytics]\ndefault_days = 9\n";
        assert!(toml::from_str::<ConsoleConfig>(toml_str).is_err());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let mut config = ConsoleConfig::default();
        config.web.open_browser = false;
        config.analytics.default_days = DayRange::Fortnight;
        let text = toml::to_string_pretty(&config).unwrap();
        let back: ConsoleConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
