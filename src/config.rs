use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::RiskLevel;

/// Default USGS FDSN event query endpoint
pub const DEFAULT_FEED_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Errors raised while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for the tsunami watch tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Earthquake feed configuration
    pub feed: FeedConfig,
    /// Polling daemon configuration
    pub daemon: DaemonConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// Alert notification configuration
    pub alerting: AlertConfig,
}

/// Earthquake feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// FDSN event query endpoint
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Lookback window in hours
    pub window_hours: f64,
    /// Maximum number of events classified per cycle
    pub max_reports: usize,
    /// Substitute a demonstration event when the feed yields nothing
    pub demo_fallback: bool,
}

/// Polling daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between feed polls
    pub poll_interval_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "json", "jsonl", or "console"
    pub format: String,
    /// Output file path (stdout when absent or format is "console")
    pub file_path: Option<PathBuf>,
}

/// Alert notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Master switch for outbound notifications
    pub enabled: bool,
    /// Reports below this tier are not dispatched
    pub min_risk: RiskLevel,
    pub slack: Option<SlackConfig>,
    pub discord: Option<DiscordConfig>,
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub channel: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Name used in log messages
    pub name: String,
    pub url: String,
    /// "POST" (default) or "PUT"
    pub method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            endpoint: DEFAULT_FEED_ENDPOINT.to_string(),
            timeout_secs: 10,
            window_hours: 24.0,
            max_reports: 5,
            demo_fallback: true,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            enabled: false,
            min_risk: RiskLevel::Moderate,
            slack: None,
            discord: None,
            webhooks: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feed: FeedConfig::default(),
            daemon: DaemonConfig {
                poll_interval_secs: 300,
            },
            output: OutputConfig {
                format: "jsonl".to_string(),
                file_path: Some(PathBuf::from("tsunami_reports.jsonl")),
            },
            alerting: AlertConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::default().to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();

        assert_eq!(loaded.feed.endpoint, DEFAULT_FEED_ENDPOINT);
        assert_eq!(loaded.feed.window_hours, 24.0);
        assert_eq!(loaded.feed.max_reports, 5);
        assert!(loaded.feed.demo_fallback);
        assert_eq!(loaded.alerting.min_risk, RiskLevel::Moderate);
        assert!(!loaded.alerting.enabled);
    }

    #[test]
    fn test_parse_alerting_section() {
        let toml_str = r##"
            [feed]
            endpoint = "http://localhost:9000/query"
            timeout_secs = 3
            window_hours = 6.0
            max_reports = 10
            demo_fallback = false

            [daemon]
            poll_interval_secs = 60

            [output]
            format = "console"

            [alerting]
            enabled = true
            min_risk = "High"

            [alerting.slack]
            webhook_url = "https://hooks.slack.example/T000"
            channel = "#tsunami"

            [[alerting.webhooks]]
            name = "ops"
            url = "https://ops.example/hook"
            method = "PUT"
        "##;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.feed.timeout_secs, 3);
        assert!(config.output.file_path.is_none());
        assert_eq!(config.alerting.min_risk, RiskLevel::High);
        assert_eq!(config.alerting.slack.unwrap().channel.as_deref(), Some("#tsunami"));
        assert_eq!(config.alerting.webhooks.len(), 1);
        assert_eq!(config.alerting.webhooks[0].method.as_deref(), Some("PUT"));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("does-not-exist.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
