//! Application configuration.

use serde::{Deserialize, Serialize};
use tickerbot_alerts::EvaluatorConfig;
use tickerbot_market::MarketConfig;
use tracing::{info, warn};

/// Keep-alive HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveSettings {
    pub enabled: bool,
    pub port: u16,
}

impl Default for KeepAliveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

/// Top-level application configuration, loadable from a JSON file.
/// Any omitted section falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ticker fetch layer settings.
    pub market: MarketConfig,
    /// Alert evaluation settings.
    pub evaluator: EvaluatorConfig,
    /// Keep-alive server settings.
    pub keep_alive: KeepAliveSettings,
    /// Pairs summarized by the /top command.
    pub top_pairs: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            evaluator: EvaluatorConfig::default(),
            keep_alive: KeepAliveSettings::default(),
            top_pairs: ["btcidr", "ethidr", "dogidr", "xrpidr", "adaidr"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Read configuration from `path`. A missing file is normal (defaults
    /// apply); an unreadable one is logged and also falls back.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => {
                    info!(path, "configuration loaded");
                    config
                }
                Err(err) => {
                    warn!(path, error = %err, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path, "no config file found, using defaults");
                Self::default()
            }
        }
    }
}
