//! Configuration types

use serde::{Deserialize, Serialize};

use crate::recorder::HistoryFormat;
use crate::strategy::StrategyConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange price feed configuration
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Telegram notifier configuration (optional)
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Trade history persistence
    #[serde(default)]
    pub history: HistoryConfig,
    /// Default strategy parameters for new sessions
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Exchange platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// API key for signed requests
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Base URL for the REST API
    #[serde(default = "default_exchange_rest_url")]
    pub rest_url: String,
    /// Market category queried for tickers
    #[serde(default = "default_category")]
    pub category: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            rest_url: default_exchange_rest_url(),
            category: default_category(),
        }
    }
}

impl ExchangeConfig {
    /// Credentials if both key and secret are set
    pub fn credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(ApiCredentials::new(key.clone(), secret.clone()))
            }
            _ => None,
        }
    }
}

pub(crate) fn default_exchange_rest_url() -> String {
    "https://api-testnet.bybit.com".to_string()
}

fn default_category() -> String {
    "spot".to_string()
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,
    /// Chat that receives session messages
    pub chat_id: String,
    /// Base URL of the Bot API
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

pub(crate) fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Trade history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Write trades to disk
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// History file path
    #[serde(default = "default_history_path")]
    pub path: String,
    /// File format (json or csv)
    #[serde(default)]
    pub format: HistoryFormat,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_history_path(),
            format: HistoryFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_history_path() -> String {
    "trading_history.json".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Additional log file (no ANSI colors)
    #[serde(default)]
    pub log_file: Option<String>,
    /// Seconds between price checks of a session
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Symbols sessions may trade; empty allows any
    #[serde(default = "default_available_assets")]
    pub available_assets: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            poll_interval_seconds: default_poll_interval(),
            request_timeout_seconds: default_request_timeout(),
            available_assets: default_available_assets(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    10
}

pub fn default_available_assets() -> Vec<String> {
    [
        "BTCUSDT", "ETHUSDT", "XRPUSDT", "LTCUSDT", "ADAUSDT", "LINKUSDT", "BNBUSDT", "DOGEUSDT",
        "DOTUSDT", "SOLUSDT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// API credentials for signed requests
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.exchange.rest_url, "https://api-testnet.bybit.com");
        assert_eq!(config.exchange.category, "spot");
        assert!(config.telegram.is_none());
        assert!(config.history.enabled);
        assert_eq!(config.settings.poll_interval_seconds, 60);
        assert_eq!(config.settings.request_timeout_seconds, 10);
        assert_eq!(config.settings.available_assets.len(), 10);
        assert_eq!(config.strategy.grid_step, dec!(100));
    }

    #[test]
    fn test_credentials_require_key_and_secret() {
        let mut exchange = ExchangeConfig::default();
        assert!(exchange.credentials().is_none());

        exchange.api_key = Some("key".to_string());
        assert!(exchange.credentials().is_none());

        exchange.api_secret = Some(String::new());
        assert!(exchange.credentials().is_none());

        exchange.api_secret = Some("secret".to_string());
        let creds = exchange.credentials().unwrap();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.api_secret, "secret");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{
            "strategy": {"initial_capital": 500, "grid_step": "50"},
            "telegram": {"token": "t", "chat_id": "42"},
            "history": {"format": "csv", "path": "trades.csv"}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.strategy.initial_capital, dec!(500));
        assert_eq!(config.strategy.grid_step, dec!(50));
        assert_eq!(config.strategy.price_drop_percent, dec!(0.1));
        assert_eq!(config.history.format, HistoryFormat::Csv);
        assert_eq!(
            config.telegram.unwrap().api_url,
            "https://api.telegram.org"
        );
    }
}
