//! Configuration loader

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::types::{
    default_exchange_rest_url, default_telegram_api_url, AppConfig, AppSettings, ExchangeConfig,
    HistoryConfig, TelegramConfig,
};
use crate::common::errors::{BotError, Result};
use crate::recorder::HistoryFormat;
use crate::strategy::StrategyConfig;

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, sections split by `__`)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // e.g. APP_EXCHANGE__API_KEY, APP_SETTINGS__POLL_INTERVAL_SECONDS
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("settings.available_assets"),
    );

    let config = builder
        .build()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| BotError::Configuration(e.to_string()))
}

/// Load configuration from the bot's flat environment variables only
///
/// Reads `API_KEY`, `SECRET_KEY`, `EXCHANGE_URL`, `TELEGRAM_API_TOKEN`,
/// `TELEGRAM_CHAT_ID`, `INITIAL_CAPITAL`, `GRID_STEP`, `LOG_FILE_PATH`,
/// `HISTORY_PATH` and `HISTORY_FORMAT`, after loading a `.env` file if present.
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let exchange = ExchangeConfig {
        api_key: std::env::var("API_KEY").ok(),
        api_secret: std::env::var("SECRET_KEY").ok(),
        rest_url: std::env::var("EXCHANGE_URL").unwrap_or_else(|_| default_exchange_rest_url()),
        ..ExchangeConfig::default()
    };

    let telegram = match (
        std::env::var("TELEGRAM_API_TOKEN"),
        std::env::var("TELEGRAM_CHAT_ID"),
    ) {
        (Ok(token), Ok(chat_id)) => Some(TelegramConfig {
            token,
            chat_id,
            api_url: default_telegram_api_url(),
        }),
        _ => None,
    };

    let mut strategy = StrategyConfig::default();
    if let Some(capital) = decimal_var("INITIAL_CAPITAL")? {
        strategy.initial_capital = capital;
    }
    if let Some(step) = decimal_var("GRID_STEP")? {
        strategy.grid_step = step;
    }

    let mut history = HistoryConfig::default();
    if let Ok(path) = std::env::var("HISTORY_PATH") {
        history.path = path;
    }
    if let Ok(format) = std::env::var("HISTORY_FORMAT") {
        history.format = HistoryFormat::from_str(&format)?;
    }

    let settings = AppSettings {
        log_file: std::env::var("LOG_FILE_PATH").ok(),
        ..AppSettings::default()
    };

    Ok(AppConfig {
        exchange,
        telegram,
        history,
        strategy,
        settings,
    })
}

fn decimal_var(name: &str) -> Result<Option<Decimal>> {
    match std::env::var(name) {
        Ok(value) => Decimal::from_str(value.trim())
            .map(Some)
            .map_err(|e| BotError::Configuration(format!("{} is not a number: {}", name, e))),
        Err(_) => Ok(None),
    }
}
