//! Error types for the application

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::SessionId;

/// Result type alias using our BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for bot operations
#[derive(Error, Debug)]
pub enum BotError {
    /// Strategy parameters rejected at session creation
    #[error("Invalid strategy configuration: {0}")]
    InvalidConfig(String),

    /// Non-positive price presented to the strategy engine
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    /// Price source unavailable (transport, status, or payload problem)
    #[error("Failed to fetch price for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// CSV serialization/deserialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No session registered under the given id
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Symbol is not in the list of tradable assets
    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Build a fetch error for a symbol from any displayable cause
    pub fn fetch(symbol: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        BotError::Fetch {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }
}
