//! Session events and their user-facing text

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::strategy::Action;

/// Everything a session reports to its user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Monitoring started for a symbol
    Started { symbol: String, interval_seconds: u64 },
    /// Outcome of one applied tick
    Tick {
        symbol: String,
        price: Decimal,
        action: Action,
    },
    /// Follow-up to a tick whose action moved capital
    TradeExecuted { symbol: String, action: Action },
    /// The price could not be fetched; the tick was skipped
    PriceUnavailable { symbol: String, reason: String },
    /// The engine rejected the fetched price; the tick was skipped
    PriceRejected { symbol: String, price: Decimal },
    /// Remaining capital fell below one grid step; no further ticks
    CapitalExhausted {
        symbol: String,
        remaining_capital: Decimal,
    },
    /// Monitoring stopped on request
    Stopped { symbol: String },
}

impl SessionEvent {
    pub fn symbol(&self) -> &str {
        match self {
            SessionEvent::Started { symbol, .. }
            | SessionEvent::Tick { symbol, .. }
            | SessionEvent::TradeExecuted { symbol, .. }
            | SessionEvent::PriceUnavailable { symbol, .. }
            | SessionEvent::PriceRejected { symbol, .. }
            | SessionEvent::CapitalExhausted { symbol, .. }
            | SessionEvent::Stopped { symbol } => symbol,
        }
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::Started {
                symbol,
                interval_seconds,
            } => write!(
                f,
                "Price monitoring started for {}. Checking every {} seconds.",
                symbol, interval_seconds
            ),
            SessionEvent::Tick {
                symbol,
                price,
                action,
            } => write!(f, "Current price {}: {} USD\nResult: {}", symbol, price, action),
            SessionEvent::TradeExecuted { action, .. } => write!(f, "Action executed: {}", action),
            SessionEvent::PriceUnavailable { symbol, reason } => {
                write!(f, "Failed to fetch price for {}: {}", symbol, reason)
            }
            SessionEvent::PriceRejected { symbol, price } => {
                write!(f, "Rejected invalid price {} for {}", price, symbol)
            }
            SessionEvent::CapitalExhausted { .. } => {
                write!(f, "Capital exhausted. Monitoring stopped.")
            }
            SessionEvent::Stopped { symbol } => {
                write!(f, "Price monitoring stopped for {}.", symbol)
            }
        }
    }
}
