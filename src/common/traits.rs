//! Trait definitions for the collaborators a trading session consumes

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{SessionId, TradeStatistics};
use crate::notify::SessionEvent;
use crate::strategy::Action;

/// Source of the latest price for a symbol
///
/// Any failure (transport, non-2xx status, malformed payload, missing
/// price) is reported as an error; the session skips the tick.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the latest traded price for `symbol`
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal>;

    /// Get the name of the price source
    fn source_name(&self) -> &'static str;
}

/// Durable trade history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeRecorder: Send + Sync {
    /// Append the action if it is a trade
    ///
    /// Returns `true` when a record was written, `false` for non-trade actions.
    async fn record(
        &self,
        session_id: SessionId,
        action: Action,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<bool>;

    /// Statistics over the trades recorded for one session
    async fn statistics(&self, session_id: SessionId) -> Result<TradeStatistics>;
}

/// User-facing channel for session events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event of a session
    async fn notify(&self, session_id: SessionId, event: &SessionEvent) -> Result<()>;

    /// Get the name of the channel
    fn channel_name(&self) -> &'static str;
}
