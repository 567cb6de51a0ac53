//! Grid Trader Library
//!
//! A Rust library for running grid trading sessions against an exchange
//! price feed: buy a fixed step of capital on every configured price drop,
//! sell the oldest position on every configured rise.

pub mod common;
pub mod config;
pub mod exchange;
pub mod notify;
pub mod recorder;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{BotError, Result};
pub use common::traits::{Notifier, PriceFeed, TradeRecorder};
pub use common::types::{OperationType, SessionId, SessionStatus, TradeRecord, TradeStatistics};
pub use config::types::AppConfig;
pub use exchange::ExchangeRestClient;
pub use notify::{LogNotifier, SessionEvent, TelegramNotifier};
pub use recorder::{HistoryFormat, TradeHistory};
pub use session::{SessionRegistry, SessionSettings, TickOutcome};

// Strategy types
pub use strategy::{
    Action, BoxedStrategy, FirstBuyReference, GridStrategy, Strategy, StrategyConfig,
    StrategyState,
};
