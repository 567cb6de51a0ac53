//! Recorder module - durable trade history and statistics

pub mod history;

pub use history::{HistoryFormat, TradeHistory};
