//! Exchange REST message types

use serde::{Deserialize, Serialize};

/// Envelope of every v5 REST response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    /// Absent or empty object on errors
    #[serde(default)]
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.ret_code == 0
    }
}

/// `result` payload of `/v5/market/tickers`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickersResult {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub list: Vec<Ticker>,
}

/// A single ticker entry; prices are decimal strings
///
/// Only the fields the price feed reads are kept; the rest of the payload
/// is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    pub last_price: String,
}
