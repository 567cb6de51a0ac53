//! Unified types shared by the strategy, recorder, notifier and session layers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of one trading session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of an executed trade as written to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Buy,
    Sell,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Buy => write!(f, "buy"),
            OperationType::Sell => write!(f, "sell"),
        }
    }
}

/// One persisted trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Whether the trade was a buy or a sell
    pub operation_type: OperationType,
    /// Fill price (the observed price of the tick)
    pub price: Decimal,
    /// When the trade was recorded
    pub timestamp: DateTime<Utc>,
    /// Session that produced the trade; absent in histories written by older versions
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

impl TradeRecord {
    pub fn new(
        operation_type: OperationType,
        price: Decimal,
        timestamp: DateTime<Utc>,
        session_id: Option<SessionId>,
    ) -> Self {
        Self {
            operation_type,
            price,
            timestamp,
            session_id,
        }
    }
}

/// Aggregate trade statistics
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeStatistics {
    pub total_buys: usize,
    pub total_sells: usize,
    /// Arithmetic mean of buy prices, zero without buys
    pub average_buy_price: Decimal,
    /// Arithmetic mean of sell prices, zero without sells
    pub average_sell_price: Decimal,
}

impl TradeStatistics {
    /// Compute statistics over a set of records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TradeRecord>) -> Self {
        let mut buys = Mean::default();
        let mut sells = Mean::default();

        for record in records {
            match record.operation_type {
                OperationType::Buy => buys.push(record.price),
                OperationType::Sell => sells.push(record.price),
            }
        }

        Self {
            total_buys: buys.count,
            total_sells: sells.count,
            average_buy_price: buys.value(),
            average_sell_price: sells.value(),
        }
    }
}

/// Arithmetic mean that survives sums beyond `Decimal::MAX`
///
/// The exact sum is used while it fits; after an overflow the incrementally
/// updated mean takes over.
#[derive(Default)]
struct Mean {
    count: usize,
    sum: Decimal,
    overflowed: bool,
    running: Decimal,
}

impl Mean {
    fn push(&mut self, value: Decimal) {
        self.count += 1;
        let n = Decimal::from(self.count);

        match self.sum.checked_add(value) {
            Some(sum) if !self.overflowed => self.sum = sum,
            _ => self.overflowed = true,
        }
        if let Some(running) = self.running.checked_add(value / n - self.running / n) {
            self.running = running;
        }
    }

    fn value(&self) -> Decimal {
        match self.count {
            0 => Decimal::ZERO,
            n if !self.overflowed => self.sum / Decimal::from(n),
            _ => self.running,
        }
    }
}

impl std::fmt::Display for TradeStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "buys: {} (avg {}), sells: {} (avg {})",
            self.total_buys, self.average_buy_price, self.total_sells, self.average_sell_price
        )
    }
}

/// Point-in-time view of a session for status reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    pub symbol: String,
    pub remaining_capital: Decimal,
    /// Purchase prices of open positions, oldest first
    pub open_positions: Vec<Decimal>,
    /// False once the session stopped ticking (capital exhausted)
    pub running: bool,
}

impl SessionStatus {
    pub fn open_position_count(&self) -> usize {
        self.open_positions.len()
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let positions: Vec<String> = self.open_positions.iter().map(|p| p.to_string()).collect();
        write!(
            f,
            "Current balance: {}\nOpen positions: [{}]",
            self.remaining_capital,
            positions.join(", ")
        )
    }
}
