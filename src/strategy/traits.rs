use rust_decimal::Decimal;

use crate::common::errors::Result;
use crate::strategy::types::Action;

/// Core strategy trait
///
/// A strategy owns its configuration and mutable state and turns each price
/// observation into an [`Action`]. Sessions drive it one tick at a time.
///
/// # Implementation Notes
///
/// - `on_price` must be fast and must not perform I/O
/// - Calls for one strategy instance are never concurrent; the session
///   serializes them
/// - An `Err` from `on_price` must leave the state unchanged
pub trait Strategy: Send + Sync {
    /// Unique identifier for this strategy
    fn name(&self) -> &str;

    /// Called once per tick with the freshly fetched price
    fn on_price(&mut self, price: Decimal) -> Result<Action>;

    /// Cash not committed to open positions
    fn remaining_capital(&self) -> Decimal;

    /// Purchase prices of open positions, oldest first
    fn open_position_prices(&self) -> Vec<Decimal>;

    fn open_position_count(&self) -> usize {
        self.open_position_prices().len()
    }

    /// True when the strategy can no longer afford a buy
    ///
    /// The session stops scheduling ticks once this holds.
    fn is_exhausted(&self) -> bool;
}

/// Boxed strategy for dynamic dispatch
pub type BoxedStrategy = Box<dyn Strategy>;
