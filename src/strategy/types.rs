use std::collections::VecDeque;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{BotError, Result};

/// Which price the buy test compares against while no position is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstBuyReference {
    /// The incoming price itself. With a positive drop percent the buy
    /// condition can never hold, so no first buy happens.
    #[default]
    IncomingPrice,
    /// The first valid price the session observed, cached in state
    FirstObservedPrice,
}

impl FromStr for FirstBuyReference {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "incoming-price" => Ok(Self::IncomingPrice),
            "first-observed-price" => Ok(Self::FirstObservedPrice),
            other => Err(BotError::InvalidConfig(format!(
                "unknown first buy reference '{}'",
                other
            ))),
        }
    }
}

/// Immutable grid parameters, fixed when a session is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Starting cash
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
    /// Cash committed per buy and released per sell
    #[serde(default = "default_grid_step")]
    pub grid_step: Decimal,
    /// Drop below the reference price (in percent) that triggers a buy
    #[serde(default = "default_percent")]
    pub price_drop_percent: Decimal,
    /// Rise above the reference price (in percent) that triggers a sell
    #[serde(default = "default_percent")]
    pub price_increase_percent: Decimal,
    #[serde(default)]
    pub first_buy_reference: FirstBuyReference,
}

fn default_initial_capital() -> Decimal {
    dec!(1000)
}

fn default_grid_step() -> Decimal {
    dec!(100)
}

fn default_percent() -> Decimal {
    dec!(0.1)
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            grid_step: default_grid_step(),
            price_drop_percent: default_percent(),
            price_increase_percent: default_percent(),
            first_buy_reference: FirstBuyReference::default(),
        }
    }
}

impl StrategyConfig {
    pub fn new(
        initial_capital: Decimal,
        grid_step: Decimal,
        price_drop_percent: Decimal,
        price_increase_percent: Decimal,
    ) -> Self {
        Self {
            initial_capital,
            grid_step,
            price_drop_percent,
            price_increase_percent,
            first_buy_reference: FirstBuyReference::default(),
        }
    }

    pub fn with_first_buy_reference(mut self, reference: FirstBuyReference) -> Self {
        self.first_buy_reference = reference;
        self
    }

    /// Reject parameters no session may start with
    pub fn validate(&self) -> Result<()> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(BotError::InvalidConfig(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.grid_step <= Decimal::ZERO {
            return Err(BotError::InvalidConfig(format!(
                "grid step must be positive, got {}",
                self.grid_step
            )));
        }
        if self.price_drop_percent < Decimal::ZERO {
            return Err(BotError::InvalidConfig(format!(
                "price drop percent must not be negative, got {}",
                self.price_drop_percent
            )));
        }
        if self.price_increase_percent < Decimal::ZERO {
            return Err(BotError::InvalidConfig(format!(
                "price increase percent must not be negative, got {}",
                self.price_increase_percent
            )));
        }
        Ok(())
    }
}

/// Parses `"<initial capital> <grid step> <price drop %> <price increase %>"`,
/// e.g. `"1000 100 0.1 0.1"`, and validates the result.
impl FromStr for StrategyConfig {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(BotError::InvalidConfig(format!(
                "wrong number of parameters: expected 4, got {}",
                parts.len()
            )));
        }

        let values = parts
            .iter()
            .map(|part| {
                Decimal::from_str(part).map_err(|e| {
                    BotError::InvalidConfig(format!("invalid number '{}': {}", part, e))
                })
            })
            .collect::<Result<Vec<Decimal>>>()?;

        let config = Self::new(values[0], values[1], values[2], values[3]);
        config.validate()?;
        Ok(config)
    }
}

/// Mutable capital and position state owned by one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyState {
    pub(crate) remaining_capital: Decimal,
    /// Purchase prices of open positions in buy order
    pub(crate) purchase_prices: VecDeque<Decimal>,
    /// Only populated with `FirstBuyReference::FirstObservedPrice`
    pub(crate) first_observed_price: Option<Decimal>,
}

impl StrategyState {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            remaining_capital: config.initial_capital,
            purchase_prices: VecDeque::new(),
            first_observed_price: None,
        }
    }

    /// Restore a state with existing open positions (oldest first)
    pub fn with_positions(
        remaining_capital: Decimal,
        purchase_prices: impl IntoIterator<Item = Decimal>,
    ) -> Self {
        Self {
            remaining_capital,
            purchase_prices: purchase_prices.into_iter().collect(),
            first_observed_price: None,
        }
    }

    pub fn remaining_capital(&self) -> Decimal {
        self.remaining_capital
    }

    pub fn open_position_count(&self) -> usize {
        self.purchase_prices.len()
    }

    /// Snapshot of open position prices, oldest first
    pub fn open_position_prices(&self) -> Vec<Decimal> {
        self.purchase_prices.iter().copied().collect()
    }

    pub fn first_observed_price(&self) -> Option<Decimal> {
        self.first_observed_price
    }
}

/// Outcome of one decision step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "price", rename_all = "snake_case")]
pub enum Action {
    /// Opened a position at the price
    Bought(Decimal),
    /// Closed the oldest position at the price
    Sold(Decimal),
    /// Buy triggered but remaining capital is below one grid step
    NoBuyFunds,
    /// Sell triggered but nothing is open
    NoSellPositions,
    /// Neither threshold crossed
    Hold,
}

impl Action {
    /// True for actions that moved capital
    pub fn is_trade(&self) -> bool {
        matches!(self, Action::Bought(_) | Action::Sold(_))
    }

    pub fn trade_price(&self) -> Option<Decimal> {
        match self {
            Action::Bought(price) | Action::Sold(price) => Some(*price),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Bought(price) => write!(f, "Bought at {}", price),
            Action::Sold(price) => write!(f, "Sold at {}", price),
            Action::NoBuyFunds => write!(f, "Insufficient capital to buy."),
            Action::NoSellPositions => write!(f, "No positions to sell."),
            Action::Hold => write!(f, "Waiting."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StrategyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_capital, dec!(1000));
        assert_eq!(config.grid_step, dec!(100));
        assert_eq!(config.price_drop_percent, dec!(0.1));
        assert_eq!(config.first_buy_reference, FirstBuyReference::IncomingPrice);
    }

    #[test]
    fn test_validate_rejects_non_positive_capital_and_step() {
        let config = StrategyConfig::new(dec!(0), dec!(100), dec!(1), dec!(1));
        assert!(matches!(config.validate(), Err(BotError::InvalidConfig(_))));

        let config = StrategyConfig::new(dec!(1000), dec!(-5), dec!(1), dec!(1));
        assert!(matches!(config.validate(), Err(BotError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_negative_percentages() {
        let config = StrategyConfig::new(dec!(1000), dec!(100), dec!(-1), dec!(1));
        assert!(config.validate().is_err());

        let config = StrategyConfig::new(dec!(1000), dec!(100), dec!(1), dec!(-0.5));
        assert!(config.validate().is_err());

        let config = StrategyConfig::new(dec!(1000), dec!(100), dec!(0), dec!(0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_parameters() {
        let config: StrategyConfig = "1000 100 0.1 0.1".parse().unwrap();
        assert_eq!(config, StrategyConfig::new(dec!(1000), dec!(100), dec!(0.1), dec!(0.1)));

        let config: StrategyConfig = "  500\t50  2 3 ".parse().unwrap();
        assert_eq!(config.initial_capital, dec!(500));
        assert_eq!(config.price_increase_percent, dec!(3));
    }

    #[test]
    fn test_parse_parameters_errors() {
        let err = "1000 100 0.1".parse::<StrategyConfig>().unwrap_err();
        assert!(err.to_string().contains("wrong number of parameters"));

        let err = "1000 abc 0.1 0.1".parse::<StrategyConfig>().unwrap_err();
        assert!(err.to_string().contains("invalid number 'abc'"));

        assert!("1000 0 0.1 0.1".parse::<StrategyConfig>().is_err());
    }

    #[test]
    fn test_first_buy_reference_parse() {
        assert_eq!(
            "first-observed-price".parse::<FirstBuyReference>().unwrap(),
            FirstBuyReference::FirstObservedPrice
        );
        assert_eq!(
            "incoming_price".parse::<FirstBuyReference>().unwrap(),
            FirstBuyReference::IncomingPrice
        );
        assert!("latest".parse::<FirstBuyReference>().is_err());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Bought(dec!(89)).to_string(), "Bought at 89");
        assert_eq!(Action::Sold(dec!(110.5)).to_string(), "Sold at 110.5");
        assert_eq!(Action::NoBuyFunds.to_string(), "Insufficient capital to buy.");
        assert_eq!(Action::NoSellPositions.to_string(), "No positions to sell.");
        assert_eq!(Action::Hold.to_string(), "Waiting.");
    }

    #[test]
    fn test_action_trade_helpers() {
        assert!(Action::Bought(dec!(1)).is_trade());
        assert!(!Action::Hold.is_trade());
        assert_eq!(Action::Sold(dec!(7)).trade_price(), Some(dec!(7)));
        assert_eq!(Action::NoBuyFunds.trade_price(), None);
    }

    #[test]
    fn test_state_starts_with_initial_capital() {
        let state = StrategyState::new(&StrategyConfig::default());
        assert_eq!(state.remaining_capital(), dec!(1000));
        assert_eq!(state.open_position_count(), 0);
        assert!(state.open_position_prices().is_empty());
    }
}
