use rust_decimal::Decimal;

use super::engine;
use super::traits::Strategy;
use super::types::{Action, StrategyConfig, StrategyState};
use crate::common::errors::Result;

/// Grid strategy: a validated config paired with the state it owns
#[derive(Debug, Clone)]
pub struct GridStrategy {
    config: StrategyConfig,
    state: StrategyState,
}

impl GridStrategy {
    /// Validate the config and start from a fresh state
    pub fn new(config: StrategyConfig) -> Result<Self> {
        config.validate()?;
        let state = StrategyState::new(&config);
        Ok(Self { config, state })
    }

    /// Resume from an existing state
    pub fn with_state(config: StrategyConfig, state: StrategyState) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }
}

impl Strategy for GridStrategy {
    fn name(&self) -> &str {
        "grid"
    }

    fn on_price(&mut self, price: Decimal) -> Result<Action> {
        engine::on_price(&mut self.state, &self.config, price)
    }

    fn remaining_capital(&self) -> Decimal {
        self.state.remaining_capital()
    }

    fn open_position_prices(&self) -> Vec<Decimal> {
        self.state.open_position_prices()
    }

    fn open_position_count(&self) -> usize {
        self.state.open_position_count()
    }

    fn is_exhausted(&self) -> bool {
        self.state.remaining_capital() < self.config.grid_step
    }
}
