//! Grid decision step
//!
//! [`on_price`] turns one price observation into an [`Action`] and applies
//! its capital/position effects. Buy is evaluated before sell on every tick
//! and a triggered buy, funded or not, ends the step.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::types::{Action, FirstBuyReference, StrategyConfig, StrategyState};
use crate::common::errors::{BotError, Result};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Apply one price observation to `state`
///
/// Deterministic in `(state, config, price)` and free of I/O. A non-positive
/// price is rejected with [`BotError::InvalidPrice`] and leaves `state`
/// untouched.
pub fn on_price(state: &mut StrategyState, config: &StrategyConfig, price: Decimal) -> Result<Action> {
    if price <= Decimal::ZERO {
        warn!(%price, "Rejecting non-positive price");
        return Err(BotError::InvalidPrice(price));
    }

    if config.first_buy_reference == FirstBuyReference::FirstObservedPrice
        && state.first_observed_price.is_none()
    {
        state.first_observed_price = Some(price);
    }

    debug!(
        %price,
        open_positions = ?state.purchase_prices,
        remaining_capital = %state.remaining_capital,
        "Evaluating price"
    );

    if should_buy(state, config, price) {
        if state.remaining_capital >= config.grid_step {
            state.purchase_prices.push_back(price);
            state.remaining_capital -= config.grid_step;
            info!(%price, remaining_capital = %state.remaining_capital, "Bought");
            return Ok(Action::Bought(price));
        }
        info!(%price, "Insufficient capital to buy");
        return Ok(Action::NoBuyFunds);
    }

    if should_sell(state, config, price) {
        return Ok(match state.purchase_prices.pop_front() {
            Some(entry_price) => {
                state.remaining_capital = state.remaining_capital.saturating_add(config.grid_step);
                info!(%price, %entry_price, remaining_capital = %state.remaining_capital, "Sold");
                Action::Sold(price)
            }
            None => {
                info!(%price, "No positions to sell");
                Action::NoSellPositions
            }
        });
    }

    Ok(Action::Hold)
}

/// Price the buy test compares against
fn buy_reference(state: &StrategyState, config: &StrategyConfig, price: Decimal) -> Decimal {
    match state.purchase_prices.iter().min() {
        Some(lowest) => *lowest,
        None => match config.first_buy_reference {
            FirstBuyReference::IncomingPrice => price,
            FirstBuyReference::FirstObservedPrice => state.first_observed_price.unwrap_or(price),
        },
    }
}

/// An overflowing threshold lies below every positive price: no buy
fn should_buy(state: &StrategyState, config: &StrategyConfig, price: Decimal) -> bool {
    let reference = buy_reference(state, config, price);
    Decimal::ONE
        .checked_sub(config.price_drop_percent / HUNDRED)
        .and_then(|factor| reference.checked_mul(factor))
        .is_some_and(|threshold| price <= threshold)
}

/// Never true without open positions. An overflowing threshold is
/// unreachable: no sell.
fn should_sell(state: &StrategyState, config: &StrategyConfig, price: Decimal) -> bool {
    state
        .purchase_prices
        .iter()
        .max()
        .and_then(|highest| {
            Decimal::ONE
                .checked_add(config.price_increase_percent / HUNDRED)
                .and_then(|factor| highest.checked_mul(factor))
        })
        .is_some_and(|threshold| price >= threshold)
}
