//! Strategy module for trade decision making
//!
//! This module holds the grid trading engine: the stateful decision step
//! that converts a price observation into buy/sell/hold actions while
//! keeping capital and position invariants.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ASYNC (session worker)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tick ──► PriceFeed.fetch_price(symbol)                     │
//! │                 │                                           │
//! │                 ▼                                           │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │              SYNC (no I/O, no await)                  │  │
//! │  │  Strategy.on_price(price) → Action                    │  │
//! │  │    1. buy test against min(open positions)            │  │
//! │  │    2. sell test against max(open positions)           │  │
//! │  │    3. hold                                            │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │                 │                                           │
//! │                 ▼                                           │
//! │  TradeRecorder.record(..)   Notifier.notify(..)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`StrategyConfig`]: immutable grid parameters
//! - [`StrategyState`]: remaining capital and FIFO open positions
//! - [`Action`]: tagged outcome of one decision step
//! - [`on_price`]: the decision step itself
//! - [`Strategy`] / [`GridStrategy`]: the seam sessions drive
//!
//! # Example
//!
//! ```
//! use grid_trader::strategy::{Action, GridStrategy, Strategy, StrategyConfig};
//! use rust_decimal_macros::dec;
//!
//! let config: StrategyConfig = "1000 100 10 10".parse().unwrap();
//! let mut strategy = GridStrategy::new(config).unwrap();
//! assert_eq!(strategy.on_price(dec!(100)).unwrap(), Action::Hold);
//! ```

mod engine;
mod grid;
mod traits;
mod types;

pub use engine::on_price;

pub use grid::GridStrategy;

pub use traits::{BoxedStrategy, Strategy};

pub use types::{Action, FirstBuyReference, StrategyConfig, StrategyState};
