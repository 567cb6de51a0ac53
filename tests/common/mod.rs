//! Common test utilities and fixtures

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use grid_trader::common::errors::{BotError, Result};
use grid_trader::common::traits::{Notifier, PriceFeed};
use grid_trader::common::types::SessionId;
use grid_trader::notify::SessionEvent;
use rust_decimal::Decimal;

/// Price feed replaying a script per symbol
///
/// `None` entries simulate an unreachable exchange. Once a script runs out
/// the last entry repeats.
#[derive(Default)]
pub struct ScriptedFeed {
    scripts: Mutex<HashMap<String, VecDeque<Option<Decimal>>>>,
    last: Mutex<HashMap<String, Option<Decimal>>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, symbol: &str, prices: Vec<Option<Decimal>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), prices.into_iter().collect());
        self
    }

    pub fn with_prices(self, symbol: &str, prices: &[Decimal]) -> Self {
        self.with_script(symbol, prices.iter().copied().map(Some).collect())
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(|script| script.pop_front());

        let entry = match next {
            Some(entry) => {
                self.last.lock().unwrap().insert(symbol.to_string(), entry);
                entry
            }
            None => self.last.lock().unwrap().get(symbol).copied().flatten(),
        };

        entry.ok_or_else(|| BotError::fetch(symbol, "exchange unreachable"))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Notifier that keeps every delivered event
#[derive(Default)]
pub struct CollectingNotifier {
    events: Mutex<Vec<(SessionId, SessionEvent)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(SessionId, SessionEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Events of one session, in delivery order
    pub fn events_for(&self, session_id: SessionId) -> Vec<SessionEvent> {
        self.events()
            .into_iter()
            .filter(|(id, _)| *id == session_id)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn messages_for(&self, session_id: SessionId) -> Vec<String> {
        self.events_for(session_id)
            .iter()
            .map(|event| event.to_string())
            .collect()
    }
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn notify(&self, session_id: SessionId, event: &SessionEvent) -> Result<()> {
        self.events.lock().unwrap().push((session_id, event.clone()));
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "collecting"
    }
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn eventually<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition().await
}

/// Sample ticker payload as returned by the exchange
pub fn ticker_response(symbol: &str, last_price: &str) -> serde_json::Value {
    serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "category": "spot",
            "list": [{
                "symbol": symbol,
                "lastPrice": last_price,
                "bid1Price": last_price,
                "ask1Price": last_price,
                "volume24h": "1234.5"
            }]
        },
        "time": 1700000000000u64
    })
}
