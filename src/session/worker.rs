//! Per-session tick loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::common::errors::BotError;
use crate::common::traits::{Notifier, PriceFeed, TradeRecorder};
use crate::common::types::SessionId;
use crate::notify::SessionEvent;
use crate::strategy::{Action, BoxedStrategy};

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The action was applied and reported
    Applied(Action),
    /// The price could not be fetched; the strategy was not called
    FetchFailed,
    /// The engine rejected the price; state unchanged
    PriceRejected(Decimal),
    /// The action was applied and left less than one grid step of capital
    CapitalExhausted(Action),
}

/// Holds a session's running flag up while the worker future is alive
///
/// Lowered on drop, so a worker that panics or is cancelled is not reported
/// as running.
struct RunningFlag(Arc<AtomicBool>);

impl RunningFlag {
    fn raise(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RunningFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives one strategy with periodic ticks
///
/// A worker is the only writer of its strategy. Ticks run one after another
/// on a single task, so actions are applied and reported in fetch order.
pub struct SessionWorker {
    session_id: SessionId,
    symbol: String,
    strategy: Arc<Mutex<BoxedStrategy>>,
    feed: Arc<dyn PriceFeed>,
    recorder: Arc<dyn TradeRecorder>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        symbol: String,
        strategy: Arc<Mutex<BoxedStrategy>>,
        feed: Arc<dyn PriceFeed>,
        recorder: Arc<dyn TradeRecorder>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            session_id,
            symbol,
            strategy,
            feed,
            recorder,
            notifier,
            poll_interval,
            running,
        }
    }

    /// Tick until a stop request arrives or capital runs out
    ///
    /// The first tick fires immediately. A stop request is only observed
    /// between ticks, so a tick in flight completes and records its action.
    #[instrument(skip(self, shutdown_rx), fields(session_id = %self.session_id, symbol = %self.symbol))]
    pub async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        let _running = RunningFlag::raise(self.running.clone());
        info!(interval = ?self.poll_interval, "Session worker started");

        self.emit(SessionEvent::Started {
            symbol: self.symbol.clone(),
            interval_seconds: self.poll_interval.as_secs(),
        })
        .await;

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Stop requested");
                    self.emit(SessionEvent::Stopped { symbol: self.symbol.clone() }).await;
                    break;
                }
                _ = ticker.tick() => {}
            }

            if let TickOutcome::CapitalExhausted(_) = self.run_tick().await {
                info!("Capital exhausted, session worker exiting");
                break;
            }
        }
    }

    /// Fetch, decide, record, report
    pub async fn run_tick(&self) -> TickOutcome {
        let price = match self.feed.fetch_price(&self.symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Skipping tick, price unavailable");
                let reason = match e {
                    BotError::Fetch { reason, .. } => reason,
                    other => other.to_string(),
                };
                self.emit(SessionEvent::PriceUnavailable {
                    symbol: self.symbol.clone(),
                    reason,
                })
                .await;
                return TickOutcome::FetchFailed;
            }
        };

        let decision = {
            let mut strategy = self.strategy.lock().await;
            strategy
                .on_price(price)
                .map(|action| (action, strategy.is_exhausted(), strategy.remaining_capital()))
        };

        let (action, exhausted, remaining_capital) = match decision {
            Ok(decision) => decision,
            Err(e) => {
                warn!(session_id = %self.session_id, %price, error = %e, "Price rejected by strategy");
                self.emit(SessionEvent::PriceRejected {
                    symbol: self.symbol.clone(),
                    price,
                })
                .await;
                return TickOutcome::PriceRejected(price);
            }
        };
        debug!(session_id = %self.session_id, %price, %action, "Tick applied");

        if action.is_trade() {
            if let Err(e) = self
                .recorder
                .record(self.session_id, action, price, Utc::now())
                .await
            {
                error!(session_id = %self.session_id, error = %e, "Failed to record trade");
            }
        }

        self.emit(SessionEvent::Tick {
            symbol: self.symbol.clone(),
            price,
            action,
        })
        .await;

        if action.is_trade() {
            self.emit(SessionEvent::TradeExecuted {
                symbol: self.symbol.clone(),
                action,
            })
            .await;
        }

        if exhausted {
            self.emit(SessionEvent::CapitalExhausted {
                symbol: self.symbol.clone(),
                remaining_capital,
            })
            .await;
            return TickOutcome::CapitalExhausted(action);
        }

        TickOutcome::Applied(action)
    }

    async fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.notifier.notify(self.session_id, &event).await {
            warn!(
                session_id = %self.session_id,
                channel = self.notifier.channel_name(),
                error = %e,
                "Failed to deliver notification"
            );
        }
    }
}
