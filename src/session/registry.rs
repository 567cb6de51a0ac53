//! Registry of running trading sessions

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::worker::SessionWorker;
use crate::common::channels::create_shutdown_channel;
use crate::common::errors::{BotError, Result};
use crate::common::traits::{Notifier, PriceFeed, TradeRecorder};
use crate::common::types::{SessionId, SessionStatus, TradeStatistics};
use crate::config::types::AppSettings;
use crate::strategy::{BoxedStrategy, GridStrategy, StrategyConfig};

/// Settings shared by every session of a registry
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    /// Symbols sessions may trade; empty allows any
    pub available_assets: Vec<String>,
}

impl SessionSettings {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            available_assets: Vec::new(),
        }
    }

    pub fn with_available_assets(mut self, assets: Vec<String>) -> Self {
        self.available_assets = assets.iter().map(|s| normalize_symbol(s)).collect();
        self
    }

    fn allows(&self, symbol: &str) -> bool {
        self.available_assets.is_empty() || self.available_assets.iter().any(|s| s == symbol)
    }
}

impl From<&AppSettings> for SessionSettings {
    fn from(settings: &AppSettings) -> Self {
        Self::new(Duration::from_secs(settings.poll_interval_seconds))
            .with_available_assets(settings.available_assets.clone())
    }
}

struct SessionHandle {
    symbol: String,
    strategy: Arc<Mutex<BoxedStrategy>>,
    running: Arc<AtomicBool>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

/// Owns every session and the collaborators they share
///
/// Each session runs on its own task with its own strategy, so sessions never
/// observe each other's capital or positions.
pub struct SessionRegistry {
    feed: Arc<dyn PriceFeed>,
    recorder: Arc<dyn TradeRecorder>,
    notifier: Arc<dyn Notifier>,
    settings: SessionSettings,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        recorder: Arc<dyn TradeRecorder>,
        notifier: Arc<dyn Notifier>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            feed,
            recorder,
            notifier,
            settings,
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Start a grid session for `symbol`
    ///
    /// The first tick runs immediately on the session's own task.
    pub async fn create_session(&self, symbol: &str, config: StrategyConfig) -> Result<SessionId> {
        let strategy = GridStrategy::new(config)?;
        self.spawn(symbol, Box::new(strategy)).await
    }

    /// Start a session driving an already constructed strategy
    #[instrument(skip(self, strategy), fields(strategy = strategy.name()))]
    pub async fn spawn(&self, symbol: &str, strategy: BoxedStrategy) -> Result<SessionId> {
        if self.settings.poll_interval.is_zero() {
            return Err(BotError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() || !self.settings.allows(&symbol) {
            return Err(BotError::UnsupportedSymbol(symbol));
        }

        let session_id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let strategy = Arc::new(Mutex::new(strategy));
        let running = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let worker = SessionWorker::new(
            session_id,
            symbol.clone(),
            strategy.clone(),
            self.feed.clone(),
            self.recorder.clone(),
            self.notifier.clone(),
            self.settings.poll_interval,
            running.clone(),
        );
        let task = tokio::spawn(worker.run(shutdown_rx));

        self.sessions.write().await.insert(
            session_id,
            SessionHandle {
                symbol: symbol.clone(),
                strategy,
                running,
                shutdown_tx,
                task,
            },
        );

        info!(%session_id, %symbol, "Session created");
        Ok(session_id)
    }

    /// Stop a session and forget it
    ///
    /// A tick already in flight completes; no tick starts afterwards.
    #[instrument(skip(self))]
    pub async fn stop_session(&self, session_id: SessionId) -> Result<()> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(&session_id)
            .ok_or(BotError::SessionNotFound(session_id))?;

        signal_stop(session_id, &handle);
        info!(%session_id, symbol = %handle.symbol, "Session stopped");
        Ok(())
    }

    /// Stop every session, wait for their workers and return final snapshots
    pub async fn stop_all(&self) -> Vec<SessionStatus> {
        let mut handles: Vec<_> = self.sessions.write().await.drain().collect();
        handles.sort_by_key(|(session_id, _)| *session_id);

        let mut statuses = Vec::with_capacity(handles.len());
        for (session_id, handle) in handles {
            signal_stop(session_id, &handle);
            if let Err(e) = handle.task.await {
                warn!(%session_id, error = %e, "Session worker ended abnormally");
            }

            let strategy = handle.strategy.lock().await;
            statuses.push(SessionStatus {
                session_id,
                symbol: handle.symbol,
                remaining_capital: strategy.remaining_capital(),
                open_positions: strategy.open_position_prices(),
                running: false,
            });
        }
        statuses
    }

    /// Snapshot of a session's capital and open positions
    pub async fn status(&self, session_id: SessionId) -> Result<SessionStatus> {
        let sessions = self.sessions.read().await;
        let handle = sessions
            .get(&session_id)
            .ok_or(BotError::SessionNotFound(session_id))?;

        let strategy = handle.strategy.lock().await;
        Ok(SessionStatus {
            session_id,
            symbol: handle.symbol.clone(),
            remaining_capital: strategy.remaining_capital(),
            open_positions: strategy.open_position_prices(),
            running: handle.running.load(Ordering::SeqCst),
        })
    }

    /// Trade statistics of one session
    pub async fn statistics(&self, session_id: SessionId) -> Result<TradeStatistics> {
        self.recorder.statistics(session_id).await
    }

    /// Ids of every known session, in creation order
    pub async fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of sessions whose worker is still ticking
    pub async fn running_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|handle| handle.running.load(Ordering::SeqCst))
            .count()
    }
}

fn signal_stop(session_id: SessionId, handle: &SessionHandle) {
    // A full channel already carries a stop request; a closed one means the
    // worker exited on its own.
    if let Err(e) = handle.shutdown_tx.try_send(()) {
        debug!(%session_id, error = %e, "Stop signal not delivered");
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
