//! Trade history persisted as a JSON array or a CSV table

use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::common::errors::{BotError, Result};
use crate::common::traits::TradeRecorder;
use crate::common::types::{OperationType, SessionId, TradeRecord, TradeStatistics};
use crate::config::types::HistoryConfig;
use crate::strategy::Action;

/// On-disk format of the history file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for HistoryFormat {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(BotError::Configuration(format!(
                "Unsupported history format: {}",
                other
            ))),
        }
    }
}

/// Append-only trade history shared by all sessions
///
/// The whole history is kept in memory and the file is rewritten after each
/// appended trade.
#[derive(Debug)]
pub struct TradeHistory {
    /// Where and how to persist; `None` keeps history in memory only
    target: Option<(PathBuf, HistoryFormat)>,
    records: Mutex<Vec<TradeRecord>>,
}

impl TradeHistory {
    /// History that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            target: None,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Open a history file, loading existing records
    ///
    /// A missing file starts an empty history. An unreadable or corrupt file
    /// is logged and also starts empty; it is overwritten on the next trade.
    pub fn open(path: impl Into<PathBuf>, format: HistoryFormat) -> Self {
        let path = path.into();
        let records = if path.exists() {
            match load_records(&path, format) {
                Ok(records) => {
                    info!(path = %path.display(), count = records.len(), "Trade history loaded");
                    records
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to load trade history");
                    Vec::new()
                }
            }
        } else {
            info!(path = %path.display(), "Trade history file not found, starting empty");
            Vec::new()
        };

        Self {
            target: Some((path, format)),
            records: Mutex::new(records),
        }
    }

    /// Build from the history section of the configuration
    pub fn from_config(config: &HistoryConfig) -> Self {
        if config.enabled {
            Self::open(&config.path, config.format)
        } else {
            Self::in_memory()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.target.as_ref().map(|(path, _)| path.as_path())
    }

    /// Append one record and persist the full history
    #[instrument(skip(self, record), fields(operation = %record.operation_type, price = %record.price))]
    pub async fn append(&self, record: TradeRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.push(record);

        if let Some((path, format)) = &self.target {
            let bytes = encode_records(&records, *format)?;
            tokio::fs::write(path, bytes).await?;
            debug!(path = %path.display(), "Trade history saved");
        }
        Ok(())
    }

    /// Snapshot of all records in insertion order
    pub async fn records(&self) -> Vec<TradeRecord> {
        self.records.lock().await.clone()
    }

    /// Statistics over every recorded trade
    pub async fn overall_statistics(&self) -> TradeStatistics {
        let records = self.records.lock().await;
        TradeStatistics::from_records(records.iter())
    }

    /// Statistics over the trades of one session
    pub async fn session_statistics(&self, session_id: SessionId) -> TradeStatistics {
        let records = self.records.lock().await;
        TradeStatistics::from_records(
            records
                .iter()
                .filter(|record| record.session_id == Some(session_id)),
        )
    }
}

#[async_trait]
impl TradeRecorder for TradeHistory {
    async fn record(
        &self,
        session_id: SessionId,
        action: Action,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<bool> {
        let operation_type = match action {
            Action::Bought(_) => OperationType::Buy,
            Action::Sold(_) => OperationType::Sell,
            _ => return Ok(false),
        };

        let fill_price = action.trade_price().unwrap_or(price);
        self.append(TradeRecord::new(operation_type, fill_price, timestamp, Some(session_id)))
            .await?;
        Ok(true)
    }

    async fn statistics(&self, session_id: SessionId) -> Result<TradeStatistics> {
        Ok(self.session_statistics(session_id).await)
    }
}

fn load_records(path: &Path, format: HistoryFormat) -> Result<Vec<TradeRecord>> {
    match format {
        HistoryFormat::Json => {
            let contents = std::fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(serde_json::from_str(&contents)?)
        }
        HistoryFormat::Csv => {
            let mut reader = csv::Reader::from_path(path)?;
            reader
                .deserialize()
                .map(|row| row.map_err(BotError::from))
                .collect()
        }
    }
}

fn encode_records(records: &[TradeRecord], format: HistoryFormat) -> Result<Vec<u8>> {
    match format {
        HistoryFormat::Json => Ok(serde_json::to_vec_pretty(records)?),
        HistoryFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for record in records {
                writer.serialize(record)?;
            }
            writer
                .into_inner()
                .map_err(|e| BotError::Internal(format!("Failed to flush CSV: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_history_format_parse() {
        assert_eq!("JSON".parse::<HistoryFormat>().unwrap(), HistoryFormat::Json);
        assert_eq!(" csv ".parse::<HistoryFormat>().unwrap(), HistoryFormat::Csv);
        assert!("xml".parse::<HistoryFormat>().is_err());
    }

    #[tokio::test]
    async fn test_record_ignores_non_trades() {
        let history = TradeHistory::in_memory();
        let session = SessionId(1);

        for action in [Action::Hold, Action::NoBuyFunds, Action::NoSellPositions] {
            let written = history.record(session, action, dec!(100), ts(0)).await.unwrap();
            assert!(!written);
        }
        assert!(history.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_statistics_per_session() {
        let history = TradeHistory::in_memory();

        history.record(SessionId(1), Action::Bought(dec!(90)), dec!(90), ts(1)).await.unwrap();
        history.record(SessionId(1), Action::Bought(dec!(80)), dec!(80), ts(2)).await.unwrap();
        history.record(SessionId(1), Action::Sold(dec!(99)), dec!(99), ts(3)).await.unwrap();
        history.record(SessionId(2), Action::Sold(dec!(10)), dec!(10), ts(4)).await.unwrap();

        let stats = history.statistics(SessionId(1)).await.unwrap();
        assert_eq!(
            stats,
            TradeStatistics {
                total_buys: 2,
                total_sells: 1,
                average_buy_price: dec!(85),
                average_sell_price: dec!(99),
            }
        );

        let overall = history.overall_statistics().await;
        assert_eq!(overall.total_sells, 2);
        assert_eq!(overall.average_sell_price, dec!(54.5));

        let empty = history.statistics(SessionId(9)).await.unwrap();
        assert_eq!(empty, TradeStatistics::default());
    }

    #[tokio::test]
    async fn test_json_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let history = TradeHistory::open(&path, HistoryFormat::Json);
        history.record(SessionId(1), Action::Bought(dec!(89)), dec!(89), ts(10)).await.unwrap();
        history.record(SessionId(1), Action::Sold(dec!(110)), dec!(110), ts(20)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"operation_type\": \"buy\""));

        let reopened = TradeHistory::open(&path, HistoryFormat::Json);
        assert_eq!(reopened.records().await, history.records().await);
    }

    #[tokio::test]
    async fn test_csv_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let history = TradeHistory::open(&path, HistoryFormat::Csv);
        history.record(SessionId(4), Action::Bought(dec!(43000.5)), dec!(43000.5), ts(10)).await.unwrap();
        history.record(SessionId(4), Action::Sold(dec!(47300)), dec!(47300), ts(20)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("operation_type,price,timestamp,session_id"));

        let reopened = TradeHistory::open(&path, HistoryFormat::Csv);
        let records = reopened.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].operation_type, OperationType::Buy);
        assert_eq!(records[0].price, dec!(43000.5));
        assert_eq!(records[1].session_id, Some(SessionId(4)));
    }

    #[tokio::test]
    async fn test_loads_records_without_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"[{"operation_type": "buy", "price": 100.5, "timestamp": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let history = TradeHistory::open(&path, HistoryFormat::Json);
        let records = history.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, dec!(100.5));
        assert_eq!(records[0].session_id, None);
        assert_eq!(history.overall_statistics().await.total_buys, 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let history = TradeHistory::open(&path, HistoryFormat::Json);
        assert!(history.records().await.is_empty());

        history.record(SessionId(1), Action::Bought(dec!(1)), dec!(1), ts(0)).await.unwrap();
        let reopened = TradeHistory::open(&path, HistoryFormat::Json);
        assert_eq!(reopened.records().await.len(), 1);
    }

    #[test]
    fn test_from_config_disabled_is_in_memory() {
        let config = HistoryConfig {
            enabled: false,
            ..HistoryConfig::default()
        };
        assert!(TradeHistory::from_config(&config).path().is_none());
    }
}
