//! REST API client for the exchange market data endpoints

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::signed_params;
use super::messages::{ApiResponse, TickersResult};
use crate::common::errors::{BotError, Result};
use crate::common::traits::PriceFeed;
use crate::config::types::{ApiCredentials, ExchangeConfig};

/// Path of the ticker endpoint
pub const TICKERS_PATH: &str = "/v5/market/tickers";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST API client for exchange prices
#[derive(Debug, Clone)]
pub struct ExchangeRestClient {
    /// HTTP client
    client: Client,
    /// Base URL of the REST API
    base_url: String,
    /// Market category (spot, linear, ...)
    category: String,
    /// Optional API credentials; requests are signed when present
    credentials: Option<ApiCredentials>,
}

impl ExchangeRestClient {
    /// Create a new REST client (unauthenticated, spot market)
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            category: "spot".to_string(),
            credentials: None,
        })
    }

    /// Build a client from the exchange section of the configuration
    pub fn from_config(config: &ExchangeConfig, timeout: Duration) -> Result<Self> {
        let client = Self::with_timeout(&config.rest_url, timeout)?.with_category(&config.category);

        Ok(match config.credentials() {
            Some(creds) => client.with_credentials(creds),
            None => client,
        })
    }

    /// Set API credentials for signed requests
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the market category sent with ticker requests
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for a request, signed if credentials are set
    fn query_params(&self, params: BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
        match &self.credentials {
            Some(creds) => signed_params(
                &creds.api_key,
                &creds.api_secret,
                params,
                chrono::Utc::now().timestamp_millis(),
            ),
            None => Ok(params),
        }
    }

    fn endpoint_url(&self, path: &str, params: &BTreeMap<String, String>) -> Result<Url> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params.iter())
            .map_err(|e| BotError::Configuration(format!("Invalid exchange URL: {}", e)))
    }

    /// Get ticker data for a symbol
    #[instrument(skip(self))]
    pub async fn get_tickers(&self, symbol: &str) -> Result<TickersResult> {
        let mut params = BTreeMap::new();
        params.insert("category".to_string(), self.category.clone());
        params.insert("symbol".to_string(), symbol.to_string());

        let url = self.endpoint_url(TICKERS_PATH, &self.query_params(params)?)?;
        debug!("Fetching tickers from: {}{}", self.base_url, TICKERS_PATH);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let api_response: ApiResponse<TickersResult> = serde_json::from_str(&body)?;

        if !api_response.is_ok() {
            return Err(BotError::InvalidResponse(format!(
                "retCode {}: {}",
                api_response.ret_code, api_response.ret_msg
            )));
        }

        api_response
            .result
            .ok_or_else(|| BotError::InvalidResponse("Missing result".to_string()))
    }

    /// Get the last traded price for a symbol
    #[instrument(skip(self))]
    pub async fn get_current_price(&self, symbol: &str) -> Result<Decimal> {
        let tickers = self.get_tickers(symbol).await?;

        let ticker = tickers
            .list
            .first()
            .ok_or_else(|| BotError::InvalidResponse(format!("No ticker for {}", symbol)))?;

        Decimal::from_str(&ticker.last_price)
            .map_err(|e| BotError::InvalidResponse(format!("Invalid price: {}", e)))
    }
}

#[async_trait]
impl PriceFeed for ExchangeRestClient {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        self.get_current_price(symbol).await.map_err(|e| {
            warn!(symbol, error = %e, "Price fetch failed");
            match e {
                BotError::Fetch { .. } => e,
                other => BotError::fetch(symbol, other),
            }
        })
    }

    fn source_name(&self) -> &'static str {
        "exchange-rest"
    }
}
