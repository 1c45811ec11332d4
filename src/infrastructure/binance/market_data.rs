//! Binance Market Data Service
//!
//! Fetches the most recent candle (kline) for a symbol over the public
//! `/api/v3/klines` REST endpoint.

use crate::domain::errors::MarketDataError;
use crate::domain::market::Ohlcv;
use crate::domain::ports::{FetchHints, MarketDataService};
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, query_string};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
    default_interval: String,
}

impl BinanceMarketDataService {
    pub fn builder() -> BinanceMarketDataServiceBuilder {
        BinanceMarketDataServiceBuilder::default()
    }

    fn klines_url(&self, symbol: &str, hints: &FetchHints) -> String {
        let interval = hints
            .interval
            .as_deref()
            .unwrap_or(self.default_interval.as_str());

        let mut params = vec![
            ("symbol", normalize_symbol(symbol)),
            ("interval", interval.to_string()),
            ("limit", "1".to_string()),
        ];
        if let Some(tz) = hints.time_zone.as_deref() {
            params.push(("timeZone", tz.to_string()));
        }

        format!("{}/api/v3/klines?{}", self.base_url, query_string(&params))
    }
}

#[derive(Default)]
pub struct BinanceMarketDataServiceBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    default_interval: Option<String>,
    timeout: Option<Duration>,
}

impl BinanceMarketDataServiceBuilder {
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn default_interval(mut self, interval: String) -> Self {
        self.default_interval = Some(interval);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> anyhow::Result<BinanceMarketDataService> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(BinanceMarketDataService {
            client: HttpClientFactory::create_client(
                self.timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            )?,
            api_key: self.api_key,
            base_url,
            default_interval: self
                .default_interval
                .unwrap_or_else(|| DEFAULT_INTERVAL.to_string()),
        })
    }
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn latest_bar(&self, symbol: &str, hints: &FetchHints) -> Result<Ohlcv, MarketDataError> {
        let url = self.klines_url(symbol, hints);
        debug!("BinanceMarketDataService: GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("BinanceMarketDataService: request failed for {}: {}", symbol, e);
            MarketDataError::Unavailable {
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_error_status(symbol, status, &error_text));
        }

        // Binance klines format: [open_time, open, high, low, close, volume, close_time, ...]
        let klines: Vec<serde_json::Value> =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::IncompleteData {
                    symbol: symbol.to_string(),
                    reason: format!("unreadable klines response: {}", e),
                })?;

        let bar = parse_latest_kline(symbol, &klines)?;
        info!(
            "BinanceMarketDataService: Fetched latest bar for {} (close {})",
            symbol,
            bar.close()
        );
        Ok(bar)
    }

    fn name(&self) -> &str {
        "binance"
    }
}

/// Strips separators so `BTC/USDT` and `btc-usdt` both address `BTCUSDT`.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .trim()
        .chars()
        .filter(|c| *c != '/' && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

fn map_error_status(symbol: &str, status: StatusCode, body: &str) -> MarketDataError {
    warn!(
        "BinanceMarketDataService: klines for {} failed with {}: {}",
        symbol, status, body
    );
    // Binance answers an unknown symbol with 400 / code -1121
    if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
        MarketDataError::SymbolNotFound {
            symbol: symbol.to_string(),
        }
    } else {
        MarketDataError::Unavailable {
            reason: format!("HTTP {}: {}", status, body),
        }
    }
}

/// Builds an `Ohlcv` from the last entry of a klines payload.
pub fn parse_latest_kline(
    symbol: &str,
    klines: &[serde_json::Value],
) -> Result<Ohlcv, MarketDataError> {
    let incomplete = |reason: String| MarketDataError::IncompleteData {
        symbol: symbol.to_string(),
        reason,
    };

    let last = klines
        .last()
        .ok_or_else(|| incomplete("no bars returned".to_string()))?;
    let arr = last
        .as_array()
        .ok_or_else(|| incomplete("kline is not an array".to_string()))?;
    if arr.len() < 6 {
        return Err(incomplete(format!("kline has {} fields, need 6", arr.len())));
    }

    let field = |idx: usize, name: &str| -> Result<f64, MarketDataError> {
        let value = &arr[idx];
        value
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| value.as_f64())
            .ok_or_else(|| incomplete(format!("missing or malformed {}", name)))
    };

    let open = field(1, "open")?;
    let high = field(2, "high")?;
    let low = field(3, "low")?;
    let close = field(4, "close")?;
    let volume = field(5, "volume")?;

    Ohlcv::new(open, high, low, close, volume).map_err(|e| incomplete(e.to_string()))
}
