use crate::domain::errors::MarketDataError;
use crate::domain::market::Ohlcv;
use crate::domain::ports::{FetchHints, MarketDataService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Serves bars from an in-memory table. Used for local runs and tests.
#[derive(Clone, Default)]
pub struct MockMarketDataService {
    bars: Arc<RwLock<HashMap<String, Ohlcv>>>,
    unavailable: Arc<RwLock<Option<String>>>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock preloaded with a handful of plausible hourly bars.
    pub fn with_sample_bars() -> Self {
        let mut bars = HashMap::new();
        let samples = [
            ("BTCUSDT", (64_250.0, 64_900.0, 63_980.0, 64_710.0, 1_250.5)),
            ("ETHUSDT", (3_120.0, 3_155.0, 3_098.0, 3_104.0, 18_400.0)),
            ("SOLUSDT", (142.1, 144.8, 141.7, 144.2, 95_300.0)),
        ];
        for (symbol, (o, h, l, c, v)) in samples {
            if let Ok(bar) = Ohlcv::new(o, h, l, c, v) {
                bars.insert(symbol.to_string(), bar);
            }
        }
        Self {
            bars: Arc::new(RwLock::new(bars)),
            unavailable: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn insert_bar(&self, symbol: &str, bar: Ohlcv) {
        self.bars.write().await.insert(symbol.to_uppercase(), bar);
    }

    /// Makes every subsequent fetch fail as if the provider were down.
    pub async fn set_unavailable(&self, reason: Option<String>) {
        *self.unavailable.write().await = reason;
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn latest_bar(&self, symbol: &str, _hints: &FetchHints) -> Result<Ohlcv, MarketDataError> {
        if let Some(reason) = self.unavailable.read().await.clone() {
            return Err(MarketDataError::Unavailable { reason });
        }

        let bars = self.bars.read().await;
        match bars.get(&symbol.to_uppercase()) {
            Some(bar) => {
                info!("MockMarketDataService: serving bar for {}", symbol);
                Ok(*bar)
            }
            None => Err(MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_symbol_not_found() {
        let mock = MockMarketDataService::new();
        let result = tokio_test::block_on(mock.latest_bar("NOPE", &FetchHints::default()));
        assert_eq!(
            result,
            Err(MarketDataError::SymbolNotFound {
                symbol: "NOPE".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_inserted_bar_is_served_case_insensitively() {
        let mock = MockMarketDataService::new();
        let bar = Ohlcv::new(100.0, 105.0, 98.0, 102.0, 50_000.0).unwrap();
        mock.insert_bar("btcusdt", bar).await;

        let fetched = mock.latest_bar("BTCUSDT", &FetchHints::default()).await.unwrap();
        assert_eq!(fetched, bar);
    }

    #[tokio::test]
    async fn test_unavailable_overrides_lookup() {
        let mock = MockMarketDataService::with_sample_bars();
        mock.set_unavailable(Some("maintenance".to_string())).await;

        let err = mock
            .latest_bar("BTCUSDT", &FetchHints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Unavailable { .. }));

        mock.set_unavailable(None).await;
        assert!(mock.latest_bar("BTCUSDT", &FetchHints::default()).await.is_ok());
    }
}
