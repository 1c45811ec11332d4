use crate::domain::errors::MarketDataError;
use crate::domain::market::Ohlcv;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Optional hints for locating the bar to fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchHints {
    /// Bar interval in provider notation (e.g. "1h"). Provider default when absent.
    pub interval: Option<String>,
    /// Timezone used by the provider to align bar boundaries (e.g. "+08:00").
    pub time_zone: Option<String>,
}

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Returns the most recent available bar for `symbol`.
    async fn latest_bar(&self, symbol: &str, hints: &FetchHints) -> Result<Ohlcv, MarketDataError>;

    fn name(&self) -> &str;
}
