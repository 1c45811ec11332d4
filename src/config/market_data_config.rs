//! Market-data collaborator configuration parsing from environment variables.

use crate::infrastructure::binance::market_data::{
    DEFAULT_BASE_URL, DEFAULT_INTERVAL, DEFAULT_TIMEOUT_SECS,
};
use anyhow::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which market-data collaborator serves `/predict/symbol`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketDataMode {
    Binance,
    Mock,
}

impl FromStr for MarketDataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(MarketDataMode::Binance),
            "mock" => Ok(MarketDataMode::Mock),
            _ => anyhow::bail!(
                "Invalid MARKET_DATA_MODE: {}. Must be 'binance' or 'mock'",
                s
            ),
        }
    }
}

/// Market data environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataEnvConfig {
    pub mode: MarketDataMode,
    pub binance_base_url: String,
    pub binance_api_key: Option<String>,
    pub interval: String,
    pub timeout_secs: u64,
}

impl Default for MarketDataEnvConfig {
    fn default() -> Self {
        Self {
            mode: MarketDataMode::Binance,
            binance_base_url: DEFAULT_BASE_URL.to_string(),
            binance_api_key: None,
            interval: DEFAULT_INTERVAL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let mode = match env::var("MARKET_DATA_MODE") {
            Ok(value) => MarketDataMode::from_str(&value)?,
            Err(_) => defaults.mode,
        };

        Ok(Self {
            mode,
            binance_base_url: env::var("BINANCE_BASE_URL").unwrap_or(defaults.binance_base_url),
            binance_api_key: env::var("BINANCE_API_KEY").ok().filter(|k| !k.is_empty()),
            interval: env::var("MARKET_DATA_INTERVAL").unwrap_or(defaults.interval),
            timeout_secs: env::var("MARKET_DATA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.timeout_secs),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(MarketDataMode::from_str("binance").unwrap(), MarketDataMode::Binance);
        assert_eq!(MarketDataMode::from_str(" MOCK ").unwrap(), MarketDataMode::Mock);
        assert!(MarketDataMode::from_str("alpaca").is_err());
    }

    #[test]
    fn test_default_timeout() {
        let config = MarketDataEnvConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
