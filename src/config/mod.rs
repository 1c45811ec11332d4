//! Configuration module for Nexthour.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Model and Market Data.

mod market_data_config;
mod model_config;
mod server_config;

pub use market_data_config::{MarketDataEnvConfig, MarketDataMode};
pub use model_config::{DEFAULT_MODEL_PATH, ModelEnvConfig};
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub model: ModelEnvConfig,
    pub market_data: MarketDataEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerEnvConfig::from_env(),
            model: ModelEnvConfig::from_env(),
            market_data: MarketDataEnvConfig::from_env()
                .context("Failed to load market data config")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects model settings that cannot produce a usable forest.
    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if model.n_trees == 0 {
            anyhow::bail!("MODEL_N_TREES must be at least 1");
        }
        if model.max_depth == 0 {
            anyhow::bail!("MODEL_MAX_DEPTH must be at least 1");
        }
        if model.demo_samples == 0 {
            anyhow::bail!("DEMO_SAMPLES must be at least 1");
        }
        if model.min_samples_split < 2 {
            anyhow::bail!(
                "MODEL_MIN_SAMPLES_SPLIT must be at least 2, got {}",
                model.min_samples_split
            );
        }
        if self.server.port == 0 {
            anyhow::bail!("SERVER_PORT must be non-zero");
        }
        Ok(())
    }
}
