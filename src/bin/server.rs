//! Nexthour Server - price direction prediction API
//!
//! Loads (or builds) the fitted model and serves predictions over HTTP.
//!
//! # Usage
//! ```sh
//! SERVER_PORT=8000 MARKET_DATA_MODE=mock cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - listen address (default: 0.0.0.0:8000)
//! - `MODEL_PATH` - persisted model location (default: data/ml/price_predictor_model.json)
//! - `MODEL_PERSIST` - write built models to `MODEL_PATH` (default: true)
//! - `MARKET_DATA_MODE` - `binance` or `mock` (default: binance)
//! - `MARKET_DATA_TIMEOUT_SECS` - Binance request timeout (default: 10)

use anyhow::{Context, Result};
use nexthour::application::ml::{InferencePipeline, ModelRegistry, ModelService, ModelStore};
use nexthour::config::{Config, MarketDataMode};
use nexthour::domain::ports::MarketDataService;
use nexthour::infrastructure::observability::Metrics;
use nexthour::infrastructure::{BinanceMarketDataService, JsonModelRepository, MockMarketDataService};
use nexthour::interfaces::http::{AppState, create_router};
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Nexthour Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: model_path={:?}, persist={}, market_data={:?}",
        config.model.model_path, config.model.persist, config.market_data.mode
    );

    let metrics = Metrics::new()?;
    let registry = Arc::new(ModelRegistry::new());

    let store: Option<Arc<dyn ModelStore>> = if config.model.persist {
        Some(Arc::new(JsonModelRepository::new(
            config.model.model_path.clone(),
        )))
    } else {
        None
    };

    let model_service = Arc::new(ModelService::new(
        registry.clone(),
        store,
        config.model.demo_training_config(),
        metrics.clone(),
    ));

    // A failed startup build leaves the service up; predictions answer 503 and
    // the first one schedules a fallback build.
    match model_service.initialize().await {
        Ok(metadata) => info!(
            "Model ready: {} ({}, {} samples, trained {})",
            metadata.classifier, metadata.source, metadata.n_samples, metadata.trained_at
        ),
        Err(e) => error!("Model initialization failed: {:#}", e),
    }

    let market_data: Arc<dyn MarketDataService> = match config.market_data.mode {
        MarketDataMode::Binance => Arc::new(
            BinanceMarketDataService::builder()
                .base_url(config.market_data.binance_base_url.clone())
                .api_key(config.market_data.binance_api_key.clone())
                .default_interval(config.market_data.interval.clone())
                .timeout(config.market_data.timeout())
                .build()?,
        ),
        MarketDataMode::Mock => Arc::new(MockMarketDataService::with_sample_bars()),
    };
    info!("Market data provider: {}", market_data.name());

    let state = AppState {
        pipeline: Arc::new(InferencePipeline::new(registry, metrics.clone())),
        model_service,
        market_data,
        metrics,
    };

    let address = config.server.socket_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Exiting...");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
