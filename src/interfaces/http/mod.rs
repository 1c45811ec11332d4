//! HTTP API for the predictor service.

pub mod dto;
pub mod handlers;

use crate::application::ml::{InferencePipeline, ModelService};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::observability::Metrics;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
    pub model_service: Arc<ModelService>,
    pub market_data: Arc<dyn MarketDataService>,
    pub metrics: Metrics,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/predict", post(handlers::predict))
        .route("/predict/symbol", post(handlers::predict_symbol))
        .route("/retrain", post(handlers::retrain))
        .with_state(state)
}
