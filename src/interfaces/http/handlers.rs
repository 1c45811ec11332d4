use super::AppState;
use super::dto::{
    BatchItem, BatchPredictionResponse, ErrorResponse, HealthResponse, PredictRequest,
    PredictionResponse, RetrainResponse, RootResponse, SymbolPredictRequest,
    SymbolPredictionResponse,
};
use crate::application::ml::InferenceOptions;
use crate::application::ml::model_service::HealthStatus;
use crate::domain::errors::{InferenceError, MarketDataError};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Error reply carrying the HTTP status and a `{"detail": ...}` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        let status = match &e {
            InferenceError::Rejected(_) => StatusCode::BAD_REQUEST,
            InferenceError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            InferenceError::FeatureMismatch { .. } | InferenceError::Classifier { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<MarketDataError> for ApiError {
    fn from(e: MarketDataError) -> Self {
        let status = match &e {
            MarketDataError::SymbolNotFound { .. } => StatusCode::NOT_FOUND,
            MarketDataError::IncompleteData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MarketDataError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

/// Maps an inference failure to a reply; a missing model also queues a fallback build.
fn inference_failure(state: &AppState, e: InferenceError) -> ApiError {
    if e == InferenceError::ModelUnavailable && state.model_service.schedule_fallback() {
        warn!("Prediction requested without a model; fallback build scheduled");
    }
    ApiError::from(e)
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let endpoints = BTreeMap::from([
        ("health", "/health"),
        ("metrics", "/metrics"),
        ("predict", "/predict"),
        ("predict_symbol", "/predict/symbol"),
        ("retrain", "/retrain"),
    ]);
    Json(RootResponse {
        message: "Price Predictor API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        model_loaded: state.model_service.registry().is_loaded(),
        endpoints,
    })
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = state.model_service.health();
    let status = if report.status == HealthStatus::Unavailable {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(HealthResponse {
            report,
            timestamp: Utc::now(),
        }),
    )
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let options = InferenceOptions {
        include_features: request.include_features,
    };
    let is_batch = request.data.is_batch();
    let raws = request
        .data
        .into_raw_bars()
        .map_err(|e| ApiError::from(InferenceError::from(e)))?;

    if let (false, [raw]) = (is_batch, raws.as_slice()) {
        let prediction = state
            .pipeline
            .predict_raw(raw, options)
            .map_err(|e| inference_failure(&state, e))?;
        return Ok(Json(PredictionResponse::from(prediction)).into_response());
    }

    let pipeline = state.pipeline.clone();
    let results = tokio::task::spawn_blocking(move || pipeline.predict_raw_batch(&raws, options))
        .await
        .map_err(|e| {
            error!("Batch prediction task failed: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed")
        })?
        .map_err(|e| inference_failure(&state, e))?;

    let predictions = results
        .into_iter()
        .map(|result| match result {
            Ok(prediction) => BatchItem::Prediction(prediction.into()),
            Err(e) => BatchItem::Error {
                error: e.to_string(),
            },
        })
        .collect();
    Ok(Json(BatchPredictionResponse { predictions }).into_response())
}

pub async fn predict_symbol(
    State(state): State<AppState>,
    payload: Result<Json<SymbolPredictRequest>, JsonRejection>,
) -> Result<Json<SymbolPredictionResponse>, ApiError> {
    let Json(request) = payload?;
    let symbol = request.symbol.trim().to_string();
    if symbol.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "symbol must not be empty"));
    }

    let bar = state
        .market_data
        .latest_bar(&symbol, &request.hints())
        .await
        .map_err(|e| {
            warn!("Market data fetch for {} failed: {}", symbol, e);
            ApiError::from(e)
        })?;

    let options = InferenceOptions {
        include_features: request.include_features,
    };
    let prediction = state
        .pipeline
        .predict_one(&bar, options)
        .map_err(|e| inference_failure(&state, e))?;

    Ok(Json(SymbolPredictionResponse {
        symbol,
        bar,
        prediction: prediction.into(),
    }))
}

pub async fn retrain(State(state): State<AppState>) -> Result<Json<RetrainResponse>, ApiError> {
    match state.model_service.retrain().await {
        Ok(metadata) => {
            info!("Model retrained ({} samples)", metadata.n_samples);
            Ok(Json(RetrainResponse {
                message: "Model retrained successfully".to_string(),
                timestamp: Utc::now(),
                model_loaded: state.model_service.registry().is_loaded(),
            }))
        }
        Err(e) => {
            error!("Retrain error: {:#}", e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Retraining failed: {}", e),
            ))
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
