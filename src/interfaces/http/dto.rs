//! Request and response bodies for the HTTP surface.

use crate::application::ml::PredictionInput;
use crate::application::ml::model_service::HealthReport;
use crate::domain::market::Ohlcv;
use crate::domain::ml::{ConfidenceTier, Prediction};
use crate::domain::ports::FetchHints;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub data: PredictionInput,
    #[serde(default)]
    pub include_features: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolPredictRequest {
    pub symbol: String,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub include_features: bool,
}

impl SymbolPredictRequest {
    pub fn hints(&self) -> FetchHints {
        FetchHints {
            interval: self.interval.clone(),
            time_zone: self.time_zone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub probability: f64,
    pub confidence: ConfidenceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, f64>>,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            prediction: p.label,
            probability: p.probability,
            confidence: p.confidence,
            features: p.features,
        }
    }
}

/// One batch entry: either a prediction or the reason the bar was not scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Prediction(PredictionResponse),
    Error { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<BatchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolPredictionResponse {
    pub symbol: String,
    pub bar: Ohlcv,
    #[serde(flatten)]
    pub prediction: PredictionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub model_loaded: bool,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub report: HealthReport,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub model_loaded: bool,
}
