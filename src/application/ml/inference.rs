//! Inference pipeline
//!
//! Runs one observation through
//! `validate -> extract features -> scale -> classify -> bucket`.
//! Request payloads arrive as raw fields; the range check that builds an
//! [`Ohlcv`] is the first stage, so every item fails or succeeds on its own.

use super::model_bundle::ModelBundle;
use super::model_registry::ModelRegistry;
use crate::domain::errors::{InferenceError, ValidationError};
use crate::domain::market::{Ohlcv, OhlcvFields};
use crate::domain::ml::{Prediction, extract_features};
use crate::domain::validation::OhlcvValidator;
use crate::infrastructure::observability::Metrics;
use rayon::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Batches at least this large are scored on the rayon pool.
const PARALLEL_BATCH_THRESHOLD: usize = 64;

/// Request payload: one bar or an ordered list of bars, not yet range-checked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredictionInput {
    Single(OhlcvFields),
    Batch(Vec<OhlcvFields>),
}

impl PredictionInput {
    pub fn is_batch(&self) -> bool {
        matches!(self, PredictionInput::Batch(_))
    }

    /// Resolves the payload into a non-empty sequence of raw bars.
    pub fn into_raw_bars(self) -> Result<Vec<OhlcvFields>, ValidationError> {
        match self {
            PredictionInput::Single(bar) => Ok(vec![bar]),
            PredictionInput::Batch(bars) if bars.is_empty() => Err(ValidationError::EmptyBatch),
            PredictionInput::Batch(bars) => Ok(bars),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Attach the derived feature map to every prediction.
    pub include_features: bool,
}

pub struct InferencePipeline {
    registry: Arc<ModelRegistry>,
    metrics: Metrics,
}

impl InferencePipeline {
    pub fn new(registry: Arc<ModelRegistry>, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Scores a single observation.
    pub fn predict_one(
        &self,
        bar: &Ohlcv,
        options: InferenceOptions,
    ) -> Result<Prediction, InferenceError> {
        let bundle = self.acquire()?;
        self.observe(&bundle, bar, options)
    }

    /// Scores every observation against one snapshot, preserving input order.
    ///
    /// The outer error is returned only when no model is loaded; per-item
    /// failures are reported in place.
    pub fn predict_batch(
        &self,
        bars: &[Ohlcv],
        options: InferenceOptions,
    ) -> Result<Vec<Result<Prediction, InferenceError>>, InferenceError> {
        let bundle = self.acquire()?;
        Ok(self.score_each(bars, |bar| self.observe(&bundle, bar, options)))
    }

    /// Range-checks and scores one raw bar.
    pub fn predict_raw(
        &self,
        raw: &OhlcvFields,
        options: InferenceOptions,
    ) -> Result<Prediction, InferenceError> {
        let bundle = self.acquire()?;
        self.observe_raw(&bundle, raw, options)
    }

    /// Batch form of [`predict_raw`](Self::predict_raw). A bar that fails its
    /// range check gets its own error entry; the rest are still scored.
    pub fn predict_raw_batch(
        &self,
        raws: &[OhlcvFields],
        options: InferenceOptions,
    ) -> Result<Vec<Result<Prediction, InferenceError>>, InferenceError> {
        let bundle = self.acquire()?;
        Ok(self.score_each(raws, |raw| self.observe_raw(&bundle, raw, options)))
    }

    fn score_each<T, F>(&self, items: &[T], score: F) -> Vec<Result<Prediction, InferenceError>>
    where
        T: Sync,
        F: Fn(&T) -> Result<Prediction, InferenceError> + Sync + Send,
    {
        if items.len() >= PARALLEL_BATCH_THRESHOLD {
            items.par_iter().map(&score).collect()
        } else {
            items.iter().map(&score).collect()
        }
    }

    fn observe_raw(
        &self,
        bundle: &ModelBundle,
        raw: &OhlcvFields,
        options: InferenceOptions,
    ) -> Result<Prediction, InferenceError> {
        match Ohlcv::try_from(*raw) {
            Ok(bar) => self.observe(bundle, &bar, options),
            Err(e) => {
                let e = InferenceError::from(e);
                self.report_failure(&e);
                Err(e)
            }
        }
    }

    fn acquire(&self) -> Result<Arc<ModelBundle>, InferenceError> {
        self.registry.snapshot().map_err(|e| {
            self.report_failure(&e);
            e
        })
    }

    fn observe(
        &self,
        bundle: &ModelBundle,
        bar: &Ohlcv,
        options: InferenceOptions,
    ) -> Result<Prediction, InferenceError> {
        let started = Instant::now();
        let result = run_stages(bundle, bar, options);
        self.metrics.observe_latency(started.elapsed().as_secs_f64());

        match &result {
            Ok(prediction) => self.metrics.inc_predictions(prediction.confidence.as_str()),
            Err(e) => self.report_failure(e),
        }
        result
    }

    fn report_failure(&self, e: &InferenceError) {
        self.metrics.inc_failures(e.kind());
        if e.is_operator_facing() {
            error!("Inference failed: {}", e);
            self.registry.record_failure(e);
        } else {
            debug!("Observation rejected: {}", e);
        }
    }
}

/// The per-observation stage chain against a fixed snapshot.
fn run_stages(
    bundle: &ModelBundle,
    bar: &Ohlcv,
    options: InferenceOptions,
) -> Result<Prediction, InferenceError> {
    OhlcvValidator::validate(bar)?;

    let features = extract_features(bar);
    let scaled = bundle.scaler().transform(features.as_slice())?;
    let probabilities = bundle.classifier().predict_proba(&scaled)?;

    let mut prediction = Prediction::from_probabilities(probabilities);
    if options.include_features {
        prediction.features = Some(features.to_map());
    }
    Ok(prediction)
}
