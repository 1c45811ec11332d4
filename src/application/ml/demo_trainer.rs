//! Demo model builder
//!
//! Generates a seeded synthetic bar set, derives features with the same
//! extractor used at inference time, and fits a scaler/forest pair on it.
//!
//! The label is the sign of the bar's own synthetic return, not of a later
//! bar, so the demo model does not learn a forward-looking relationship.
//! Real next-period labels would come from historical data instead.

use super::model_bundle::PersistedModel;
use super::smartcore_predictor::{ForestParameters, SmartCoreForest};
use crate::domain::errors::ModelError;
use crate::domain::market::Ohlcv;
use crate::domain::ml::prediction::{LABEL_DOWN, LABEL_UP};
use crate::domain::ml::{StandardScaler, extract_features};
use rand::SeedableRng;
use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemoTrainingConfig {
    pub n_samples: usize,
    pub seed: u64,
    /// Uniform range for the bar's open price.
    pub base_price_range: (f64, f64),
    /// Standard deviation of the normally distributed open-to-close return.
    pub return_std: f64,
    /// Standard deviation of the wick jitter applied above/below the body.
    pub jitter_std: f64,
    /// Uniform range for traded volume.
    pub volume_range: (f64, f64),
    pub forest: ForestParameters,
}

impl Default for DemoTrainingConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            seed: 42,
            base_price_range: (50.0, 200.0),
            return_std: 0.02,
            jitter_std: 0.01,
            volume_range: (1000.0, 100_000.0),
            forest: ForestParameters::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSample {
    pub bar: Ohlcv,
    pub synthetic_return: f64,
    pub label: u32,
}

fn training_err(e: impl std::fmt::Display) -> ModelError {
    ModelError::Training {
        reason: e.to_string(),
    }
}

pub struct DemoModelBuilder {
    config: DemoTrainingConfig,
}

impl DemoModelBuilder {
    pub fn new(config: DemoTrainingConfig) -> Self {
        Self { config }
    }

    /// Draws the synthetic bars. Same seed, same bars.
    pub fn generate_samples(&self) -> Result<Vec<SyntheticSample>, ModelError> {
        let cfg = &self.config;

        let price_dist = Uniform::new(cfg.base_price_range.0, cfg.base_price_range.1)
            .map_err(training_err)?;
        let volume_dist =
            Uniform::new(cfg.volume_range.0, cfg.volume_range.1).map_err(training_err)?;
        let return_dist = Normal::new(0.0, cfg.return_std).map_err(training_err)?;
        let jitter_dist = Normal::new(0.0, cfg.jitter_std).map_err(training_err)?;

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut samples = Vec::with_capacity(cfg.n_samples);

        for _ in 0..cfg.n_samples {
            let open = price_dist.sample(&mut rng);
            let ret = return_dist.sample(&mut rng);
            let close = open * (1.0 + ret);
            let high = open.max(close) * (1.0 + jitter_dist.sample(&mut rng).abs());
            let low = open.min(close) * (1.0 - jitter_dist.sample(&mut rng).abs());
            let volume = volume_dist.sample(&mut rng);

            let bar = Ohlcv::new(open, high, low, close, volume).map_err(training_err)?;
            samples.push(SyntheticSample {
                bar,
                synthetic_return: ret,
                label: if ret > 0.0 {
                    LABEL_UP as u32
                } else {
                    LABEL_DOWN as u32
                },
            });
        }

        Ok(samples)
    }

    /// Feature rows (schema order) and labels for the given samples.
    pub fn training_matrix(samples: &[SyntheticSample]) -> (Vec<Vec<f64>>, Vec<u32>) {
        samples
            .iter()
            .map(|s| (extract_features(&s.bar).to_vec(), s.label))
            .unzip()
    }

    /// Generates data and fits a fresh scaler/forest pair. Blocking.
    pub fn build(&self) -> Result<PersistedModel, ModelError> {
        info!(
            "Creating demo model ({} samples, seed {})",
            self.config.n_samples, self.config.seed
        );

        let samples = self.generate_samples()?;
        let (x, y) = Self::training_matrix(&samples);

        let scaler = StandardScaler::fit(&x)?;
        let x_scaled = x
            .iter()
            .map(|row| scaler.transform(row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ModelError::Training {
                reason: e.to_string(),
            })?;

        let forest = SmartCoreForest::fit(&x_scaled, &y, self.config.forest)?;

        info!("Demo model created");
        Ok(PersistedModel::new(scaler, forest, samples.len()))
    }
}
