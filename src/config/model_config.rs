//! Model lifecycle configuration parsing from environment variables.
//!
//! Covers where the fitted pair is stored and how the demo pair is built.

use crate::application::ml::demo_trainer::DemoTrainingConfig;
use crate::application::ml::smartcore_predictor::ForestParameters;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL_PATH: &str = "data/ml/price_predictor_model.json";

/// Model environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub persist: bool,
    pub demo_samples: usize,
    pub demo_seed: u64,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        let forest = ForestParameters::default();
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            persist: true,
            demo_samples: 1000,
            demo_seed: forest.seed,
            n_trees: forest.n_trees,
            max_depth: forest.max_depth,
            min_samples_split: forest.min_samples_split,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl ModelEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            persist: parse_or("MODEL_PERSIST", defaults.persist),
            demo_samples: parse_or("DEMO_SAMPLES", defaults.demo_samples),
            demo_seed: parse_or("DEMO_SEED", defaults.demo_seed),
            n_trees: parse_or("MODEL_N_TREES", defaults.n_trees),
            max_depth: parse_or("MODEL_MAX_DEPTH", defaults.max_depth),
            min_samples_split: parse_or("MODEL_MIN_SAMPLES_SPLIT", defaults.min_samples_split),
        }
    }

    pub fn forest_parameters(&self) -> ForestParameters {
        ForestParameters {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.demo_seed,
        }
    }

    pub fn demo_training_config(&self) -> DemoTrainingConfig {
        DemoTrainingConfig {
            n_samples: self.demo_samples,
            seed: self.demo_seed,
            forest: self.forest_parameters(),
            ..DemoTrainingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_trainer() {
        let config = ModelEnvConfig::default();
        let demo = config.demo_training_config();
        assert_eq!(demo.n_samples, 1000);
        assert_eq!(demo.seed, 42);
        assert_eq!(demo.forest, ForestParameters::default());
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(config.persist);
    }
}
