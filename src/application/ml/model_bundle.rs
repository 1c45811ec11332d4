//! Paired scaler + classifier snapshot.
//!
//! A [`ModelBundle`] is immutable once built. Construction checks both halves
//! against the compiled feature schema, so a scaler and a classifier fitted on
//! different feature layouts can never be served together.

use super::predictor::Classifier;
use super::smartcore_predictor::SmartCoreForest;
use crate::domain::errors::ModelError;
use crate::domain::ml::{FEATURE_COUNT, FEATURE_NAMES, FEATURE_SCHEMA_VERSION, StandardScaler};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where the active pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Persisted,
    Demo,
    Retrained,
    Fallback,
    External,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelSource::Persisted => "persisted",
            ModelSource::Demo => "demo",
            ModelSource::Retrained => "retrained",
            ModelSource::Fallback => "fallback",
            ModelSource::External => "external",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub schema_version: u32,
    pub classifier: String,
    pub trained_at: DateTime<Utc>,
    pub n_samples: usize,
    pub source: ModelSource,
}

pub struct ModelBundle {
    scaler: StandardScaler,
    classifier: Arc<dyn Classifier>,
    metadata: ModelMetadata,
}

impl ModelBundle {
    pub fn new(
        scaler: StandardScaler,
        classifier: Arc<dyn Classifier>,
        metadata: ModelMetadata,
    ) -> Result<Self, ModelError> {
        if scaler.n_features() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                component: "scaler",
                expected: FEATURE_COUNT,
                actual: scaler.n_features(),
            });
        }
        if classifier.n_features() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                component: "classifier",
                expected: FEATURE_COUNT,
                actual: classifier.n_features(),
            });
        }

        Ok(Self {
            scaler,
            classifier,
            metadata,
        })
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// On-disk form of a fitted pair. The feature names are stored alongside the
/// parameters and checked against [`FEATURE_NAMES`] on load.
#[derive(Serialize, Deserialize)]
pub struct PersistedModel {
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub forest: SmartCoreForest,
    pub trained_at: DateTime<Utc>,
    pub n_samples: usize,
}

impl PersistedModel {
    /// Stamps a freshly fitted pair with the current schema.
    pub fn new(scaler: StandardScaler, forest: SmartCoreForest, n_samples: usize) -> Self {
        Self {
            schema_version: FEATURE_SCHEMA_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            scaler,
            forest,
            trained_at: Utc::now(),
            n_samples,
        }
    }

    pub fn check_schema(&self) -> Result<(), ModelError> {
        let names_match = self.feature_names.len() == FEATURE_NAMES.len()
            && self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .all(|(a, b)| a == b);

        if self.schema_version != FEATURE_SCHEMA_VERSION || !names_match {
            return Err(ModelError::SchemaMismatch {
                expected_version: FEATURE_SCHEMA_VERSION,
                found_version: self.schema_version,
                found: self.feature_names.clone(),
            });
        }
        Ok(())
    }

    pub fn into_bundle(self, source: ModelSource) -> Result<ModelBundle, ModelError> {
        self.check_schema()?;

        let metadata = ModelMetadata {
            schema_version: self.schema_version,
            classifier: self.forest.name().to_string(),
            trained_at: self.trained_at,
            n_samples: self.n_samples,
            source,
        };
        ModelBundle::new(self.scaler, Arc::new(self.forest), metadata)
    }
}
