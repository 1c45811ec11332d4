//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementation of `ModelStore`.
//!
//! The pair is kept in its serialized JSON form, so a load goes through the
//! same deserialization and schema checks as the file-backed store.
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - No persistence across multiple instances

use crate::application::ml::model_bundle::PersistedModel;
use crate::application::ml::model_store::ModelStore;
use anyhow::{Context, Result};
use std::sync::{PoisonError, RwLock};

/// In-memory implementation of ModelStore
/// Suitable for testing and ephemeral deployments
pub struct InMemoryModelRepository {
    payload: RwLock<Option<String>>,
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self {
            payload: RwLock::new(None),
        }
    }

    pub fn has_model(&self) -> bool {
        self.payload
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for InMemoryModelRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStore for InMemoryModelRepository {
    fn load(&self) -> Result<Option<PersistedModel>> {
        let payload = self.payload.read().unwrap_or_else(PoisonError::into_inner);
        match payload.as_deref() {
            Some(json) => {
                let model =
                    serde_json::from_str(json).context("Failed to parse in-memory model")?;
                Ok(Some(model))
            }
            None => Ok(None),
        }
    }

    fn save(&self, model: &PersistedModel) -> Result<()> {
        let json = serde_json::to_string(model).context("Failed to serialize model")?;
        *self.payload.write().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::demo_trainer::{DemoModelBuilder, DemoTrainingConfig};
    use crate::application::ml::smartcore_predictor::ForestParameters;

    #[test]
    fn test_empty_repository_loads_none() {
        let repo = InMemoryModelRepository::new();
        assert!(!repo.has_model());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let repo = InMemoryModelRepository::new();
        let model = DemoModelBuilder::new(DemoTrainingConfig {
            n_samples: 80,
            forest: ForestParameters {
                n_trees: 3,
                max_depth: 3,
                min_samples_split: 5,
                seed: 1,
            },
            ..Default::default()
        })
        .build()
        .unwrap();

        repo.save(&model).unwrap();
        assert!(repo.has_model());

        let loaded = repo.load().unwrap().unwrap();
        assert_eq!(loaded.n_samples, 80);
        assert_eq!(loaded.scaler, model.scaler);
        assert!(loaded.check_schema().is_ok());
    }
}
