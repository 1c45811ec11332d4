//! File persistence for the fitted scaler/classifier pair.
//!
//! The pair is stored as a single JSON document so the scaler and the forest
//! can never be written or read independently of each other.

use crate::application::ml::model_bundle::PersistedModel;
use crate::application::ml::model_store::ModelStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handles persistence of the fitted model to disk.
pub struct JsonModelRepository {
    file_path: PathBuf,
}

impl JsonModelRepository {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl ModelStore for JsonModelRepository {
    fn load(&self) -> Result<Option<PersistedModel>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).context("Failed to read model file")?;
        let model: PersistedModel =
            serde_json::from_str(&content).context("Failed to parse model JSON")?;

        info!("Loaded model from {:?}", self.file_path);
        Ok(Some(model))
    }

    fn save(&self, model: &PersistedModel) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create model directory")?;
        }

        let content = serde_json::to_string(model).context("Failed to serialize model")?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp file")?;
        fs::rename(&temp_path, &self.file_path).context("Failed to rename temp file")?;

        info!("Saved model to {:?}", self.file_path);
        Ok(())
    }

    fn location(&self) -> String {
        self.file_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::demo_trainer::{DemoModelBuilder, DemoTrainingConfig};
    use crate::application::ml::model_bundle::ModelSource;
    use crate::application::ml::smartcore_predictor::ForestParameters;
    use crate::domain::market::Ohlcv;
    use crate::domain::ml::extract_features;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_test_repository() -> (JsonModelRepository, PathBuf) {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "nexthour_test_{}_{}_{}_model",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        fs::create_dir_all(&temp_dir).expect("Failed to create test temp dir");
        (
            JsonModelRepository::new(temp_dir.join("nested").join("model.json")),
            temp_dir,
        )
    }

    fn cleanup_test_dir(temp_dir: PathBuf) {
        fs::remove_dir_all(temp_dir).ok();
    }

    fn small_model() -> PersistedModel {
        DemoModelBuilder::new(DemoTrainingConfig {
            n_samples: 120,
            forest: ForestParameters {
                n_trees: 4,
                max_depth: 4,
                min_samples_split: 5,
                seed: 3,
            },
            ..Default::default()
        })
        .build()
        .unwrap()
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (repo, temp_dir) = create_test_repository();
        assert!(repo.load().unwrap().is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_and_load_gives_same_predictions() {
        let (repo, temp_dir) = create_test_repository();
        let model = small_model();
        let bar = Ohlcv::new(100.0, 105.0, 98.0, 102.0, 50_000.0).unwrap();
        let raw = extract_features(&bar);

        repo.save(&model).unwrap();
        assert!(repo.path().exists());
        assert!(!repo.path().with_extension("tmp").exists());

        let original = model.into_bundle(ModelSource::Demo).ok().unwrap();
        let loaded = repo
            .load()
            .unwrap()
            .unwrap()
            .into_bundle(ModelSource::Persisted)
            .ok()
            .unwrap();

        let a = original.scaler().transform(raw.as_slice()).unwrap();
        let b = loaded.scaler().transform(raw.as_slice()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            original.classifier().predict_proba(&a).unwrap(),
            loaded.classifier().predict_proba(&b).unwrap()
        );
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let (repo, temp_dir) = create_test_repository();
        fs::create_dir_all(repo.path().parent().unwrap()).unwrap();
        fs::write(repo.path(), "{not json").unwrap();
        assert!(repo.load().is_err());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_schema_mismatch_detected_on_load() {
        let (repo, temp_dir) = create_test_repository();
        let mut model = small_model();
        model.feature_names.swap(0, 1);
        repo.save(&model).unwrap();

        let loaded = repo.load().unwrap().unwrap();
        assert!(loaded.into_bundle(ModelSource::Persisted).is_err());
        cleanup_test_dir(temp_dir);
    }
}
