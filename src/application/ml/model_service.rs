//! Model lifecycle: startup load-or-build, retrain, fallback rebuild and health.
//!
//! Fitting and disk I/O are blocking and run on `spawn_blocking`. The new pair
//! only becomes visible through a single registry swap once it is complete.

use super::demo_trainer::{DemoModelBuilder, DemoTrainingConfig};
use super::model_bundle::{ModelMetadata, ModelSource, PersistedModel};
use super::model_registry::ModelRegistry;
use super::model_store::ModelStore;
use crate::infrastructure::observability::Metrics;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// A model is loaded but an operator-facing failure was observed since it was installed.
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub model_loaded: bool,
    pub last_error: Option<String>,
    pub model: Option<ModelMetadata>,
}

pub struct ModelService {
    registry: Arc<ModelRegistry>,
    store: Option<Arc<dyn ModelStore>>,
    demo_config: DemoTrainingConfig,
    metrics: Metrics,
    /// Serializes builds so a retrain and a fallback never fit concurrently.
    train_lock: Mutex<()>,
    fallback_pending: AtomicBool,
}

impl ModelService {
    pub fn new(
        registry: Arc<ModelRegistry>,
        store: Option<Arc<dyn ModelStore>>,
        demo_config: DemoTrainingConfig,
        metrics: Metrics,
    ) -> Self {
        metrics.set_model_loaded(registry.is_loaded());
        Self {
            registry,
            store,
            demo_config,
            metrics,
            train_lock: Mutex::new(()),
            fallback_pending: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Loads the persisted pair, or builds and persists a demo pair when there
    /// is none or it cannot be used.
    pub async fn initialize(&self) -> Result<ModelMetadata> {
        if let Some(store) = &self.store {
            let loader = Arc::clone(store);
            let loaded = tokio::task::spawn_blocking(move || loader.load())
                .await
                .context("Model load task panicked")?;

            match loaded {
                Ok(Some(persisted)) => match persisted.into_bundle(ModelSource::Persisted) {
                    Ok(bundle) => {
                        info!("Loaded existing model from {}", store.location());
                        let metadata = bundle.metadata().clone();
                        self.registry.install(bundle);
                        self.record_install(ModelSource::Persisted);
                        return Ok(metadata);
                    }
                    Err(e) => warn!("Persisted model rejected ({}); rebuilding", e),
                },
                Ok(None) => info!(
                    "No model found at {}; creating new model with demo data",
                    store.location()
                ),
                Err(e) => error!("Error loading model: {:#}", e),
            }
        }

        self.rebuild(ModelSource::Demo).await
    }

    /// Builds a fresh demo pair and swaps it in. On failure the active pair stays.
    pub async fn retrain(&self) -> Result<ModelMetadata> {
        info!("Retraining model with fresh demo data");
        self.rebuild(ModelSource::Retrained).await
    }

    /// Starts a background demo build when no model is loaded.
    /// Returns false if a model is loaded or a fallback build is already running.
    pub fn schedule_fallback(self: &Arc<Self>) -> bool {
        if self.registry.is_loaded() {
            return false;
        }
        if self.fallback_pending.swap(true, Ordering::SeqCst) {
            return false;
        }

        let service = Arc::clone(self);
        tokio::spawn(async move {
            warn!("Model unavailable; building fallback demo model");
            if let Err(e) = service.rebuild(ModelSource::Fallback).await {
                error!("Fallback model build failed: {:#}", e);
            }
            service.fallback_pending.store(false, Ordering::SeqCst);
        });
        true
    }

    pub fn health(&self) -> HealthReport {
        let model = self
            .registry
            .snapshot()
            .ok()
            .map(|bundle| bundle.metadata().clone());
        let last_error = self.registry.last_error();

        let status = match (&model, &last_error) {
            (None, _) => HealthStatus::Unavailable,
            (Some(_), Some(_)) => HealthStatus::Degraded,
            (Some(_), None) => HealthStatus::Healthy,
        };

        HealthReport {
            status,
            model_loaded: model.is_some(),
            last_error,
            model,
        }
    }

    async fn rebuild(&self, source: ModelSource) -> Result<ModelMetadata> {
        let _guard = self.train_lock.lock().await;

        if source == ModelSource::Fallback
            && let Ok(bundle) = self.registry.snapshot()
        {
            info!("Model installed while fallback was queued; skipping rebuild");
            return Ok(bundle.metadata().clone());
        }

        let builder = DemoModelBuilder::new(self.demo_config);
        let persisted = tokio::task::spawn_blocking(move || builder.build())
            .await
            .context("Model build task panicked")??;

        let persisted = self.persist(persisted).await?;

        let bundle = persisted.into_bundle(source)?;
        let metadata = bundle.metadata().clone();
        self.registry.install(bundle);
        self.record_install(source);
        Ok(metadata)
    }

    /// Saves the pair if a store is configured. A failed save is logged, not fatal.
    async fn persist(&self, persisted: PersistedModel) -> Result<PersistedModel> {
        let Some(store) = &self.store else {
            return Ok(persisted);
        };

        let writer = Arc::clone(store);
        let (persisted, saved) = tokio::task::spawn_blocking(move || {
            let saved = writer.save(&persisted);
            (persisted, saved)
        })
        .await
        .context("Model save task panicked")?;

        match saved {
            Ok(()) => info!("Model saved to {}", store.location()),
            Err(e) => error!("Failed to persist model to {}: {:#}", store.location(), e),
        }
        Ok(persisted)
    }

    fn record_install(&self, source: ModelSource) {
        self.metrics.set_model_loaded(true);
        self.metrics.inc_installs(&source.to_string());
    }
}
