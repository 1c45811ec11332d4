use super::model_bundle::ModelBundle;
use crate::domain::errors::InferenceError;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Holder of the active [`ModelBundle`].
///
/// Readers clone the `Arc` and release the lock immediately; writers swap the
/// whole snapshot. A bundle is never mutated after installation, so an
/// in-flight prediction always sees one consistent scaler/classifier pair.
#[derive(Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<ModelBundle>>>,
    /// Last operator-facing failure since the current bundle was installed.
    last_error: RwLock<Option<String>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active snapshot or fails fast when none is loaded.
    pub fn snapshot(&self) -> Result<Arc<ModelBundle>, InferenceError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(InferenceError::ModelUnavailable)
    }

    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replaces the active pair in a single swap and clears the error state.
    /// Returns the bundle that was replaced, if any.
    pub fn install(&self, bundle: ModelBundle) -> Option<Arc<ModelBundle>> {
        let bundle = Arc::new(bundle);
        info!(
            "Installing model (source: {}, classifier: {}, trained_at: {})",
            bundle.metadata().source,
            bundle.metadata().classifier,
            bundle.metadata().trained_at
        );

        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(bundle);
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = None;
        previous
    }

    pub fn record_failure(&self, error: &InferenceError) {
        if error.is_operator_facing() {
            *self.last_error.write().unwrap_or_else(PoisonError::into_inner) =
                Some(error.to_string());
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
