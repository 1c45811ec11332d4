use super::model_bundle::PersistedModel;
use anyhow::Result;

/// Durable storage for a fitted scaler/classifier pair.
///
/// Implementations are blocking; async callers go through `spawn_blocking`.
pub trait ModelStore: Send + Sync {
    /// Returns the stored pair, or `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PersistedModel>>;

    fn save(&self, model: &PersistedModel) -> Result<()>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}
