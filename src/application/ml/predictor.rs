use crate::domain::errors::InferenceError;
use crate::domain::ml::ClassProbabilities;

/// Interface for fitted binary classifiers.
///
/// Implementations must be deterministic at inference time: the same fitted
/// state and the same input always give the same probabilities.
pub trait Classifier: Send + Sync {
    /// Class probabilities for one normalized feature vector.
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError>;

    /// Number of input features the classifier was fitted on.
    fn n_features(&self) -> usize;

    /// Get model name/type
    fn name(&self) -> &str;
}
