pub mod confidence;
pub mod feature_registry;
pub mod prediction;
pub mod scaler;

pub use confidence::ConfidenceTier;
pub use feature_registry::{
    FEATURE_COUNT, FEATURE_NAMES, FEATURE_SCHEMA_VERSION, FeatureVector, extract_features,
};
pub use prediction::{ClassProbabilities, Prediction};
pub use scaler::StandardScaler;
