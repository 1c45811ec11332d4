pub mod demo_trainer;
pub mod inference;
pub mod model_bundle;
pub mod model_registry;
pub mod model_service;
pub mod model_store;
pub mod predictor;
pub mod smartcore_predictor;

pub use demo_trainer::{DemoModelBuilder, DemoTrainingConfig};
pub use inference::{InferenceOptions, InferencePipeline, PredictionInput};
pub use model_bundle::{ModelBundle, ModelMetadata, ModelSource, PersistedModel};
pub use model_registry::ModelRegistry;
pub use model_service::{HealthReport, HealthStatus, ModelService};
pub use model_store::ModelStore;
pub use predictor::Classifier;
pub use smartcore_predictor::{ForestParameters, SmartCoreForest};
