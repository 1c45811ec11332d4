use chrono::Utc;
use nexthour::application::ml::{
    Classifier, InferenceOptions, InferencePipeline, ModelBundle, ModelMetadata, ModelRegistry,
    ModelSource,
};
use nexthour::domain::errors::{InferenceError, ValidationError};
use nexthour::domain::market::Ohlcv;
use nexthour::domain::ml::{
    ClassProbabilities, ConfidenceTier, FEATURE_COUNT, FEATURE_SCHEMA_VERSION, StandardScaler,
};
use nexthour::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Always answers with the same probability pair and counts its calls.
struct FixedClassifier {
    probs: ClassProbabilities,
    n_features: usize,
    calls: AtomicUsize,
}

impl FixedClassifier {
    fn new(down: f64, up: f64) -> Self {
        Self {
            probs: ClassProbabilities { down, up },
            n_features: FEATURE_COUNT,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Classifier for FixedClassifier {
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::FeatureMismatch {
                component: "classifier",
                expected: self.n_features,
                actual: features.len(),
            });
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probs)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn metadata() -> ModelMetadata {
    ModelMetadata {
        schema_version: FEATURE_SCHEMA_VERSION,
        classifier: "fixed".to_string(),
        trained_at: Utc::now(),
        n_samples: 0,
        source: ModelSource::External,
    }
}

fn pipeline_with(classifier: Arc<FixedClassifier>) -> InferencePipeline {
    let registry = Arc::new(ModelRegistry::new());
    let bundle = ModelBundle::new(StandardScaler::identity(FEATURE_COUNT), classifier, metadata())
        .ok()
        .expect("bundle should build");
    registry.install(bundle);
    InferencePipeline::new(registry, Metrics::new().unwrap())
}

fn reference_bar() -> Ohlcv {
    Ohlcv::new(100.0, 105.0, 98.0, 102.0, 50_000.0).unwrap()
}

#[test]
fn test_reference_bar_with_identity_scaler_predicts_high_up() {
    let classifier = Arc::new(FixedClassifier::new(0.1, 0.9));
    let pipeline = pipeline_with(classifier.clone());

    let prediction = pipeline
        .predict_one(&reference_bar(), InferenceOptions::default())
        .unwrap();

    assert_eq!(prediction.label, 1);
    assert_eq!(prediction.probability, 0.9);
    assert_eq!(prediction.confidence, ConfidenceTier::High);
    assert!(prediction.features.is_none());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_diagnostic_mode_returns_full_feature_map() {
    let pipeline = pipeline_with(Arc::new(FixedClassifier::new(0.1, 0.9)));
    let prediction = pipeline
        .predict_one(
            &reference_bar(),
            InferenceOptions {
                include_features: true,
            },
        )
        .unwrap();

    let features = prediction.features.unwrap();
    assert_eq!(features.len(), FEATURE_COUNT);
    assert_eq!(features["price_range"], 7.0);
    assert_eq!(features["body_size"], 2.0);
    assert_eq!(features["upper_shadow"], 3.0);
    assert_eq!(features["lower_shadow"], 2.0);
    assert!((features["volume_ratio"] - 50_000.0 / 305.0).abs() < 1e-9);
    assert!((features["price_change"] - 0.02).abs() < 1e-12);
    assert!((features["rsi_approx"] - 50.2).abs() < 1e-9);
}

#[test]
fn test_medium_and_low_tiers() {
    let medium = pipeline_with(Arc::new(FixedClassifier::new(0.3, 0.7)))
        .predict_one(&reference_bar(), InferenceOptions::default())
        .unwrap();
    assert_eq!(medium.confidence, ConfidenceTier::Medium);

    let low_down = pipeline_with(Arc::new(FixedClassifier::new(0.55, 0.45)))
        .predict_one(&reference_bar(), InferenceOptions::default())
        .unwrap();
    assert_eq!(low_down.label, 0);
    assert_eq!(low_down.probability, 0.55);
    assert_eq!(low_down.confidence, ConfidenceTier::Low);
}

#[test]
fn test_no_model_loaded_is_unavailable() {
    let pipeline = InferencePipeline::new(Arc::new(ModelRegistry::new()), Metrics::new().unwrap());
    let err = pipeline
        .predict_one(&reference_bar(), InferenceOptions::default())
        .unwrap_err();
    assert_eq!(err, InferenceError::ModelUnavailable);
    assert_eq!(err.to_string(), "Model not loaded");

    assert_eq!(
        pipeline.predict_batch(&[reference_bar()], InferenceOptions::default()),
        Err(InferenceError::ModelUnavailable)
    );
}

#[test]
fn test_inconsistent_bar_rejected_before_classifier() {
    let classifier = Arc::new(FixedClassifier::new(0.1, 0.9));
    let pipeline = pipeline_with(classifier.clone());

    let bar = Ohlcv::new(15.0, 10.0, 20.0, 15.0, 100.0).unwrap();
    let err = pipeline
        .predict_one(&bar, InferenceOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        InferenceError::Rejected(ValidationError::HighBelowLow { .. })
    ));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_boundary_violations_rejected_at_construction() {
    assert!(Ohlcv::new(0.0, 1.0, 1.0, 1.0, 1.0).is_err());
    assert!(Ohlcv::new(1.0, 1.0, 1.0, 1.0, -1.0).is_err());
    assert!(Ohlcv::new(f64::NAN, 1.0, 1.0, 1.0, 1.0).is_err());
    assert!(Ohlcv::new(1.0, f64::INFINITY, 1.0, 1.0, 1.0).is_err());
}

#[test]
fn test_batch_matches_individual_calls_in_order() {
    let pipeline = pipeline_with(Arc::new(FixedClassifier::new(0.2, 0.8)));
    let bars = vec![
        reference_bar(),
        Ohlcv::new(15.0, 10.0, 20.0, 15.0, 100.0).unwrap(),
        Ohlcv::new(50.0, 50.0, 50.0, 50.0, 0.0).unwrap(),
    ];
    let options = InferenceOptions {
        include_features: true,
    };

    let batch = pipeline.predict_batch(&bars, options).unwrap();
    assert_eq!(batch.len(), bars.len());
    for (bar, item) in bars.iter().zip(&batch) {
        assert_eq!(item, &pipeline.predict_one(bar, options));
    }
    assert!(batch[1].is_err());
}

#[test]
fn test_large_batch_preserves_order() {
    let pipeline = pipeline_with(Arc::new(FixedClassifier::new(0.2, 0.8)));
    let bars: Vec<Ohlcv> = (1..=200)
        .map(|i| {
            let p = i as f64;
            Ohlcv::new(p, p * 1.02, p * 0.98, p * 1.01, 1_000.0).unwrap()
        })
        .collect();
    let options = InferenceOptions {
        include_features: true,
    };

    let batch = pipeline.predict_batch(&bars, options).unwrap();
    for (bar, item) in bars.iter().zip(&batch) {
        let features = item.as_ref().unwrap().features.as_ref().unwrap();
        assert_eq!(features["close"], bar.close());
    }
}

#[test]
fn test_scaler_dimension_mismatch_is_operator_facing() {
    // A scaler narrower than the schema cannot be paired into a bundle.
    let narrow = StandardScaler::identity(FEATURE_COUNT - 1);
    let result = ModelBundle::new(narrow, Arc::new(FixedClassifier::new(0.5, 0.5)), metadata());
    assert!(result.is_err());

    let scaler = StandardScaler::identity(FEATURE_COUNT);
    let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        InferenceError::FeatureMismatch {
            expected: FEATURE_COUNT,
            actual: 2,
            ..
        }
    ));
    assert!(err.is_operator_facing());
}

#[test]
fn test_operator_facing_failures_are_recorded_for_health() {
    let registry = Arc::new(ModelRegistry::new());
    let pipeline = InferencePipeline::new(registry.clone(), Metrics::new().unwrap());
    let _ = pipeline.predict_one(&reference_bar(), InferenceOptions::default());
    assert_eq!(registry.last_error().as_deref(), Some("Model not loaded"));
}
