use thiserror::Error;

/// Caller-facing rejections of a single observation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid OHLCV data: {field} must be positive, got {value}")]
    NonPositivePrice { field: &'static str, value: f64 },

    #[error("Invalid OHLCV data: {field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("Invalid OHLCV data: volume must be non-negative, got {value}")]
    NegativeVolume { value: f64 },

    #[error("Invalid OHLCV data: high {high} < low {low}")]
    HighBelowLow { high: f64, low: f64 },

    #[error("Invalid OHLCV data: high {high} < {field} {value}")]
    HighBelowBody {
        field: &'static str,
        high: f64,
        value: f64,
    },

    #[error("Invalid OHLCV data: low {low} > {field} {value}")]
    LowAboveBody {
        field: &'static str,
        low: f64,
        value: f64,
    },

    #[error("Batch must contain at least one observation")]
    EmptyBatch,
}

/// Failures of the market-data collaborator. Always reported to the caller verbatim.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MarketDataError {
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("Incomplete market data for {symbol}: {reason}")]
    IncompleteData { symbol: String, reason: String },

    #[error("Market data service unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors raised while running one observation through the inference pipeline.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Feature mismatch in {component}: expected {expected} features, got {actual}")]
    FeatureMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Classifier failed: {reason}")]
    Classifier { reason: String },
}

impl InferenceError {
    /// True for conditions that signal an unhealthy pipeline rather than bad input.
    pub fn is_operator_facing(&self) -> bool {
        !matches!(self, InferenceError::Rejected(_))
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::Rejected(_) => "rejected",
            InferenceError::ModelUnavailable => "model_unavailable",
            InferenceError::FeatureMismatch { .. } => "feature_mismatch",
            InferenceError::Classifier { .. } => "classifier",
        }
    }
}

/// Errors raised while building or loading a fitted scaler/classifier pair.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Feature schema mismatch: model was fitted on v{found_version} {found:?}, runtime expects v{expected_version}")]
    SchemaMismatch {
        expected_version: u32,
        found_version: u32,
        found: Vec<String>,
    },

    #[error("Dimension mismatch for {component}: expected {expected}, got {actual}")]
    DimensionMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Training failed: {reason}")]
    Training { reason: String },
}
