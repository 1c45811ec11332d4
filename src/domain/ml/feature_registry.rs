use crate::domain::market::Ohlcv;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bumped whenever `FEATURE_NAMES` changes order, meaning or length.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

pub const FEATURE_COUNT: usize = 15;

/// Ordered list of feature names.
/// This order MUST match exactly with the order used when the scaler and the
/// classifier were fitted. Any change here is a breaking change for persisted models.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "open",
    "high",
    "low",
    "close",
    "volume",
    "price_range",
    "body_size",
    "upper_shadow",
    "lower_shadow",
    "body_ratio",
    "upper_shadow_ratio",
    "lower_shadow_ratio",
    "volume_ratio",
    "price_change",
    "rsi_approx",
];

/// Fixed-order numeric encoding of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Name -> value map for diagnostics.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        FEATURE_NAMES
            .iter()
            .zip(self.0.iter())
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Derives the feature vector for a validated bar.
///
/// Pure arithmetic, no I/O. Any ratio with a non-positive denominator is 0
/// instead of infinity or NaN.
pub fn extract_features(bar: &Ohlcv) -> FeatureVector {
    let (open, high, low, close, volume) =
        (bar.open(), bar.high(), bar.low(), bar.close(), bar.volume());

    let price_range = high - low;
    let body_size = (close - open).abs();
    let upper_shadow = high - open.max(close);
    let lower_shadow = open.min(close) - low;

    let body_ratio = guarded_ratio(body_size, price_range);
    let upper_shadow_ratio = guarded_ratio(upper_shadow, price_range);
    let lower_shadow_ratio = guarded_ratio(lower_shadow, price_range);

    let volume_ratio = guarded_ratio(volume, high + low + close);

    let price_change = guarded_ratio(close - open, open);

    // Linear momentum proxy around 50, not a multi-period RSI.
    let rsi_approx = (50.0 + price_change * 10.0).clamp(0.0, 100.0);

    FeatureVector([
        open,
        high,
        low,
        close,
        volume,
        price_range,
        body_size,
        upper_shadow,
        lower_shadow,
        body_ratio,
        upper_shadow_ratio,
        lower_shadow_ratio,
        volume_ratio,
        price_change,
        rsi_approx,
    ])
}
