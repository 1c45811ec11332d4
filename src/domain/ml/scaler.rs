//! Standard (z-score) scaler with parameters fitted once and applied read-only.

use crate::domain::errors::{InferenceError, ModelError};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Fitted per-feature mean and scale, positionally aligned with the feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerParameters")]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Deserialize)]
struct ScalerParameters {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<ScalerParameters> for StandardScaler {
    type Error = ModelError;

    fn try_from(params: ScalerParameters) -> Result<Self, Self::Error> {
        StandardScaler::from_parameters(params.mean, params.scale)
    }
}

impl StandardScaler {
    /// Builds a scaler from already fitted parameters.
    pub fn from_parameters(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        if mean.len() != scale.len() {
            return Err(ModelError::DimensionMismatch {
                component: "scaler scale",
                expected: mean.len(),
                actual: scale.len(),
            });
        }
        Ok(Self { mean, scale })
    }

    /// Mean 0 / scale 1 for every column.
    pub fn identity(n_features: usize) -> Self {
        Self {
            mean: vec![0.0; n_features],
            scale: vec![1.0; n_features],
        }
    }

    /// Fits column means and population standard deviations.
    /// A constant column gets scale 1.0 so it maps to 0 instead of NaN.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let first = rows.first().ok_or(ModelError::EmptyTrainingSet)?;
        let n_features = first.len();

        if let Some(bad) = rows.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::DimensionMismatch {
                component: "training row",
                expected: n_features,
                actual: bad.len(),
            });
        }

        let mut mean = Vec::with_capacity(n_features);
        let mut scale = Vec::with_capacity(n_features);
        for col in 0..n_features {
            let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
            let std_dev = column.iter().population_std_dev();
            mean.push(column.iter().mean());
            scale.push(if std_dev > 0.0 && std_dev.is_finite() {
                std_dev
            } else {
                1.0
            });
        }

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// `(raw[i] - mean[i]) / scale[i]`. Refuses vectors of the wrong length
    /// instead of truncating or padding them.
    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if raw.len() != self.mean.len() {
            return Err(InferenceError::FeatureMismatch {
                component: "scaler",
                expected: self.mean.len(),
                actual: raw.len(),
            });
        }

        Ok(raw
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_noop() {
        let scaler = StandardScaler::identity(3);
        assert_eq!(scaler.transform(&[1.5, -2.0, 7.0]).unwrap(), vec![1.5, -2.0, 7.0]);
    }

    #[test]
    fn test_fit_population_std() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean(), &[2.0, 10.0]);
        // population std of [1, 3] is 1; constant column falls back to 1
        assert!((scaler.scale()[0] - 1.0).abs() < 1e-12);
        assert_eq!(scaler.scale()[1], 1.0);

        let z = scaler.transform(&[3.0, 10.0]).unwrap();
        assert!((z[0] - 1.0).abs() < 1e-12);
        assert_eq!(z[1], 0.0);
    }

    #[test]
    fn test_transform_length_mismatch() {
        let scaler = StandardScaler::identity(15);
        let err = scaler.transform(&[0.0; 14]).unwrap_err();
        assert_eq!(
            err,
            InferenceError::FeatureMismatch {
                component: "scaler",
                expected: 15,
                actual: 14
            }
        );
    }

    #[test]
    fn test_fit_rejects_empty_and_ragged() {
        assert!(matches!(
            StandardScaler::fit(&[]),
            Err(ModelError::EmptyTrainingSet)
        ));
        assert!(matches!(
            StandardScaler::fit(&[vec![1.0, 2.0], vec![1.0]]),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_parameters_checks_lengths() {
        assert!(StandardScaler::from_parameters(vec![0.0; 2], vec![1.0; 3]).is_err());
        assert!(StandardScaler::from_parameters(vec![0.0; 2], vec![1.0; 2]).is_ok());
    }

    #[test]
    fn test_deserialize_checks_lengths() {
        let ok: StandardScaler =
            serde_json::from_str(r#"{"mean":[1.0,2.0],"scale":[0.5,1.0]}"#).unwrap();
        assert_eq!(ok.n_features(), 2);

        let torn = serde_json::from_str::<StandardScaler>(r#"{"mean":[1.0,2.0],"scale":[0.5]}"#);
        assert!(torn.unwrap_err().to_string().contains("scaler scale"));
    }
}
