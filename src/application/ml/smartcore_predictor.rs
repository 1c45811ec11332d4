use super::predictor::Classifier;
use crate::domain::errors::{InferenceError, ModelError};
use crate::domain::ml::ClassProbabilities;
use crate::domain::ml::prediction::LABEL_UP;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use tracing::{debug, info};

type Tree = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// Ensemble shape. Fixed for the lifetime of a fitted forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParameters {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            seed: 42,
        }
    }
}

/// Bagged ensemble of smartcore decision trees.
///
/// Every tree is fitted on a bootstrap sample drawn from its own RNG seeded
/// with `seed + tree_index`, so fitting in parallel stays reproducible.
/// The probability of a class is the fraction of trees voting for it.
#[derive(Serialize, Deserialize)]
pub struct SmartCoreForest {
    trees: Vec<Tree>,
    n_features: usize,
    params: ForestParameters,
}

impl SmartCoreForest {
    pub fn fit(x: &[Vec<f64>], y: &[u32], params: ForestParameters) -> Result<Self, ModelError> {
        let n_samples = x.len();
        let n_features = x.first().map(|r| r.len()).ok_or(ModelError::EmptyTrainingSet)?;

        if y.len() != n_samples {
            return Err(ModelError::DimensionMismatch {
                component: "labels",
                expected: n_samples,
                actual: y.len(),
            });
        }
        if params.n_trees == 0 {
            return Err(ModelError::Training {
                reason: "ensemble needs at least one tree".to_string(),
            });
        }

        let tree_params = DecisionTreeClassifierParameters::default()
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_samples_split);

        info!(
            "Training decision forest (Trees: {}, Depth: {}, MinSplit: {}) on {} samples...",
            params.n_trees, params.max_depth, params.min_samples_split, n_samples
        );

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
                let mut rows = Vec::with_capacity(n_samples);
                let mut labels = Vec::with_capacity(n_samples);
                for _ in 0..n_samples {
                    let idx = rng.random_range(0..n_samples);
                    rows.push(x[idx].clone());
                    labels.push(y[idx]);
                }

                let matrix = DenseMatrix::from_2d_vec(&rows).map_err(|e| ModelError::Training {
                    reason: format!("Matrix error: {}", e),
                })?;
                let seeded = DecisionTreeClassifierParameters {
                    seed: Some(params.seed.wrapping_add(tree_idx as u64)),
                    ..tree_params.clone()
                };
                Tree::fit(&matrix, &labels, seeded).map_err(|e| ModelError::Training {
                    reason: format!("Tree {} failed: {}", tree_idx, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Decision forest fitted with {} trees", trees.len());

        Ok(Self {
            trees,
            n_features,
            params,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for SmartCoreForest {
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::FeatureMismatch {
                component: "classifier",
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(InferenceError::Classifier {
                reason: "forest has no trees".to_string(),
            });
        }

        let input_matrix =
            DenseMatrix::from_2d_vec(&vec![features.to_vec()]).map_err(|e| {
                InferenceError::Classifier {
                    reason: format!("Matrix creation failed: {}", e),
                }
            })?;

        let mut up_votes = 0usize;
        for tree in &self.trees {
            let predictions = tree
                .predict(&input_matrix)
                .map_err(|e| InferenceError::Classifier {
                    reason: format!("Prediction failed: {}", e),
                })?;
            match predictions.first() {
                Some(&label) if label == LABEL_UP as u32 => up_votes += 1,
                Some(_) => {}
                None => {
                    return Err(InferenceError::Classifier {
                        reason: "No prediction returned".to_string(),
                    });
                }
            }
        }

        Ok(ClassProbabilities::from_up(
            up_votes as f64 / self.trees.len() as f64,
        ))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "SmartCore Decision Forest"
    }
}
