use super::confidence::ConfidenceTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label for "price goes up over the next period".
pub const LABEL_UP: u8 = 1;
/// Label for "price goes down (or stays flat) over the next period".
pub const LABEL_DOWN: u8 = 0;

/// Probability pair produced by a binary classifier. `down + up == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub down: f64,
    pub up: f64,
}

impl ClassProbabilities {
    /// Builds the pair from the probability of the up class, clamped to [0, 1].
    pub fn from_up(up: f64) -> Self {
        let up = up.clamp(0.0, 1.0);
        Self { down: 1.0 - up, up }
    }

    /// Ties resolve to the down class, matching an argmax over `[down, up]`.
    pub fn label(&self) -> u8 {
        if self.up > self.down { LABEL_UP } else { LABEL_DOWN }
    }

    pub fn max(&self) -> f64 {
        self.down.max(self.up)
    }
}

/// Outcome of a single inference call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: u8,
    pub probability: f64,
    pub confidence: ConfidenceTier,
    /// Derived feature map, filled only in diagnostic mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, f64>>,
}

impl Prediction {
    pub fn from_probabilities(probs: ClassProbabilities) -> Self {
        let probability = probs.max();
        Self {
            label: probs.label(),
            probability,
            confidence: ConfidenceTier::from_probability(probability),
            features: None,
        }
    }
}
