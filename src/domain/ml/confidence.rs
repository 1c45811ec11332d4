use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound (inclusive) of the High tier.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;
/// Lower bound (inclusive) of the Medium tier.
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Discrete bucket derived from the classifier's maximum class probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_probability(max_prob: f64) -> Self {
        if max_prob >= HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceTier::High
        } else if max_prob >= MEDIUM_CONFIDENCE_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(ConfidenceTier::from_probability(0.8), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_probability(0.6), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_probability(0.7999999), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_probability(0.5999999), ConfidenceTier::Low);
    }

    #[test]
    fn test_tiers_partition_unit_interval() {
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let tier = ConfidenceTier::from_probability(p);
            let expected = if p >= 0.8 {
                ConfidenceTier::High
            } else if p >= 0.6 {
                ConfidenceTier::Medium
            } else {
                ConfidenceTier::Low
            };
            assert_eq!(tier, expected, "p = {}", p);
        }
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&ConfidenceTier::Medium).unwrap(),
            "\"Medium\""
        );
    }
}
