use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const LONG_TERM: &str = "long_term";
pub const FUNDAMENTALS: &str = "fundamentals";
pub const DIVIDENDS: &str = "dividends";
pub const OPPORTUNITY: &str = "opportunity";
pub const SHORT_TERM: &str = "short_term";
pub const TECHNICALS: &str = "technicals";
pub const OPINION: &str = "opinion";
pub const DIVERSIFICATION: &str = "diversification";

/// Scoring categories consumed by the security scorer.
pub const WEIGHT_CATEGORIES: [&str; 8] = [
    LONG_TERM,
    FUNDAMENTALS,
    DIVIDENDS,
    OPPORTUNITY,
    SHORT_TERM,
    TECHNICALS,
    OPINION,
    DIVERSIFICATION,
];

/// Tolerance for the sum-to-one invariant of a weight vector.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Category name -> scoring weight. Values sum to 1.0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdaptiveWeights(BTreeMap<String, f64>);

impl AdaptiveWeights {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self(weights)
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.get(category).copied()
    }

    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.0
    }
}

/// Minimum sub-scores a security needs to pass the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityGateThresholds {
    pub fundamentals: f64,
    pub long_term: f64,
}

impl QualityGateThresholds {
    pub fn new(fundamentals: f64, long_term: f64) -> Self {
        Self {
            fundamentals,
            long_term,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            fundamentals: self.fundamentals.clamp(0.0, 1.0),
            long_term: self.long_term.clamp(0.0, 1.0),
        }
    }
}

/// Everything downstream consumers tune from one regime score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptiveParameters {
    pub regime_score: f64,
    pub weights: AdaptiveWeights,
    /// 0.0 favours one optimizer extreme, 1.0 the other.
    pub blend: f64,
    pub quality_gates: QualityGateThresholds,
}
