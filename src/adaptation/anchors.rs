use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::adaptation::types::{
    QualityGateThresholds, WEIGHT_CATEGORIES, WEIGHT_SUM_TOLERANCE,
};
use crate::error::{RegimeError, Result};
use crate::regime::score::sanitize_score;

/// Linear interpolation between two anchor values.
pub trait Interpolate: Sized {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for QualityGateThresholds {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        Self {
            fundamentals: f64::lerp(&from.fundamentals, &to.fundamentals, t),
            long_term: f64::lerp(&from.long_term, &to.long_term, t),
        }
    }
}

/// Keys missing from `to` keep their `from` value; validated tables never
/// hit that case.
impl Interpolate for BTreeMap<String, f64> {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        from.iter()
            .map(|(k, a)| {
                let b = to.get(k).unwrap_or(a);
                (k.clone(), f64::lerp(a, b, t))
            })
            .collect()
    }
}

/// Parameter values at the bearish, neutral and bullish extremes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnchorSet<T> {
    pub bearish: T,
    pub neutral: T,
    pub bullish: T,
}

impl<T: Interpolate> AnchorSet<T> {
    pub fn new(bearish: T, neutral: T, bullish: T) -> Self {
        Self {
            bearish,
            neutral,
            bullish,
        }
    }

    /// Neutral toward bullish for `score >= 0`, neutral toward bearish by
    /// `|score|` otherwise. The score is clamped to [-1, 1] first.
    pub fn interpolate(&self, score: f64) -> T {
        let score = sanitize_score(score);
        if score >= 0.0 {
            T::lerp(&self.neutral, &self.bullish, score)
        } else {
            T::lerp(&self.neutral, &self.bearish, score.abs())
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        [
            ("bearish", &self.bearish),
            ("neutral", &self.neutral),
            ("bullish", &self.bullish),
        ]
        .into_iter()
    }
}

/// All anchor tables the mapper interpolates over.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnchorTables {
    pub weights: AnchorSet<BTreeMap<String, f64>>,
    pub blend: AnchorSet<f64>,
    pub quality_gates: AnchorSet<QualityGateThresholds>,
}

impl Default for AnchorTables {
    fn default() -> Self {
        Self {
            // Bear markets lean on fundamentals, dividends and spread;
            // bull markets on growth and opportunity.
            weights: AnchorSet::new(
                weight_table([0.20, 0.25, 0.15, 0.10, 0.05, 0.07, 0.05, 0.13]),
                weight_table([0.25, 0.20, 0.12, 0.12, 0.08, 0.08, 0.05, 0.10]),
                weight_table([0.30, 0.15, 0.10, 0.15, 0.10, 0.08, 0.05, 0.07]),
            ),
            blend: AnchorSet::new(0.7, 0.5, 0.3),
            quality_gates: AnchorSet::new(
                QualityGateThresholds::new(0.65, 0.55),
                QualityGateThresholds::new(0.60, 0.50),
                QualityGateThresholds::new(0.55, 0.45),
            ),
        }
    }
}

fn weight_table(values: [f64; 8]) -> BTreeMap<String, f64> {
    WEIGHT_CATEGORIES
        .into_iter()
        .zip(values)
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl AnchorTables {
    /// Interpolating between vectors that each sum to one keeps the sum at
    /// one, so the tables are checked once here instead of renormalizing.
    pub fn validate(&self) -> Result<()> {
        let categories: BTreeSet<&str> = WEIGHT_CATEGORIES.into_iter().collect();

        for (name, table) in self.weights.iter() {
            let keys: BTreeSet<&str> = table.keys().map(String::as_str).collect();
            if keys != categories {
                let missing: Vec<&str> = categories.difference(&keys).copied().collect();
                let unknown: Vec<&str> = keys.difference(&categories).copied().collect();
                return Err(RegimeError::Config(format!(
                    "anchors.weights.{name} must list exactly the scoring categories \
                     (missing {missing:?}, unknown {unknown:?})"
                )));
            }
            for (category, weight) in table {
                check_unit(&format!("anchors.weights.{name}.{category}"), *weight)?;
            }
            let sum: f64 = table.values().sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(RegimeError::Config(format!(
                    "anchors.weights.{name} sums to {sum:.4}, expected 1.0"
                )));
            }
        }

        for (name, value) in self.blend.iter() {
            check_unit(&format!("anchors.blend.{name}"), *value)?;
        }
        for (name, gates) in self.quality_gates.iter() {
            check_unit(
                &format!("anchors.quality_gates.{name}.fundamentals"),
                gates.fundamentals,
            )?;
            check_unit(
                &format!("anchors.quality_gates.{name}.long_term"),
                gates.long_term,
            )?;
        }
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RegimeError::Config(format!(
            "{field} must be in [0, 1], got {value}"
        )))
    }
}
