use serde::{Deserialize, Serialize};

/// Continuous market mood in [-1.0, +1.0].
///
/// -1.0 is an extreme bear market, 0.0 neutral/sideways, +1.0 an extreme
/// bull market. Construction always yields a finite, in-range value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegimeScore(f64);

impl RegimeScore {
    pub const EXTREME_BEAR: RegimeScore = RegimeScore(-1.0);
    pub const NEUTRAL: RegimeScore = RegimeScore(0.0);
    pub const EXTREME_BULL: RegimeScore = RegimeScore(1.0);

    /// NaN maps to neutral, infinities saturate, everything else is clamped.
    pub fn new(value: f64) -> Self {
        Self(sanitize_score(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn label(self) -> RegimeLabel {
        RegimeLabel::from_score(self.0)
    }
}

impl From<f64> for RegimeScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<RegimeScore> for f64 {
    fn from(score: RegimeScore) -> Self {
        score.0
    }
}

/// Clamp `value` into [-1, 1], mapping NaN to 0.0.
pub fn sanitize_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Scores above this are bull; at or below its negation, bear.
pub const LABEL_THRESHOLD: f64 = 0.15;

/// Discrete label kept alongside each history row for readers that still
/// think in bull/bear/sideways terms. The sideways label is stored as
/// `"neutral"`, the value existing `discrete_regime` readers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeLabel {
    Bear,
    #[serde(rename = "neutral", alias = "sideways")]
    Sideways,
    Bull,
}

impl RegimeLabel {
    pub fn from_score(score: f64) -> Self {
        let score = sanitize_score(score);
        if score > LABEL_THRESHOLD {
            Self::Bull
        } else if score <= -LABEL_THRESHOLD {
            Self::Bear
        } else {
            Self::Sideways
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bear => "bear",
            Self::Sideways => "neutral",
            Self::Bull => "bull",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bear" => Some(Self::Bear),
            "sideways" | "neutral" => Some(Self::Sideways),
            "bull" => Some(Self::Bull),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_and_neutralizes_non_finite() {
        assert_eq!(RegimeScore::new(1.7).value(), 1.0);
        assert_eq!(RegimeScore::new(-3.0).value(), -1.0);
        assert_eq!(RegimeScore::new(f64::NAN).value(), 0.0);
        assert_eq!(RegimeScore::new(f64::INFINITY).value(), 1.0);
        assert_eq!(RegimeScore::new(f64::NEG_INFINITY).value(), -1.0);
        assert!((RegimeScore::new(0.42).value() - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(RegimeLabel::from_score(0.8), RegimeLabel::Bull);
        assert_eq!(RegimeLabel::from_score(0.2), RegimeLabel::Bull);
        assert_eq!(RegimeLabel::from_score(0.15), RegimeLabel::Sideways);
        assert_eq!(RegimeLabel::from_score(0.0), RegimeLabel::Sideways);
        assert_eq!(RegimeLabel::from_score(-0.1499), RegimeLabel::Sideways);
        assert_eq!(RegimeLabel::from_score(-0.15), RegimeLabel::Bear);
        assert_eq!(RegimeLabel::from_score(-0.2), RegimeLabel::Bear);
        assert_eq!(RegimeLabel::from_score(-0.8), RegimeLabel::Bear);
    }

    #[test]
    fn label_string_round_trip() {
        for label in [RegimeLabel::Bear, RegimeLabel::Sideways, RegimeLabel::Bull] {
            assert_eq!(RegimeLabel::parse(label.as_str()), Some(label));
        }
        assert_eq!(RegimeLabel::Sideways.as_str(), "neutral");
        assert_eq!(RegimeLabel::parse("sideways"), Some(RegimeLabel::Sideways));
        assert_eq!(RegimeLabel::parse("moon"), None);
    }
}
