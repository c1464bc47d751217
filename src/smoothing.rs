use crate::error::{RegimeError, Result};
use crate::regime::RegimeScore;

/// Slow adaptation: one observation moves the smoothed score by 10% of the gap.
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.1;

/// Exponential moving average over persisted regime scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    alpha: f64,
}

impl Default for Smoother {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_SMOOTHING_ALPHA,
        }
    }
}

impl Smoother {
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(RegimeError::Config(format!(
                "smoothing alpha must be in (0, 1], got {alpha}"
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// `prev` is the last persisted smoothed score, `None` when no history
    /// exists yet. The first observation passes through unchanged.
    pub fn smooth(&self, prev: Option<RegimeScore>, raw: RegimeScore) -> RegimeScore {
        match prev {
            None => raw,
            Some(prev) => RegimeScore::new(
                self.alpha * raw.value() + (1.0 - self.alpha) * prev.value(),
            ),
        }
    }
}
