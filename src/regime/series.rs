use crate::regime::normalizer::MarketMetrics;

/// Summary statistics of a daily-return window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnSeriesStats {
    pub observations: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub max_drawdown: f64,
}

impl ReturnSeriesStats {
    /// Non-finite returns are skipped. `None` when nothing usable remains.
    pub fn from_returns(returns: &[f64]) -> Option<Self> {
        let values: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        Some(Self {
            observations: values.len(),
            mean: mean(&values),
            std_dev: std_dev(&values),
            max_drawdown: max_drawdown(&values),
        })
    }

    pub fn metrics(&self) -> MarketMetrics {
        MarketMetrics::new(self.mean, self.std_dev, self.max_drawdown)
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let d = *v - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Largest peak-to-trough decline of the compounded value path starting
/// at 1.0. Returned as a non-positive fraction.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut value = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;
    for r in returns {
        value *= 1.0 + r;
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            worst = worst.min((value - peak) / peak);
        }
    }
    worst.max(-1.0)
}
