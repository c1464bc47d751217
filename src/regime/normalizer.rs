/// Maps 0.0005 (0.05%/day, the reference bull threshold) to ~0.3.
pub const RETURN_SCALE: f64 = 600.0;
/// Daily volatility treated as normal.
pub const BASELINE_VOLATILITY: f64 = 0.02;
pub const VOLATILITY_SCALE: f64 = 15.0;
/// Peak-to-trough drawdown treated as normal.
pub const BASELINE_DRAWDOWN: f64 = -0.05;
pub const DRAWDOWN_SCALE: f64 = 5.8;

/// Raw market metrics for one evaluation window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketMetrics {
    /// Mean daily fractional return (0.001 = 0.1%/day).
    pub daily_return: f64,
    /// Standard deviation of the same daily returns.
    pub volatility: f64,
    /// Maximum peak-to-trough drawdown as a negative fraction (-0.15).
    pub max_drawdown: f64,
}

impl MarketMetrics {
    pub fn new(daily_return: f64, volatility: f64, max_drawdown: f64) -> Self {
        Self {
            daily_return,
            volatility,
            max_drawdown,
        }
    }

    /// Replace non-finite fields with their neutral baselines.
    pub fn sanitized(self) -> Self {
        Self {
            daily_return: finite_or(self.daily_return, 0.0),
            volatility: finite_or(self.volatility, BASELINE_VOLATILITY),
            max_drawdown: finite_or(self.max_drawdown, BASELINE_DRAWDOWN),
        }
    }
}

/// Three independent signals, each in [-1, 1]. Volatility and drawdown are
/// inverted: more of either pushes the component negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedComponents {
    pub return_component: f64,
    pub volatility_component: f64,
    pub drawdown_component: f64,
}

impl NormalizedComponents {
    pub fn from_metrics(metrics: &MarketMetrics) -> Self {
        Self {
            return_component: normalize_return(metrics.daily_return),
            volatility_component: normalize_volatility(metrics.volatility),
            drawdown_component: normalize_drawdown(metrics.max_drawdown),
        }
    }
}

pub fn normalize_return(daily_return: f64) -> f64 {
    clamp_unit(finite_or(daily_return, 0.0) * RETURN_SCALE)
}

pub fn normalize_volatility(volatility: f64) -> f64 {
    let volatility = finite_or(volatility, BASELINE_VOLATILITY);
    clamp_unit(-(volatility - BASELINE_VOLATILITY) * VOLATILITY_SCALE)
}

/// -0.15 maps to -0.58, a flat 0.0 drawdown to +0.29.
pub fn normalize_drawdown(max_drawdown: f64) -> f64 {
    let max_drawdown = finite_or(max_drawdown, BASELINE_DRAWDOWN);
    clamp_unit((max_drawdown - BASELINE_DRAWDOWN) * DRAWDOWN_SCALE)
}

fn clamp_unit(v: f64) -> f64 {
    v.clamp(-1.0, 1.0)
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}
