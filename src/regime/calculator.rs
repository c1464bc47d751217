use crate::regime::normalizer::{MarketMetrics, NormalizedComponents};
use crate::regime::score::RegimeScore;
use crate::regime::series::ReturnSeriesStats;

pub const RETURN_WEIGHT: f64 = 0.50;
pub const VOLATILITY_WEIGHT: f64 = 0.25;
pub const DRAWDOWN_WEIGHT: f64 = 0.25;

/// Multiplier applied before `tanh`. Values above 1 make the score more
/// sensitive near neutral and compress the extremes.
pub const TANH_COMPRESSION_FACTOR: f64 = 2.0;

/// Highest score a bear override may return.
pub const BEAR_CEILING: f64 = -0.15;

pub const BEAR_RETURN_THRESHOLD: f64 = -0.0005;
pub const BEAR_VOLATILITY_THRESHOLD: f64 = 0.03;
pub const BEAR_DRAWDOWN_THRESHOLD: f64 = -0.12;

/// Share given to the triggering component when re-weighting an override.
const DOMINANT_WEIGHT: f64 = 0.95;
const RESIDUAL_RETURN_WEIGHT: f64 = 0.05;

/// Weighted, tanh-compressed score of already-normalized components.
/// No override is applied here: raw thresholds are not visible.
pub fn score_from_components(components: &NormalizedComponents) -> RegimeScore {
    let raw = components.return_component * RETURN_WEIGHT
        + components.volatility_component * VOLATILITY_WEIGHT
        + components.drawdown_component * DRAWDOWN_WEIGHT;
    RegimeScore::new(compress(raw))
}

/// Normalize raw metrics, score them, then apply [`BearOverrideRule`].
pub fn score_from_metrics(metrics: &MarketMetrics) -> RegimeScore {
    let metrics = metrics.sanitized();
    let components = NormalizedComponents::from_metrics(&metrics);
    let weighted = score_from_components(&components);

    match BearOverrideRule::evaluate(&metrics, &components, weighted) {
        Some(forced) => {
            tracing::debug!(
                weighted = weighted.value(),
                forced = forced.score.value(),
                by_return = forced.by_return,
                by_volatility = forced.by_volatility,
                by_drawdown = forced.by_drawdown,
                "Bear override applied"
            );
            forced.score
        }
        None => weighted,
    }
}

/// Score a window of daily fractional returns. An empty (or entirely
/// non-finite) series is neutral.
pub fn score_from_return_series(returns: &[f64]) -> RegimeScore {
    match ReturnSeriesStats::from_returns(returns) {
        Some(stats) => score_from_metrics(&stats.metrics()),
        None => RegimeScore::NEUTRAL,
    }
}

fn compress(raw: f64) -> f64 {
    (raw * TANH_COMPRESSION_FACTOR).tanh()
}

/// Any single bad signal marks the market bearish, which a weighted average
/// cannot express on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BearOverride {
    pub score: RegimeScore,
    pub by_return: bool,
    pub by_volatility: bool,
    pub by_drawdown: bool,
}

pub struct BearOverrideRule;

impl BearOverrideRule {
    pub fn triggered(metrics: &MarketMetrics) -> bool {
        metrics.daily_return < BEAR_RETURN_THRESHOLD
            || metrics.volatility > BEAR_VOLATILITY_THRESHOLD
            || metrics.max_drawdown < BEAR_DRAWDOWN_THRESHOLD
    }

    /// Returns the forced score when at least one condition fires and the
    /// weighted score is not already at or below [`BEAR_CEILING`].
    pub fn evaluate(
        metrics: &MarketMetrics,
        components: &NormalizedComponents,
        weighted: RegimeScore,
    ) -> Option<BearOverride> {
        if !Self::triggered(metrics) || weighted.value() <= BEAR_CEILING {
            return None;
        }

        let by_return = metrics.daily_return < BEAR_RETURN_THRESHOLD;
        let by_volatility = metrics.volatility > BEAR_VOLATILITY_THRESHOLD;
        let by_drawdown = metrics.max_drawdown < BEAR_DRAWDOWN_THRESHOLD;

        let r = components.return_component;
        let candidates = [
            by_drawdown.then(|| {
                compress(r * RESIDUAL_RETURN_WEIGHT + components.drawdown_component * DOMINANT_WEIGHT)
            }),
            by_volatility.then(|| {
                compress(
                    r * RESIDUAL_RETURN_WEIGHT + components.volatility_component * DOMINANT_WEIGHT,
                )
            }),
            by_return.then(|| compress(r)),
        ];
        let most_negative = candidates
            .into_iter()
            .flatten()
            .fold(BEAR_CEILING, f64::min);

        Some(BearOverride {
            score: RegimeScore::new(most_negative),
            by_return,
            by_volatility,
            by_drawdown,
        })
    }
}
