use std::sync::Arc;

use crate::adaptation::{
    crossed_boundary, should_adapt, AdaptiveParameterMapper, AdaptiveParameters,
    AdaptiveParamsStore, AdaptiveWeights, QualityGateThresholds,
};
use crate::error::Result;
use crate::market_data::MarketIndexProvider;
use crate::regime::{score_from_metrics, score_from_return_series, MarketMetrics, RegimeScore};
use crate::regime_store::{RegimeHistoryEntry, RegimeStore};

pub const DEFAULT_WINDOW_DAYS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeSettings {
    /// Trailing window of index returns scored per refresh.
    pub window_days: usize,
    /// Magnitude threshold handed to [`should_adapt`].
    pub adapt_threshold: f64,
}

impl Default for RegimeSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            adapt_threshold: crate::adaptation::trigger::DEFAULT_ADAPT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A new history row was appended.
    Recorded(RegimeHistoryEntry),
    /// No usable market data this cycle; `current` is the last known score.
    Skipped { current: RegimeScore, reason: String },
}

impl RefreshOutcome {
    pub fn current_score(&self) -> RegimeScore {
        match self {
            Self::Recorded(entry) => entry.smoothed_score,
            Self::Skipped { current, .. } => *current,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Regime control loop plus the parameter interface consumed by the
/// security scorer and the allocation/tag subsystem.
///
/// All state lives in the injected [`RegimeStore`], so independent engines
/// (one per portfolio, say) can coexist.
pub struct RegimeEngine<P: MarketIndexProvider> {
    provider: P,
    store: Arc<RegimeStore>,
    mapper: AdaptiveParameterMapper,
    params_store: Option<Arc<AdaptiveParamsStore>>,
    settings: RegimeSettings,
}

impl<P: MarketIndexProvider> RegimeEngine<P> {
    pub fn new(
        provider: P,
        store: Arc<RegimeStore>,
        mapper: AdaptiveParameterMapper,
        settings: RegimeSettings,
    ) -> Self {
        Self {
            provider,
            store,
            mapper,
            params_store: None,
            settings,
        }
    }

    pub fn with_params_store(mut self, params_store: Arc<AdaptiveParamsStore>) -> Self {
        self.params_store = Some(params_store);
        self
    }

    pub fn store(&self) -> &Arc<RegimeStore> {
        &self.store
    }

    pub fn mapper(&self) -> &AdaptiveParameterMapper {
        &self.mapper
    }

    pub fn settings(&self) -> RegimeSettings {
        self.settings
    }

    /// Score the trailing index window and append it to the history.
    ///
    /// Missing or short market data never fails the cycle: the last known
    /// score (neutral when empty) is reported instead. Storage errors are
    /// returned.
    pub fn refresh(&self) -> Result<RefreshOutcome> {
        let window = self.settings.window_days;
        let returns = match self.provider.get_index_returns(window) {
            Ok(returns) => returns,
            Err(e) => return self.skip(e.to_string()),
        };
        if returns.len() < window || returns.is_empty() {
            return self.skip(format!(
                "insufficient data: need {window} observations, have {}",
                returns.len()
            ));
        }

        let raw = score_from_return_series(&returns);
        tracing::debug!(
            observations = returns.len(),
            raw = raw.value(),
            "Scored market index window"
        );
        Ok(RefreshOutcome::Recorded(self.store.record(raw)?))
    }

    fn skip(&self, reason: String) -> Result<RefreshOutcome> {
        let current = self.store.current_score()?;
        tracing::warn!(
            reason = %reason,
            current = current.value(),
            "Skipping regime refresh, keeping last known score"
        );
        Ok(RefreshOutcome::Skipped { current, reason })
    }

    /// Record a score for callers that computed the metrics themselves.
    pub fn record_metrics(&self, metrics: &MarketMetrics) -> Result<RegimeHistoryEntry> {
        self.store.record(score_from_metrics(metrics))
    }

    pub fn get_current_regime_score(&self) -> Result<f64> {
        Ok(self.store.current_score()?.value())
    }

    pub fn calculate_adaptive_weights(&self, score: f64) -> AdaptiveWeights {
        self.mapper.weights(score)
    }

    pub fn calculate_adaptive_blend(&self, score: f64) -> f64 {
        self.mapper.blend(score)
    }

    pub fn calculate_adaptive_quality_gates(&self, score: f64) -> QualityGateThresholds {
        self.mapper.quality_gates(score)
    }

    pub fn should_adapt(&self, current: f64, last: f64, threshold: f64) -> bool {
        should_adapt(current, last, threshold)
    }

    /// Parameters for the current smoothed score.
    pub fn current_parameters(&self) -> Result<AdaptiveParameters> {
        Ok(self.mapper.parameters(self.get_current_regime_score()?))
    }

    /// Recompute and persist parameters when the score moved enough since
    /// the last adaptation.
    ///
    /// With a params store the reference is the score of the last persisted
    /// adaptation (none yet always adapts). Without one it is the previous
    /// history entry.
    pub fn adapt_if_needed(&self) -> Result<Option<AdaptiveParameters>> {
        let current = self.get_current_regime_score()?;
        let last = match &self.params_store {
            Some(params_store) => params_store.last_adapted_score()?,
            None => Some(current - self.store.score_change()?),
        };

        let adapt = match last {
            None => true,
            Some(last) => should_adapt(current, last, self.settings.adapt_threshold),
        };
        if !adapt {
            tracing::debug!(current, last, "Regime stable, parameters unchanged");
            return Ok(None);
        }

        let parameters = self.mapper.parameters(current);
        if let Some(params_store) = &self.params_store {
            params_store.persist(&parameters)?;
        }
        tracing::info!(
            current,
            last,
            crossed = last.and_then(|last| crossed_boundary(current, last)),
            blend = parameters.blend,
            "Adapted parameters to market regime"
        );
        Ok(Some(parameters))
    }
}
