use crate::adaptation::anchors::AnchorTables;
use crate::adaptation::types::{AdaptiveParameters, AdaptiveWeights, QualityGateThresholds};
use crate::error::Result;
use crate::regime::score::sanitize_score;

/// Maps a regime score onto scoring weights, the optimizer blend and the
/// quality-gate thresholds. Every method is total over `f64`.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveParameterMapper {
    anchors: AnchorTables,
}

impl AdaptiveParameterMapper {
    pub fn new(anchors: AnchorTables) -> Result<Self> {
        anchors.validate()?;
        Ok(Self { anchors })
    }

    pub fn anchors(&self) -> &AnchorTables {
        &self.anchors
    }

    pub fn weights(&self, score: f64) -> AdaptiveWeights {
        let weights = self
            .anchors
            .weights
            .interpolate(score)
            .into_iter()
            .map(|(k, v)| (k, v.clamp(0.0, 1.0)))
            .collect();
        AdaptiveWeights::new(weights)
    }

    pub fn blend(&self, score: f64) -> f64 {
        self.anchors.blend.interpolate(score).clamp(0.0, 1.0)
    }

    pub fn quality_gates(&self, score: f64) -> QualityGateThresholds {
        self.anchors.quality_gates.interpolate(score).clamped()
    }

    pub fn parameters(&self, score: f64) -> AdaptiveParameters {
        AdaptiveParameters {
            regime_score: sanitize_score(score),
            weights: self.weights(score),
            blend: self.blend(score),
            quality_gates: self.quality_gates(score),
        }
    }
}
