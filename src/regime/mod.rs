pub mod calculator;
pub mod normalizer;
pub mod score;
pub mod series;

pub use calculator::{
    score_from_components, score_from_metrics, score_from_return_series, BearOverride,
    BearOverrideRule,
};
pub use normalizer::{MarketMetrics, NormalizedComponents};
pub use score::{RegimeLabel, RegimeScore};
pub use series::ReturnSeriesStats;
