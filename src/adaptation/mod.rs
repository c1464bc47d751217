pub mod anchors;
pub mod mapper;
pub mod params_store;
pub mod trigger;
pub mod types;

pub use anchors::{AnchorSet, AnchorTables, Interpolate};
pub use mapper::AdaptiveParameterMapper;
pub use params_store::{AdaptiveParamsStore, ParameterType};
pub use trigger::{crossed_boundary, should_adapt, KEY_BOUNDARIES};
pub use types::{AdaptiveParameters, AdaptiveWeights, QualityGateThresholds, WEIGHT_CATEGORIES};
