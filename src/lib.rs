pub mod adaptation;
pub mod config;
pub mod engine;
pub mod error;
pub mod market_data;
pub mod regime;
pub mod regime_store;
pub mod smoothing;
