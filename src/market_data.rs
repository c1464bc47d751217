use std::path::{Path, PathBuf};

use crate::error::{RegimeError, Result};

/// Source of daily fractional returns for a composite market index.
pub trait MarketIndexProvider {
    /// Trailing `window_days` daily returns, oldest first. Fewer available
    /// observations than requested is [`RegimeError::InsufficientData`].
    fn get_index_returns(&self, window_days: usize) -> Result<Vec<f64>>;
}

impl<P: MarketIndexProvider + ?Sized> MarketIndexProvider for &P {
    fn get_index_returns(&self, window_days: usize) -> Result<Vec<f64>> {
        (**self).get_index_returns(window_days)
    }
}

/// Reads a JSON array of daily returns, as exported by the price pipeline.
#[derive(Debug, Clone)]
pub struct JsonFileReturnsProvider {
    path: PathBuf,
}

impl JsonFileReturnsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarketIndexProvider for JsonFileReturnsProvider {
    fn get_index_returns(&self, window_days: usize) -> Result<Vec<f64>> {
        let payload = std::fs::read_to_string(&self.path).map_err(|e| {
            RegimeError::MarketData(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let returns: Vec<f64> = serde_json::from_str(&payload)?;
        trailing_window(returns, window_days)
    }
}

/// Keep the last `window_days` values; error when fewer exist.
pub fn trailing_window(mut returns: Vec<f64>, window_days: usize) -> Result<Vec<f64>> {
    if window_days == 0 || returns.len() < window_days {
        return Err(RegimeError::InsufficientData {
            required: window_days.max(1),
            available: returns.len(),
        });
    }
    let start = returns.len() - window_days;
    Ok(returns.split_off(start))
}
