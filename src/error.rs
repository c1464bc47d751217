use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegimeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("insufficient data: need {required} observations, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("record at {recorded_at} is older than the latest entry at {latest}")]
    OutOfOrder {
        recorded_at: chrono::DateTime<chrono::Utc>,
        latest: chrono::DateTime<chrono::Utc>,
    },

    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegimeError {
    /// `true` for failures of the persistence layer itself. These are never
    /// replaced by a neutral fallback.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::LockPoisoned | Self::Io(_))
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, RegimeError>;
