use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adaptation::AnchorTables;
use crate::engine::RegimeSettings;
use crate::smoothing::Smoother;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub regime: RegimeConfig,
    pub storage: StorageConfig,
    pub market_data: MarketDataConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub anchors: AnchorTables,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegimeConfig {
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,
    #[serde(default = "default_window_days")]
    pub window_days: usize,
    #[serde(default = "default_adapt_threshold")]
    pub adapt_threshold: f64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataConfig {
    pub returns_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_smoothing_alpha() -> f64 {
    crate::smoothing::DEFAULT_SMOOTHING_ALPHA
}

fn default_window_days() -> usize {
    crate::engine::DEFAULT_WINDOW_DAYS
}

fn default_adapt_threshold() -> f64 {
    crate::adaptation::trigger::DEFAULT_ADAPT_THRESHOLD
}

fn default_refresh_interval() -> String {
    "1d".to_string()
}

fn default_log_file() -> String {
    "regime-engine.log".to_string()
}

/// Parse an interval string (e.g. "30s", "15m", "1h", "1d", "1w") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    if s.len() < 2 {
        bail!("invalid interval '{}': expected format like '1d'", s);
    }

    let (num_str, suffix) = s.split_at(s.len() - 1);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl RegimeConfig {
    pub fn refresh_interval_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.refresh_interval)
    }

    pub fn smoother(&self) -> Result<Smoother> {
        Smoother::new(self.smoothing_alpha).context("regime.smoothing_alpha is invalid")
    }

    pub fn settings(&self) -> RegimeSettings {
        RegimeSettings {
            window_days: self.window_days,
            adapt_threshold: self.adapt_threshold,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var("REGIME_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));
        let mut config = Self::load_from_path(&config_path)?;

        if let Ok(db_path) = std::env::var("REGIME_DB_PATH") {
            if !db_path.trim().is_empty() {
                config.storage.db_path = db_path;
            }
        }

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.regime.smoother()?;
        if self.regime.window_days == 0 {
            bail!("regime.window_days must be > 0");
        }
        if !self.regime.adapt_threshold.is_finite() || self.regime.adapt_threshold < 0.0 {
            bail!(
                "regime.adapt_threshold must be a non-negative number, got {}",
                self.regime.adapt_threshold
            );
        }
        self.regime
            .refresh_interval_ms()
            .context("regime.refresh_interval is invalid")?;
        if self.storage.db_path.trim().is_empty() {
            bail!("storage.db_path must not be empty");
        }
        self.anchors.validate().context("anchor tables are invalid")?;
        Ok(())
    }
}
