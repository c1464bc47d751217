use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use regime_engine::adaptation::{AdaptiveParameterMapper, AdaptiveParamsStore};
use regime_engine::config::Config;
use regime_engine::engine::{RefreshOutcome, RegimeEngine};
use regime_engine::market_data::{JsonFileReturnsProvider, MarketIndexProvider};
use regime_engine::regime_store::RegimeStore;

#[tokio::main]
async fn main() -> Result<()> {
    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    // Load config
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists or REGIME_CONFIG_PATH points to a config file");
            std::process::exit(1);
        }
    };

    // Init tracing (JSON lines to a file; stdout is reserved for --once output)
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create {}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        db_path = %config.storage.db_path,
        returns_path = %config.market_data.returns_path,
        window_days = config.regime.window_days,
        smoothing_alpha = config.regime.smoothing_alpha,
        once,
        "Starting regime-engine"
    );

    let db_path = Path::new(&config.storage.db_path);
    let store = Arc::new(
        RegimeStore::open(db_path, config.regime.smoother()?)
            .context("failed to open regime history store")?,
    );
    let params_store = Arc::new(
        AdaptiveParamsStore::open(db_path).context("failed to open adaptive parameter store")?,
    );
    let mapper = AdaptiveParameterMapper::new(config.anchors.clone())?;
    let provider = JsonFileReturnsProvider::new(&config.market_data.returns_path);
    let engine = RegimeEngine::new(provider, store, mapper, config.regime.settings())
        .with_params_store(params_store);

    if once {
        run_cycle(&engine)?;
        let parameters = engine.current_parameters()?;
        println!("{}", serde_json::to_string_pretty(&parameters)?);
        return Ok(());
    }

    let interval_ms = config.regime.refresh_interval_ms()?;
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = run_cycle(&engine) {
                    tracing::error!(error = %format!("{:#}", e), "Regime refresh cycle failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested, stopping regime-engine");
                break;
            }
        }
    }

    Ok(())
}

fn run_cycle<P: MarketIndexProvider>(engine: &RegimeEngine<P>) -> Result<()> {
    match engine.refresh().context("regime refresh failed")? {
        RefreshOutcome::Recorded(entry) => tracing::info!(
            id = entry.id,
            raw = entry.raw_score.value(),
            smoothed = entry.smoothed_score.value(),
            regime = entry.label.as_str(),
            "Regime refresh recorded"
        ),
        RefreshOutcome::Skipped { current, reason } => tracing::warn!(
            current = current.value(),
            reason = %reason,
            "Regime refresh skipped"
        ),
    }

    if let Some(parameters) = engine
        .adapt_if_needed()
        .context("adaptive parameter update failed")?
    {
        tracing::info!(
            regime_score = parameters.regime_score,
            weights = %serde_json::to_string(&parameters.weights)?,
            "Adaptive parameters updated"
        );
    }
    Ok(())
}
