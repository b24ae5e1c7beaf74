// =============================================================================
// Indicator Report — Main Entry Point
// =============================================================================
//
// Reads a JSON array of OHLCV bars, runs the configured indicator pipeline and
// logs the latest indicator values and the signals firing on the last bar.
//
//   indicator-report prices.json
//
// INDICATOR_CONFIG points at an engine config file (default
// `indicator_config.json`); a missing or unreadable file falls back to the
// standard parameters.
// =============================================================================

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use indicator_engine::{EngineConfig, PriceBar, PriceSeries, SignalPipeline};

fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("INDICATOR_CONFIG").unwrap_or_else(|_| "indicator_config.json".to_string());
    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // ── 2. Price series ──────────────────────────────────────────────────
    let Some(prices_path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: indicator-report <prices.json>");
    };
    let content = std::fs::read_to_string(&prices_path)
        .with_context(|| format!("failed to read prices from {}", prices_path.display()))?;
    let bars: Vec<PriceBar> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse prices from {}", prices_path.display()))?;
    let series = PriceSeries::new(bars).context("price series rejected")?;

    info!(
        path = %prices_path.display(),
        rows = series.len(),
        "price series loaded"
    );

    // ── 3. Indicators & signals ──────────────────────────────────────────
    let pipeline = SignalPipeline::new(config).context("invalid engine config")?;
    let table = pipeline.run(&series).context("indicator pipeline failed")?;

    let last = series.bars()[series.len() - 1];
    info!(timestamp = %last.timestamp, close = last.close, "latest bar");
    for (name, value) in table.latest_values() {
        info!(indicator = name, value, "latest value");
    }

    let firing = table.latest_signals();
    if firing.is_empty() {
        info!("no signals on the latest bar");
    } else {
        for name in firing {
            info!(signal = name, "signal firing");
        }
    }

    Ok(())
}
