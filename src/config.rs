// =============================================================================
// Engine Configuration — per-indicator parameters with atomic save
// =============================================================================
//
// Every tunable parameter of the five engines lives here.  All fields carry
// `#[serde(default)]` so that a partial (or empty) JSON document loads with the
// standard defaults: MA 5/10/30/60, EMA 12/26, MACD 12/26/9, Bollinger 20/2.0,
// RSI 14 (70/30), Stochastic 14/3/3 (80/20).
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::{BollingerBands, Macd, MovingAverages, Rsi, StochasticSlow};
use crate::pipeline::{parse_kinds, IndicatorKind};

fn default_indicators() -> Vec<String> {
    IndicatorKind::ALL.iter().map(|k| k.as_str().to_string()).collect()
}

fn default_price_column() -> String {
    "Close".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engines the pipeline runs, by name (see `IndicatorKind`).
    #[serde(default = "default_indicators")]
    pub indicators: Vec<String>,

    /// Column every close-based engine reads.
    #[serde(default = "default_price_column")]
    pub price_column: String,

    #[serde(default)]
    pub moving_average: MovingAverages,

    #[serde(default)]
    pub macd: Macd,

    #[serde(default)]
    pub bollinger: BollingerBands,

    #[serde(default)]
    pub rsi: Rsi,

    #[serde(default)]
    pub stochastic: StochasticSlow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indicators: default_indicators(),
            price_column: default_price_column(),
            moving_average: MovingAverages::default(),
            macd: Macd::default(),
            bollinger: BollingerBands::default(),
            rsi: Rsi::default(),
            stochastic: StochasticSlow::default(),
        }
    }
}

impl EngineConfig {
    /// Check every parameter block and the indicator selection.
    pub fn validate(&self) -> crate::error::Result<()> {
        parse_kinds(&self.indicators)?;
        if self.price_column.is_empty() {
            return Err(crate::error::IndicatorError::invalid("price_column must be named"));
        }
        self.moving_average.validate()?;
        self.macd.validate()?;
        self.bollinger.validate()?;
        self.rsi.validate()?;
        self.stochastic.validate()
    }

    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            indicators = ?config.indicators,
            price_column = %config.price_column,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.indicators.len(), 5);
        assert_eq!(cfg.price_column, "Close");
        assert_eq!(cfg.moving_average.sma_periods, vec![5, 10, 30, 60]);
        assert_eq!(cfg.moving_average.ema_periods, vec![12, 26]);
        assert_eq!((cfg.macd.fast_period, cfg.macd.slow_period, cfg.macd.signal_period), (12, 26, 9));
        assert_eq!(cfg.bollinger.window, 20);
        assert!((cfg.bollinger.num_std - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.rsi.period, 14);
        assert_eq!(cfg.stochastic.min_rows(), 18);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "indicators": ["rsi"], "rsi": { "period": 7 }, "bollinger": { "num_std": 2.5 } }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.indicators, vec!["rsi"]);
        assert_eq!(cfg.rsi.period, 7);
        assert!((cfg.rsi.overbought - 70.0).abs() < f64::EPSILON);
        assert_eq!(cfg.bollinger.window, 20);
        assert!((cfg.bollinger.num_std - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = EngineConfig::default();
        cfg.macd.signal_period = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.indicators.push("obv".into());
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.stochastic.oversold = 90.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("indicator-engine-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.json");

        let mut cfg = EngineConfig::default();
        cfg.rsi.period = 21;
        cfg.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_errors_with_path() {
        let err = EngineConfig::load("/nonexistent/engine.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/engine.json"));
    }
}
