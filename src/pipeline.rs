// =============================================================================
// Signal Pipeline
// =============================================================================
//
// Runs a selection of engines over one price series, each applied in turn to
// the same table, and returns the combined table.  Engines never depend on one
// another's columns, so the order only affects the log output.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{IndicatorError, Result};
use crate::market_data::PriceSeries;
use crate::table::IndicatorTable;

/// The five engines by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    MovingAverage,
    Macd,
    Bollinger,
    Rsi,
    Stochastic,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 5] = [
        IndicatorKind::MovingAverage,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
        IndicatorKind::Rsi,
        IndicatorKind::Stochastic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MovingAverage => "moving_average",
            Self::Macd => "macd",
            Self::Bollinger => "bollinger",
            Self::Rsi => "rsi",
            Self::Stochastic => "stochastic",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ma" | "sma" | "moving_average" | "moving_averages" => Ok(Self::MovingAverage),
            "macd" => Ok(Self::Macd),
            "bb" | "bollinger" | "bollinger_bands" => Ok(Self::Bollinger),
            "rsi" => Ok(Self::Rsi),
            "stoch" | "stochastic" | "stochastic_slow" => Ok(Self::Stochastic),
            other => Err(IndicatorError::invalid(format!("unknown indicator: {other}"))),
        }
    }
}

/// Parse a list of indicator names, failing on the first unknown one.
pub fn parse_kinds<S: AsRef<str>>(names: &[S]) -> Result<Vec<IndicatorKind>> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

// =============================================================================
// SignalPipeline
// =============================================================================

/// A validated configuration plus the parsed engine selection.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    config: EngineConfig,
    kinds: Vec<IndicatorKind>,
}

impl SignalPipeline {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let kinds = parse_kinds(&config.indicators)?;
        Ok(Self { config, kinds })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn kinds(&self) -> &[IndicatorKind] {
        &self.kinds
    }

    /// Apply one engine (values, signals and divergence) to `table`.
    pub fn apply(&self, kind: IndicatorKind, table: &IndicatorTable) -> Result<IndicatorTable> {
        let column = self.config.price_column.as_str();
        debug!(indicator = %kind, column, "applying indicator");
        match kind {
            IndicatorKind::MovingAverage => self.config.moving_average.apply(table, column),
            IndicatorKind::Macd => self.config.macd.apply(table, column),
            IndicatorKind::Bollinger => self.config.bollinger.apply(table, column),
            IndicatorKind::Rsi => self.config.rsi.apply(table, column),
            IndicatorKind::Stochastic => self.config.stochastic.apply(table, column),
        }
    }

    /// Every selected engine over `series`.  The first engine error aborts the
    /// run; no partial table is returned.
    pub fn run(&self, series: &PriceSeries) -> Result<IndicatorTable> {
        let mut table = IndicatorTable::new(series.clone());
        for &kind in &self.kinds {
            table = self.apply(kind, &table)?;
        }
        info!(
            rows = table.len(),
            indicators = ?self.kinds,
            firing = ?table.latest_signals(),
            "signal pipeline complete"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ohlc_table, wave};

    #[test]
    fn parse_names() {
        assert_eq!("MACD".parse::<IndicatorKind>().unwrap(), IndicatorKind::Macd);
        assert_eq!(" bb ".parse::<IndicatorKind>().unwrap(), IndicatorKind::Bollinger);
        assert_eq!("Stoch".parse::<IndicatorKind>().unwrap(), IndicatorKind::Stochastic);
        for kind in IndicatorKind::ALL {
            assert_eq!(kind.as_str().parse::<IndicatorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_is_invalid_parameter() {
        assert!(matches!(
            "ichimoku".parse::<IndicatorKind>(),
            Err(IndicatorError::InvalidParameter(_))
        ));
        assert!(parse_kinds(&["rsi", "adx"]).is_err());
    }

    #[test]
    fn pipeline_rejects_unknown_selection() {
        let config = EngineConfig {
            indicators: vec!["rsi".into(), "vwap".into()],
            ..EngineConfig::default()
        };
        assert!(matches!(SignalPipeline::new(config), Err(IndicatorError::InvalidParameter(_))));
    }

    #[test]
    fn full_run_keeps_row_count() {
        let series = ohlc_table(&wave(120)).series().clone();
        let pipeline = SignalPipeline::new(EngineConfig::default()).unwrap();
        let table = pipeline.run(&series).unwrap();
        assert_eq!(table.len(), 120);
        for name in ["MA60", "EMA26", "MACD", "BB_Upper", "RSI", "%D"] {
            assert_eq!(table.indicator(name).unwrap().len(), 120, "{name}");
        }
        assert!(table.signal_names().count() >= 20);
    }

    #[test]
    fn short_series_fails_whole_run() {
        let series = ohlc_table(&wave(40)).series().clone();
        let pipeline = SignalPipeline::new(EngineConfig::default()).unwrap();
        // MA60 needs 60 rows
        assert!(matches!(
            pipeline.run(&series),
            Err(IndicatorError::InsufficientData { required: 60, .. })
        ));
    }
}
