// =============================================================================
// MACD — Moving Average Convergence Divergence
// =============================================================================
//
//   MACD      = EMA_fast(x) - EMA_slow(x)
//   Signal    = EMA_signal(MACD)
//   Histogram = MACD - Signal
//
// All EMAs are seeded with the first value, so every line is defined from row
// 0.  The length requirement max(fast, slow) + signal is still enforced so the
// early, seed-dominated rows are never the only data a caller sees.
//
// Signals:
//   crossover:  sign flip of (MACD - Signal)
//   zero cross: sign flip of MACD
//   divergence: price and MACD moving in opposite directions over a lag
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_period, require_rows, Result};
use crate::series;
use crate::signals::{self, SignalPair};
use crate::table::IndicatorTable;

pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_Signal";
pub const MACD_HISTOGRAM: &str = "MACD_Histogram";
pub const MACD_BUY: &str = "MACD_Buy_Signal";
pub const MACD_SELL: &str = "MACD_Sell_Signal";
pub const MACD_ZERO_UP: &str = "MACD_Zero_Cross_Up";
pub const MACD_ZERO_DOWN: &str = "MACD_Zero_Cross_Down";
pub const MACD_BULLISH_DIVERGENCE: &str = "MACD_Bullish_Divergence";
pub const MACD_BEARISH_DIVERGENCE: &str = "MACD_Bearish_Divergence";

fn default_fast() -> usize {
    12
}

fn default_slow() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

fn default_divergence_window() -> usize {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macd {
    #[serde(default = "default_fast")]
    pub fast_period: usize,

    #[serde(default = "default_slow")]
    pub slow_period: usize,

    #[serde(default = "default_signal")]
    pub signal_period: usize,

    /// Lag used by [`Macd::divergence`].
    #[serde(default = "default_divergence_window")]
    pub divergence_window: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: default_fast(),
            slow_period: default_slow(),
            signal_period: default_signal(),
            divergence_window: default_divergence_window(),
        }
    }
}

/// The three MACD lines for one input column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdLines {
    /// Buy when MACD rises through its signal line, sell on the way down.
    pub fn crossover_signals(&self) -> SignalPair {
        signals::line_cross(&self.macd, &self.signal)
    }

    /// Buy when MACD turns positive, sell when it turns negative.
    pub fn zero_cross_signals(&self) -> SignalPair {
        signals::zero_cross(&self.macd)
    }

    /// Bullish (buy) / bearish (sell) divergence against `price`.
    pub fn divergence(&self, price: &[f64], window: usize) -> SignalPair {
        signals::divergence(price, &self.macd, window)
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_periods()?;
        require_period("divergence_window", self.divergence_window)
    }

    fn validate_periods(&self) -> Result<()> {
        require_period("fast_period", self.fast_period)?;
        require_period("slow_period", self.slow_period)?;
        require_period("signal_period", self.signal_period)
    }

    /// Rows needed before [`Macd::compute`] will run.
    pub fn min_rows(&self) -> usize {
        self.fast_period.max(self.slow_period) + self.signal_period
    }

    /// Slice-level MACD.
    pub fn compute(&self, values: &[f64]) -> Result<MacdLines> {
        self.validate_periods()?;
        require_rows("MACD", self.min_rows(), values.len())?;

        let fast = series::ema(values, self.fast_period);
        let slow = series::ema(values, self.slow_period);
        let macd = series::sub(&fast, &slow);
        let signal = series::ema(&macd, self.signal_period);
        let histogram = series::sub(&macd, &signal);

        Ok(MacdLines {
            macd,
            signal,
            histogram,
        })
    }

    /// Add `MACD`, `MACD_Signal` and `MACD_Histogram` computed on `column`.
    pub fn calculate(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let lines = self.compute(&table.column(column)?)?;
        debug!(
            column,
            fast = self.fast_period,
            slow = self.slow_period,
            signal = self.signal_period,
            "MACD computed"
        );
        Ok(table
            .clone()
            .with_column(MACD, lines.macd)
            .with_column(MACD_SIGNAL, lines.signal)
            .with_column(MACD_HISTOGRAM, lines.histogram))
    }

    fn lines_from(&self, table: &IndicatorTable) -> Result<(Vec<f64>, Vec<f64>)> {
        table.require(&[MACD, MACD_SIGNAL])?;
        Ok((table.column(MACD)?, table.column(MACD_SIGNAL)?))
    }

    /// Add `MACD_Buy_Signal` / `MACD_Sell_Signal`.
    pub fn crossover_signals(&self, table: &IndicatorTable) -> Result<IndicatorTable> {
        let (macd, signal) = self.lines_from(table)?;
        let pair = signals::line_cross(&macd, &signal);
        debug!(buys = pair.buy_rows().len(), sells = pair.sell_rows().len(), "MACD crossovers computed");
        Ok(table.clone().with_signal_pair(MACD_BUY, MACD_SELL, pair))
    }

    /// Add `MACD_Zero_Cross_Up` / `MACD_Zero_Cross_Down`.
    pub fn zero_cross_signals(&self, table: &IndicatorTable) -> Result<IndicatorTable> {
        table.require(&[MACD])?;
        let pair = signals::zero_cross(&table.column(MACD)?);
        Ok(table.clone().with_signal_pair(MACD_ZERO_UP, MACD_ZERO_DOWN, pair))
    }

    /// Divergence over the configured window.
    pub fn divergence(&self, table: &IndicatorTable, price_column: &str) -> Result<IndicatorTable> {
        self.divergence_with(table, price_column, self.divergence_window)
    }

    /// Add `MACD_Bullish_Divergence` / `MACD_Bearish_Divergence`.
    pub fn divergence_with(&self, table: &IndicatorTable, price_column: &str, window: usize) -> Result<IndicatorTable> {
        require_period("divergence window", window)?;
        table.require(&[MACD, price_column])?;
        let pair = signals::divergence(&table.column(price_column)?, &table.column(MACD)?, window);
        Ok(table
            .clone()
            .with_signal_pair(MACD_BULLISH_DIVERGENCE, MACD_BEARISH_DIVERGENCE, pair))
    }

    /// Lines, both crossover families and divergence on `column`.
    pub fn apply(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let out = self.calculate(table, column)?;
        let out = self.crossover_signals(&out)?;
        let out = self.zero_cross_signals(&out)?;
        self.divergence(&out, column)
    }
}
