// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive values.  Row 0 has
//          no delta and counts as zero gain and zero loss.
// Step 2 — Row `period - 1` holds the rolling mean of gains / losses 0..period.
//          The seed at row `period` is the SMA of deltas 1..=period.
// Step 3 — Apply Wilder's recursive smoothing for every later row:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Step 3 is a true scan: every value depends on the one before it, so a
// rolling-window mean gives materially different numbers after the seed row.
// `simple` provides that rolling variant for comparison.
//
// Zero denominators follow IEEE semantics: only gains gives RS = inf and
// RSI = 100; no movement at all gives 0 / 0 and RSI = NaN.
//
// Thresholds:  crossing down through 70 => sell,  crossing up through 30 => buy.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_finite, require_period, require_rows, IndicatorError, Result};
use crate::series;
use crate::signals::{self, SignalPair};
use crate::table::IndicatorTable;

pub const RSI: &str = "RSI";
pub const RSI_SIMPLE: &str = "RSI_Simple";
pub const RSI_BUY: &str = "RSI_Buy_Signal";
pub const RSI_SELL: &str = "RSI_Sell_Signal";
pub const RSI_BULLISH_DIVERGENCE: &str = "RSI_Bullish_Divergence";
pub const RSI_BEARISH_DIVERGENCE: &str = "RSI_Bearish_Divergence";

fn default_period() -> usize {
    14
}

fn default_overbought() -> f64 {
    70.0
}

fn default_oversold() -> f64 {
    30.0
}

fn default_divergence_window() -> usize {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rsi {
    #[serde(default = "default_period")]
    pub period: usize,

    #[serde(default = "default_overbought")]
    pub overbought: f64,

    #[serde(default = "default_oversold")]
    pub oversold: f64,

    #[serde(default = "default_divergence_window")]
    pub divergence_window: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: default_period(),
            overbought: default_overbought(),
            oversold: default_oversold(),
            divergence_window: default_divergence_window(),
        }
    }
}

/// RSI column plus the smoothed averages behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiSeries {
    pub avg_gain: Vec<f64>,
    pub avg_loss: Vec<f64>,
    pub rsi: Vec<f64>,
}

impl RsiSeries {
    /// Buy on an upward cross of `oversold`, sell on a downward cross of
    /// `overbought`.
    pub fn signals(&self, overbought: f64, oversold: f64) -> SignalPair {
        signals::threshold_cross(&self.rsi, oversold, overbought)
    }

    pub fn divergence(&self, price: &[f64], window: usize) -> SignalPair {
        signals::divergence(price, &self.rsi, window)
    }
}

/// Per-row gains and losses.  Row 0 has no predecessor and is zero on both
/// sides; any later undefined delta stays NaN.
fn gains_and_losses(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let deltas = series::diff(values, 1);
    deltas
        .iter()
        .enumerate()
        .map(|(t, &d)| {
            if t == 0 {
                (0.0, 0.0)
            } else if d.is_nan() {
                (f64::NAN, f64::NAN)
            } else if d > 0.0 {
                (d, 0.0)
            } else {
                (0.0, -d)
            }
        })
        .unzip()
}

/// RSI = 100 - 100 / (1 + avg_gain / avg_loss), IEEE semantics throughout.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_period("period", self.period)?;
        require_period("divergence_window", self.divergence_window)?;
        validate_thresholds(self.overbought, self.oversold)
    }

    /// Wilder-smoothed RSI.  Needs `period + 1` values.
    pub fn compute(&self, values: &[f64]) -> Result<RsiSeries> {
        require_period("period", self.period)?;
        let period = self.period;
        require_rows("RSI", period + 1, values.len())?;

        let (gains, losses) = gains_and_losses(values);
        let n = values.len();
        let period_f = period as f64;

        let mut avg_gain = vec![f64::NAN; n];
        let mut avg_loss = vec![f64::NAN; n];

        // Rolling value one row ahead of the seed (row 0 counted as no move).
        avg_gain[period - 1] = gains[..period].iter().sum::<f64>() / period_f;
        avg_loss[period - 1] = losses[..period].iter().sum::<f64>() / period_f;

        // --- Seed with the SMA of the first `period` deltas -----------------
        let mut g = gains[1..=period].iter().sum::<f64>() / period_f;
        let mut l = losses[1..=period].iter().sum::<f64>() / period_f;
        avg_gain[period] = g;
        avg_loss[period] = l;

        // --- Wilder's smoothing, carrying the previous average --------------
        for t in period + 1..n {
            g = (g * (period_f - 1.0) + gains[t]) / period_f;
            l = (l * (period_f - 1.0) + losses[t]) / period_f;
            avg_gain[t] = g;
            avg_loss[t] = l;
        }

        let rsi = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| rsi_from_averages(g, l))
            .collect();

        Ok(RsiSeries {
            avg_gain,
            avg_loss,
            rsi,
        })
    }

    /// Rolling-mean RSI with no recursive smoothing.  Never fails on length:
    /// rows before `period - 1` are simply NaN.
    pub fn compute_simple(&self, values: &[f64]) -> Result<RsiSeries> {
        require_period("period", self.period)?;
        let (gains, losses) = gains_and_losses(values);
        let avg_gain = series::rolling_mean(&gains, self.period);
        let avg_loss = series::rolling_mean(&losses, self.period);
        let rsi = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| rsi_from_averages(g, l))
            .collect();
        Ok(RsiSeries {
            avg_gain,
            avg_loss,
            rsi,
        })
    }

    /// Add `RSI` computed on `column`.
    pub fn calculate(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let out = self.compute(&table.column(column)?)?;
        debug!(
            column,
            period = self.period,
            latest = out.rsi.last().copied().unwrap_or(f64::NAN),
            "RSI computed"
        );
        Ok(table.clone().with_column(RSI, out.rsi))
    }

    /// Add `RSI_Simple` computed on `column`.
    pub fn calculate_simple(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let out = self.compute_simple(&table.column(column)?)?;
        debug!(column, period = self.period, "rolling RSI computed");
        Ok(table.clone().with_column(RSI_SIMPLE, out.rsi))
    }

    /// Signals at the configured thresholds.
    pub fn signals(&self, table: &IndicatorTable) -> Result<IndicatorTable> {
        self.signals_with(table, self.overbought, self.oversold)
    }

    /// Add `RSI_Buy_Signal` / `RSI_Sell_Signal`.
    pub fn signals_with(&self, table: &IndicatorTable, overbought: f64, oversold: f64) -> Result<IndicatorTable> {
        validate_thresholds(overbought, oversold)?;
        table.require(&[RSI])?;
        let pair = signals::threshold_cross(&table.column(RSI)?, oversold, overbought);
        debug!(
            overbought,
            oversold,
            buys = pair.buy_rows().len(),
            sells = pair.sell_rows().len(),
            "RSI signals computed"
        );
        Ok(table.clone().with_signal_pair(RSI_BUY, RSI_SELL, pair))
    }

    pub fn divergence(&self, table: &IndicatorTable, price_column: &str) -> Result<IndicatorTable> {
        self.divergence_with(table, price_column, self.divergence_window)
    }

    /// Add `RSI_Bullish_Divergence` / `RSI_Bearish_Divergence`.
    pub fn divergence_with(&self, table: &IndicatorTable, price_column: &str, window: usize) -> Result<IndicatorTable> {
        require_period("divergence window", window)?;
        table.require(&[RSI, price_column])?;
        let pair = signals::divergence(&table.column(price_column)?, &table.column(RSI)?, window);
        Ok(table
            .clone()
            .with_signal_pair(RSI_BULLISH_DIVERGENCE, RSI_BEARISH_DIVERGENCE, pair))
    }

    /// RSI, threshold signals and divergence on `column`.
    pub fn apply(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let out = self.calculate(table, column)?;
        let out = self.signals(&out)?;
        self.divergence(&out, column)
    }
}

/// Overbought / oversold must be finite and ordered.
pub(crate) fn validate_thresholds(overbought: f64, oversold: f64) -> Result<()> {
    require_finite("overbought", overbought)?;
    require_finite("oversold", oversold)?;
    if oversold >= overbought {
        return Err(IndicatorError::invalid(format!(
            "oversold ({oversold}) must be below overbought ({overbought})"
        )));
    }
    Ok(())
}
