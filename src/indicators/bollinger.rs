// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), with σ the rolling sample standard deviation.
//
//   Width = (upper - lower) / middle
//   %B    = (price - lower) / (upper - lower)
//
// A flat window has σ = 0, so %B divides by zero and comes out NaN or ±inf.
// That is data, not an error.
//
// Signals:
//   buy:      price climbs back above the lower band
//   sell:     price drops back below the upper band
//   squeeze:  width below its own rolling mean
//   breakout: price beyond a band by more than a relative threshold
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_finite, require_period, require_rows, IndicatorError, Result};
use crate::series;
use crate::signals::SignalPair;
use crate::table::IndicatorTable;

pub const BB_MIDDLE: &str = "BB_Middle";
pub const BB_UPPER: &str = "BB_Upper";
pub const BB_LOWER: &str = "BB_Lower";
pub const BB_WIDTH: &str = "BB_Width";
pub const BB_PERCENT_B: &str = "BB_PercentB";
pub const BB_BUY: &str = "BB_Buy_Signal";
pub const BB_SELL: &str = "BB_Sell_Signal";
pub const BB_SQUEEZE: &str = "BB_Squeeze";
pub const BB_UPPER_BREAKOUT: &str = "BB_Upper_Breakout";
pub const BB_LOWER_BREAKOUT: &str = "BB_Lower_Breakout";

fn default_window() -> usize {
    20
}

fn default_num_std() -> f64 {
    2.0
}

fn default_squeeze_window() -> usize {
    20
}

fn default_breakout_threshold() -> f64 {
    0.05
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    #[serde(default = "default_window")]
    pub window: usize,

    /// Band distance in standard deviations.
    #[serde(default = "default_num_std")]
    pub num_std: f64,

    /// Look-back of the width average the squeeze compares against.
    #[serde(default = "default_squeeze_window")]
    pub squeeze_window: usize,

    /// Relative overshoot beyond a band that counts as a breakout.
    #[serde(default = "default_breakout_threshold")]
    pub breakout_threshold: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            window: default_window(),
            num_std: default_num_std(),
            squeeze_window: default_squeeze_window(),
            breakout_threshold: default_breakout_threshold(),
        }
    }
}

/// Band columns for one price column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerSeries {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
    pub percent_b: Vec<f64>,
}

/// Entry / exit signals plus the squeeze flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandSignals {
    pub entries: SignalPair,
    pub squeeze: Vec<bool>,
}

impl BollingerSeries {
    /// Buy when price was below the previous lower band and is now above the
    /// current one; sell mirrors on the upper band.  `squeeze_window` sets the
    /// width average the squeeze flag compares against.
    pub fn signals(&self, price: &[f64], squeeze_window: usize) -> BandSignals {
        let n = price.len();
        let mut buy = vec![false; n];
        let mut sell = vec![false; n];
        for t in 1..n {
            buy[t] = price[t - 1] < self.lower[t - 1] && price[t] > self.lower[t];
            sell[t] = price[t - 1] > self.upper[t - 1] && price[t] < self.upper[t];
        }

        let width_mean = series::rolling_mean(&self.width, squeeze_window);
        let squeeze = self
            .width
            .iter()
            .zip(&width_mean)
            .map(|(w, m)| w < m)
            .collect();

        BandSignals {
            entries: SignalPair { buy, sell },
            squeeze,
        }
    }

    /// Upper (sell) breakout where `(price - upper) / upper > threshold`;
    /// lower (buy) breakout where `(lower - price) / lower > threshold`.
    pub fn breakouts(&self, price: &[f64], threshold: f64) -> SignalPair {
        let upper = price
            .iter()
            .zip(&self.upper)
            .map(|(p, u)| (p - u) / u > threshold)
            .collect();
        let lower = price
            .iter()
            .zip(&self.lower)
            .map(|(p, l)| (l - p) / l > threshold)
            .collect();
        SignalPair {
            buy: lower,
            sell: upper,
        }
    }
}

impl BollingerBands {
    pub fn new(window: usize, num_std: f64) -> Self {
        Self {
            window,
            num_std,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_bands()?;
        require_period("squeeze_window", self.squeeze_window)?;
        require_finite("breakout_threshold", self.breakout_threshold)
    }

    fn validate_bands(&self) -> Result<()> {
        require_period("window", self.window)?;
        require_finite("num_std", self.num_std)?;
        if self.num_std < 0.0 {
            tracing::warn!(num_std = self.num_std, "band width must be non-negative");
            return Err(IndicatorError::invalid(format!(
                "num_std must be non-negative, got {}",
                self.num_std
            )));
        }
        Ok(())
    }

    /// Slice-level bands.
    pub fn compute(&self, values: &[f64]) -> Result<BollingerSeries> {
        self.validate_bands()?;
        require_rows("Bollinger Bands", self.window, values.len())?;

        let middle = series::rolling_mean(values, self.window);
        let std = series::rolling_std(values, self.window);

        let upper: Vec<f64> = middle.iter().zip(&std).map(|(m, s)| m + s * self.num_std).collect();
        let lower: Vec<f64> = middle.iter().zip(&std).map(|(m, s)| m - s * self.num_std).collect();
        let width = (0..values.len())
            .map(|i| (upper[i] - lower[i]) / middle[i])
            .collect();
        let percent_b = (0..values.len())
            .map(|i| (values[i] - lower[i]) / (upper[i] - lower[i]))
            .collect();

        Ok(BollingerSeries {
            middle,
            upper,
            lower,
            width,
            percent_b,
        })
    }

    /// Add the five band columns computed on `column`.
    pub fn calculate(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let bands = self.compute(&table.column(column)?)?;
        debug!(column, window = self.window, num_std = self.num_std, "Bollinger Bands computed");
        Ok(table
            .clone()
            .with_column(BB_MIDDLE, bands.middle)
            .with_column(BB_UPPER, bands.upper)
            .with_column(BB_LOWER, bands.lower)
            .with_column(BB_WIDTH, bands.width)
            .with_column(BB_PERCENT_B, bands.percent_b))
    }

    // %B is not read by any signal rule, so a table without it still works.
    fn bands_from(table: &IndicatorTable) -> Result<BollingerSeries> {
        Ok(BollingerSeries {
            middle: table.column(BB_MIDDLE)?,
            upper: table.column(BB_UPPER)?,
            lower: table.column(BB_LOWER)?,
            width: table.column(BB_WIDTH)?,
            percent_b: Vec::new(),
        })
    }

    /// Add `BB_Buy_Signal`, `BB_Sell_Signal` and `BB_Squeeze`.
    pub fn signals(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        require_period("squeeze_window", self.squeeze_window)?;
        table.require(&[BB_UPPER, BB_MIDDLE, BB_LOWER, BB_WIDTH, column])?;
        let bands = Self::bands_from(table)?;
        let out = bands.signals(&table.column(column)?, self.squeeze_window);
        debug!(
            buys = out.entries.buy_rows().len(),
            sells = out.entries.sell_rows().len(),
            "Bollinger signals computed"
        );
        Ok(table
            .clone()
            .with_signal_pair(BB_BUY, BB_SELL, out.entries)
            .with_signal(BB_SQUEEZE, out.squeeze))
    }

    /// Breakouts at the configured threshold.
    pub fn breakout_signals(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        self.breakout_signals_with(table, column, self.breakout_threshold)
    }

    /// Add `BB_Upper_Breakout` / `BB_Lower_Breakout`.
    pub fn breakout_signals_with(&self, table: &IndicatorTable, column: &str, threshold: f64) -> Result<IndicatorTable> {
        require_finite("breakout threshold", threshold)?;
        table.require(&[BB_UPPER, BB_LOWER, column])?;
        let bands = BollingerSeries {
            middle: Vec::new(),
            upper: table.column(BB_UPPER)?,
            lower: table.column(BB_LOWER)?,
            width: Vec::new(),
            percent_b: Vec::new(),
        };
        let pair = bands.breakouts(&table.column(column)?, threshold);
        Ok(table.clone().with_signal(BB_UPPER_BREAKOUT, pair.sell).with_signal(BB_LOWER_BREAKOUT, pair.buy))
    }

    /// Bands, entry/squeeze signals and breakouts on `column`.
    pub fn apply(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let out = self.calculate(table, column)?;
        let out = self.signals(&out, column)?;
        self.breakout_signals(&out, column)
    }
}
