// =============================================================================
// Stochastic Slow Oscillator
// =============================================================================
//
//   %K_Fast = 100 * (close - LL_k) / (HH_k - LL_k)
//   %K      = SMA_slowing(%K_Fast)
//   %D      = SMA_d(%K)
//
// with HH_k / LL_k the highest high / lowest low over `k_period` rows.  A range
// with HH == LL divides by zero; the NaN / inf flows into %K and %D.
//
// %D is first defined at row k + slowing + d - 3, so the series must hold at
// least k + slowing + d - 2 rows.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_period, require_rows, Result};
use crate::indicators::rsi::validate_thresholds;
use crate::market_data::PriceField;
use crate::series;
use crate::signals::{self, SignalPair};
use crate::table::IndicatorTable;

pub const K_FAST: &str = "%K_Fast";
pub const K: &str = "%K";
pub const D: &str = "%D";
pub const STOCH_BUY_1: &str = "Stoch_Buy_Signal_1";
pub const STOCH_BUY_2: &str = "Stoch_Buy_Signal_2";
pub const STOCH_SELL_1: &str = "Stoch_Sell_Signal_1";
pub const STOCH_SELL_2: &str = "Stoch_Sell_Signal_2";
pub const STOCH_BULLISH_DIVERGENCE: &str = "Stoch_Bullish_Divergence";
pub const STOCH_BEARISH_DIVERGENCE: &str = "Stoch_Bearish_Divergence";

fn default_k_period() -> usize {
    14
}

fn default_d_period() -> usize {
    3
}

fn default_slowing() -> usize {
    3
}

fn default_overbought() -> f64 {
    80.0
}

fn default_oversold() -> f64 {
    20.0
}

fn default_divergence_window() -> usize {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticSlow {
    #[serde(default = "default_k_period")]
    pub k_period: usize,

    #[serde(default = "default_d_period")]
    pub d_period: usize,

    #[serde(default = "default_slowing")]
    pub slowing: usize,

    #[serde(default = "default_overbought")]
    pub overbought: f64,

    #[serde(default = "default_oversold")]
    pub oversold: f64,

    #[serde(default = "default_divergence_window")]
    pub divergence_window: usize,
}

impl Default for StochasticSlow {
    fn default() -> Self {
        Self {
            k_period: default_k_period(),
            d_period: default_d_period(),
            slowing: default_slowing(),
            overbought: default_overbought(),
            oversold: default_oversold(),
            divergence_window: default_divergence_window(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticSeries {
    pub k_fast: Vec<f64>,
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Both buy and both sell conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StochasticSignals {
    /// %K crossing %D.
    pub cross: SignalPair,
    /// %K and %D both turning from beyond a threshold.
    pub reversal: SignalPair,
}

impl StochasticSeries {
    pub fn signals(&self, overbought: f64, oversold: f64) -> StochasticSignals {
        let n = self.k.len();
        let mut reversal = SignalPair {
            buy: vec![false; n],
            sell: vec![false; n],
        };
        for t in 1..n {
            let (pk, pd, k, d) = (self.k[t - 1], self.d[t - 1], self.k[t], self.d[t]);
            reversal.buy[t] = pk < oversold && k > pk && pd < oversold && d > pd;
            reversal.sell[t] = pk > overbought && k < pk && pd > overbought && d < pd;
        }
        StochasticSignals {
            cross: signals::line_cross(&self.k, &self.d),
            reversal,
        }
    }

    pub fn divergence(&self, price: &[f64], window: usize) -> SignalPair {
        signals::divergence(price, &self.k, window)
    }
}

impl StochasticSlow {
    pub fn new(k_period: usize, d_period: usize, slowing: usize) -> Self {
        Self {
            k_period,
            d_period,
            slowing,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_periods()?;
        require_period("divergence_window", self.divergence_window)?;
        validate_thresholds(self.overbought, self.oversold)
    }

    fn validate_periods(&self) -> Result<()> {
        require_period("k_period", self.k_period)?;
        require_period("d_period", self.d_period)?;
        require_period("slowing", self.slowing)
    }

    pub fn min_rows(&self) -> usize {
        self.k_period + self.slowing + self.d_period - 2
    }

    /// Slice-level oscillator over parallel high / low / close columns.
    pub fn compute(&self, high: &[f64], low: &[f64], close: &[f64]) -> Result<StochasticSeries> {
        self.validate_periods()?;
        require_rows("Stochastic", self.min_rows(), close.len())?;

        let highest = series::rolling_max(high, self.k_period);
        let lowest = series::rolling_min(low, self.k_period);
        let k_fast: Vec<f64> = (0..close.len())
            .map(|i| (close[i] - lowest[i]) / (highest[i] - lowest[i]) * 100.0)
            .collect();
        let k = series::rolling_mean(&k_fast, self.slowing);
        let d = series::rolling_mean(&k, self.d_period);

        Ok(StochasticSeries { k_fast, k, d })
    }

    /// Add `%K_Fast`, `%K` and `%D` from the table's High / Low / Close.
    pub fn calculate(&self, table: &IndicatorTable) -> Result<IndicatorTable> {
        let series = table.series();
        let out = self.compute(
            &series.values(PriceField::High),
            &series.values(PriceField::Low),
            &series.values(PriceField::Close),
        )?;
        debug!(
            k_period = self.k_period,
            d_period = self.d_period,
            slowing = self.slowing,
            "stochastic computed"
        );
        Ok(table
            .clone()
            .with_column(K_FAST, out.k_fast)
            .with_column(K, out.k)
            .with_column(D, out.d))
    }

    pub fn signals(&self, table: &IndicatorTable) -> Result<IndicatorTable> {
        self.signals_with(table, self.overbought, self.oversold)
    }

    /// Add the four `Stoch_*_Signal_*` columns.
    pub fn signals_with(&self, table: &IndicatorTable, overbought: f64, oversold: f64) -> Result<IndicatorTable> {
        validate_thresholds(overbought, oversold)?;
        table.require(&[K, D])?;
        let lines = StochasticSeries {
            k_fast: Vec::new(),
            k: table.column(K)?,
            d: table.column(D)?,
        };
        let out = lines.signals(overbought, oversold);
        debug!(
            cross_buys = out.cross.buy_rows().len(),
            cross_sells = out.cross.sell_rows().len(),
            reversal_buys = out.reversal.buy_rows().len(),
            reversal_sells = out.reversal.sell_rows().len(),
            "stochastic signals computed"
        );
        Ok(table
            .clone()
            .with_signal(STOCH_BUY_1, out.cross.buy)
            .with_signal(STOCH_SELL_1, out.cross.sell)
            .with_signal(STOCH_BUY_2, out.reversal.buy)
            .with_signal(STOCH_SELL_2, out.reversal.sell))
    }

    pub fn divergence(&self, table: &IndicatorTable, price_column: &str) -> Result<IndicatorTable> {
        self.divergence_with(table, price_column, self.divergence_window)
    }

    /// Add `Stoch_Bullish_Divergence` / `Stoch_Bearish_Divergence`.
    pub fn divergence_with(&self, table: &IndicatorTable, price_column: &str, window: usize) -> Result<IndicatorTable> {
        require_period("divergence window", window)?;
        table.require(&[K, price_column])?;
        let pair = signals::divergence(&table.column(price_column)?, &table.column(K)?, window);
        Ok(table
            .clone()
            .with_signal_pair(STOCH_BULLISH_DIVERGENCE, STOCH_BEARISH_DIVERGENCE, pair))
    }

    /// Oscillator, signals and divergence against `price_column`.
    pub fn apply(&self, table: &IndicatorTable, price_column: &str) -> Result<IndicatorTable> {
        let out = self.calculate(table)?;
        let out = self.signals(&out)?;
        self.divergence(&out, price_column)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;
    use crate::testutil::{ohlc_table, wave};

    #[test]
    fn minimum_rows() {
        let stoch = StochasticSlow::default();
        assert_eq!(stoch.min_rows(), 18);
        let t = ohlc_table(&wave(17));
        assert!(matches!(
            stoch.calculate(&t),
            Err(IndicatorError::InsufficientData { required: 18, actual: 17, .. })
        ));
        let t = stoch.calculate(&ohlc_table(&wave(18))).unwrap();
        let d = t.indicator(D).unwrap();
        assert!(d[16].is_nan());
        assert!(!d[17].is_nan());
    }

    #[test]
    fn definition_boundaries() {
        let t = StochasticSlow::default().calculate(&ohlc_table(&wave(40))).unwrap();
        let k_fast = t.indicator(K_FAST).unwrap();
        let k = t.indicator(K).unwrap();
        assert!(k_fast[12].is_nan() && !k_fast[13].is_nan());
        assert!(k[14].is_nan() && !k[15].is_nan());
    }

    #[test]
    fn k_fast_by_hand() {
        let high = [10.0, 12.0, 11.0];
        let low = [8.0, 9.0, 7.0];
        let close = [9.0, 11.0, 10.0];
        let out = StochasticSlow::new(3, 1, 1).compute(&high, &low, &close).unwrap();
        // HH = 12, LL = 7 => (10 - 7) / 5 * 100
        assert!((out.k_fast[2] - 60.0).abs() < 1e-12);
        assert_eq!(out.k[2], out.k_fast[2]);
        assert_eq!(out.d[2], out.k[2]);
    }

    #[test]
    fn values_within_bounds() {
        let t = StochasticSlow::default().calculate(&ohlc_table(&wave(150))).unwrap();
        for name in [K_FAST, K, D] {
            for &v in t.indicator(name).unwrap().iter().filter(|v| !v.is_nan()) {
                assert!((0.0..=100.0).contains(&v), "{name} = {v}");
            }
        }
    }

    #[test]
    fn flat_range_tolerated() {
        let high = [5.0; 20];
        let out = StochasticSlow::default().compute(&high, &high, &high).unwrap();
        assert!(out.k_fast[19].is_nan());
        assert!(out.d[19].is_nan());
    }

    #[test]
    fn calculate_ignores_signal_settings() {
        let stoch = StochasticSlow {
            overbought: 10.0,
            oversold: 90.0,
            divergence_window: 0,
            ..StochasticSlow::default()
        };
        let t = stoch.calculate(&ohlc_table(&wave(30))).unwrap();
        assert!(t.indicator(D).is_some());
        assert!(matches!(stoch.signals(&t), Err(IndicatorError::InvalidParameter(_))));
        assert!(matches!(
            StochasticSlow::new(14, 0, 3).calculate(&ohlc_table(&wave(30))),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn reversal_from_oversold() {
        let lines = StochasticSeries {
            k_fast: Vec::new(),
            k: vec![10.0, 15.0, 30.0],
            d: vec![12.0, 14.0, 18.0],
        };
        let out = lines.signals(80.0, 20.0);
        // row 1: both below 20 and rising
        assert_eq!(out.reversal.buy, vec![false, true, true]);
        // row 1: %K crosses above %D
        assert_eq!(out.cross.buy, vec![false, true, false]);
        assert!(out.reversal.sell.iter().all(|&s| !s));
    }

    #[test]
    fn reversal_from_overbought() {
        let lines = StochasticSeries {
            k_fast: Vec::new(),
            k: vec![95.0, 85.0],
            d: vec![90.0, 88.0],
        };
        let out = lines.signals(80.0, 20.0);
        assert_eq!(out.reversal.sell, vec![false, true]);
        assert_eq!(out.cross.sell, vec![false, true]);
    }

    #[test]
    fn signals_require_oscillator() {
        let t = ohlc_table(&wave(30));
        let stoch = StochasticSlow::default();
        assert!(matches!(stoch.signals(&t), Err(IndicatorError::MissingColumn(c)) if c == K));
        assert!(stoch.divergence(&t, "Close").is_err());
    }

    #[test]
    fn full_apply_produces_every_column() {
        let t = StochasticSlow::default().apply(&ohlc_table(&wave(120)), "Close").unwrap();
        for name in [
            STOCH_BUY_1,
            STOCH_BUY_2,
            STOCH_SELL_1,
            STOCH_SELL_2,
            STOCH_BULLISH_DIVERGENCE,
            STOCH_BEARISH_DIVERGENCE,
        ] {
            assert_eq!(t.signal(name).unwrap().len(), 120, "{name}");
        }
    }
}
