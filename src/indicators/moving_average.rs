// =============================================================================
// Moving Averages — SMA, EMA, Golden / Dead Cross
// =============================================================================
//
// SMA_p(t) = mean(x[t-p+1 ..= t])                  defined from row p - 1
// EMA_p(t) = a * x_t + (1 - a) * EMA_p(t-1),  a = 2 / (p + 1)
//            seeded with x_0, defined from row 0
//
// Golden cross: short average at or below the long one on the previous row and
// strictly above it now.  Dead cross is the mirror.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_period, require_rows, IndicatorError, Result};
use crate::series;
use crate::signals::{self, SignalPair};
use crate::table::IndicatorTable;

pub const GOLDEN_CROSS: &str = "golden_cross";
pub const DEAD_CROSS: &str = "dead_cross";

fn default_sma_periods() -> Vec<usize> {
    vec![5, 10, 30, 60]
}

fn default_ema_periods() -> Vec<usize> {
    vec![12, 26]
}

fn default_short_column() -> String {
    "MA5".to_string()
}

fn default_long_column() -> String {
    "MA30".to_string()
}

/// Moving-average settings: which periods to compute and which pair of
/// columns the crossover check compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    #[serde(default = "default_sma_periods")]
    pub sma_periods: Vec<usize>,

    #[serde(default = "default_ema_periods")]
    pub ema_periods: Vec<usize>,

    /// Column treated as the fast line for golden / dead cross.
    #[serde(default = "default_short_column")]
    pub short_column: String,

    /// Column treated as the slow line for golden / dead cross.
    #[serde(default = "default_long_column")]
    pub long_column: String,
}

impl Default for MovingAverages {
    fn default() -> Self {
        Self {
            sma_periods: default_sma_periods(),
            ema_periods: default_ema_periods(),
            short_column: default_short_column(),
            long_column: default_long_column(),
        }
    }
}

pub fn sma_column(period: usize) -> String {
    format!("MA{period}")
}

pub fn ema_column(period: usize) -> String {
    format!("EMA{period}")
}

/// Slice-level SMA.  Fails when `values` is shorter than `period`.
pub fn sma(values: &[f64], period: usize) -> Result<Vec<f64>> {
    require_period("period", period)?;
    require_rows("SMA", period, values.len())?;
    Ok(series::rolling_mean(values, period))
}

/// Golden (buy) / dead (sell) cross between two already-computed averages.
pub fn cross_signals(short: &[f64], long: &[f64]) -> SignalPair {
    signals::overtake(short, long)
}

impl MovingAverages {
    pub fn validate(&self) -> Result<()> {
        for &p in self.sma_periods.iter().chain(&self.ema_periods) {
            require_period("moving average period", p)?;
        }
        if self.short_column.is_empty() || self.long_column.is_empty() {
            return Err(IndicatorError::invalid("crossover columns must be named"));
        }
        Ok(())
    }

    /// Add `MA{p}` for every period.  The table must hold at least
    /// `max(periods)` rows; nothing is computed otherwise.
    pub fn simple(&self, table: &IndicatorTable, column: &str, periods: &[usize]) -> Result<IndicatorTable> {
        let Some(&longest) = periods.iter().max() else {
            return Err(IndicatorError::invalid("at least one SMA period is required"));
        };
        for &p in periods {
            require_period("SMA period", p)?;
        }
        require_rows("SMA", longest, table.len())?;

        let values = table.column(column)?;
        let mut out = table.clone();
        for &p in periods {
            debug!(column, period = p, "computing simple moving average");
            out = out.with_column(sma_column(p), series::rolling_mean(&values, p));
        }
        Ok(out)
    }

    /// Add `MA{p}` for each configured SMA period.
    pub fn calculate_multiple(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        self.simple(table, column, &self.sma_periods)
    }

    pub fn ma5(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        self.simple(table, column, &[5])
    }

    pub fn ma10(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        self.simple(table, column, &[10])
    }

    pub fn ma30(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        self.simple(table, column, &[30])
    }

    pub fn ma60(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        self.simple(table, column, &[60])
    }

    /// Add `EMA{p}` for every period.  No minimum length: the average is
    /// defined from the first row.
    pub fn exponential(&self, table: &IndicatorTable, column: &str, periods: &[usize]) -> Result<IndicatorTable> {
        for &p in periods {
            require_period("EMA period", p)?;
        }
        let values = table.column(column)?;
        let mut out = table.clone();
        for &p in periods {
            debug!(column, period = p, "computing exponential moving average");
            out = out.with_column(ema_column(p), series::ema(&values, p));
        }
        Ok(out)
    }

    /// Add `golden_cross` / `dead_cross` comparing `short` against `long`.
    pub fn crossover_signals(&self, table: &IndicatorTable, short: &str, long: &str) -> Result<IndicatorTable> {
        table.require(&[short, long])?;
        let pair = cross_signals(&table.column(short)?, &table.column(long)?);
        debug!(
            short,
            long,
            golden = pair.buy_rows().len(),
            dead = pair.sell_rows().len(),
            "moving average crossovers computed"
        );
        Ok(table.clone().with_signal_pair(GOLDEN_CROSS, DEAD_CROSS, pair))
    }

    /// Configured SMAs and EMAs on `column`, then the configured crossover.
    pub fn apply(&self, table: &IndicatorTable, column: &str) -> Result<IndicatorTable> {
        let out = self.calculate_multiple(table, column)?;
        let out = self.exponential(&out, column, &self.ema_periods)?;
        self.crossover_signals(&out, &self.short_column, &self.long_column)
    }
}
