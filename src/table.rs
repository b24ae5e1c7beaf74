// =============================================================================
// Indicator Table
// =============================================================================
//
// A price series plus named indicator columns (f64, NaN = undefined) and named
// signal columns (bool).  Engines take a table by reference and hand back an
// enriched copy; the price rows are shared and never mutated.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{IndicatorError, Result};
use crate::market_data::{PriceField, PriceSeries};
use crate::signals::SignalPair;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorTable {
    series: Arc<PriceSeries>,
    columns: BTreeMap<String, Vec<f64>>,
    signals: BTreeMap<String, Vec<bool>>,
}

impl From<PriceSeries> for IndicatorTable {
    fn from(series: PriceSeries) -> Self {
        Self::new(series)
    }
}

impl IndicatorTable {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series: Arc::new(series),
            columns: BTreeMap::new(),
            signals: BTreeMap::new(),
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Row count; identical for every column.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.series.timestamps()
    }

    // ---------------------------------------------------------------------
    // Numeric columns
    // ---------------------------------------------------------------------

    /// Look up a numeric column.  `Open`/`High`/`Low`/`Close`/`Volume` resolve
    /// to the price rows; anything else must have been added by an engine.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        if let Some(values) = self.columns.get(name) {
            return Ok(values.clone());
        }
        match name.parse::<PriceField>() {
            Ok(field) => Ok(self.series.values(field)),
            Err(_) => {
                tracing::warn!(column = name, "required column missing");
                Err(IndicatorError::missing(name))
            }
        }
    }

    /// Borrow an engine-written column without copying.
    pub fn indicator(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name) || name.parse::<PriceField>().is_ok()
    }

    /// Fail with `MissingColumn` on the first absent name.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(name) => {
                tracing::warn!(column = *name, "required column missing");
                Err(IndicatorError::missing(*name))
            }
            None => Ok(()),
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Return a copy with `name` set to `values`, replacing any previous column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.len(), "column length must match row count");
        self.columns.insert(name.into(), values);
        self
    }

    // ---------------------------------------------------------------------
    // Signal columns
    // ---------------------------------------------------------------------

    pub fn signal(&self, name: &str) -> Result<&[bool]> {
        self.signals
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| IndicatorError::missing(name))
    }

    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn with_signal(mut self, name: impl Into<String>, values: Vec<bool>) -> Self {
        debug_assert_eq!(values.len(), self.len(), "signal length must match row count");
        self.signals.insert(name.into(), values);
        self
    }

    /// Store a buy/sell pair under two names.
    pub fn with_signal_pair(self, buy: &str, sell: &str, pair: SignalPair) -> Self {
        self.with_signal(buy, pair.buy).with_signal(sell, pair.sell)
    }

    /// Names of the signal columns that fire on the last row.
    pub fn latest_signals(&self) -> Vec<&str> {
        self.signals
            .iter()
            .filter(|(_, values)| values.last().copied().unwrap_or(false))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The last row's indicator values, undefined cells omitted.
    pub fn latest_values(&self) -> BTreeMap<&str, f64> {
        self.columns
            .iter()
            .filter_map(|(name, values)| {
                values
                    .last()
                    .filter(|v| !v.is_nan())
                    .map(|&v| (name.as_str(), v))
            })
            .collect()
    }
}
