//! Fixtures shared by the inline unit tests.

use chrono::{TimeZone, Utc};

use crate::market_data::{PriceBar, PriceSeries};
use crate::table::IndicatorTable;

/// Deterministic oscillating closes with a slight upward drift.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.25).sin() + 0.05 * i as f64)
        .collect()
}

pub fn table_from_closes(closes: &[f64]) -> IndicatorTable {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    PriceSeries::from_closes(start, closes).unwrap().into()
}

/// Bars with a one-point range around each close.
pub fn ohlc_table(closes: &[f64]) -> IndicatorTable {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        })
        .collect();
    PriceSeries::new(bars).unwrap().into()
}
