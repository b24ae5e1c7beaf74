#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use indicator_engine::{IndicatorTable, PriceBar, PriceSeries};
use proptest::prelude::*;

pub fn closes_table(closes: &[f64]) -> IndicatorTable {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    PriceSeries::from_closes(start, closes).unwrap().into()
}

/// Bars whose high/low bracket the close by `spread`.
pub fn bars_table(closes: &[f64], spread: f64) -> IndicatorTable {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + spread,
            low: close - spread,
            close,
            volume: 500_000.0,
        })
        .collect();
    PriceSeries::new(bars).unwrap().into()
}

/// Random-walk closes that stay strictly positive.
pub fn price_path(len: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.04f64..0.04, len).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|r| {
                price *= 1.0 + r;
                price
            })
            .collect()
    })
}
