// =============================================================================
// Edge-Triggered Signals
// =============================================================================
//
// Every signal in the engine compares row t against row t-1 and fires only on
// the row where the condition transitions.  Row 0 has no predecessor and is
// always false.  Comparisons involving NaN are false, so signal columns never
// carry undefined cells.
// =============================================================================

use serde::Serialize;

use crate::series;

/// A buy/sell (or bullish/bearish) pair of boolean columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SignalPair {
    pub buy: Vec<bool>,
    pub sell: Vec<bool>,
}

impl SignalPair {
    /// Rows where `buy` fires.
    pub fn buy_rows(&self) -> Vec<usize> {
        fired(&self.buy)
    }

    /// Rows where `sell` fires.
    pub fn sell_rows(&self) -> Vec<usize> {
        fired(&self.sell)
    }
}

/// Indices of the `true` cells.
pub fn fired(column: &[bool]) -> Vec<usize> {
    column
        .iter()
        .enumerate()
        .filter_map(|(i, &hit)| hit.then_some(i))
        .collect()
}

/// Evaluate `cond(prev, cur)` for each row with a predecessor.
pub fn edge(values: &[f64], cond: impl Fn(f64, f64) -> bool) -> Vec<bool> {
    let mut out = vec![false; values.len()];
    for t in 1..values.len() {
        out[t] = cond(values[t - 1], values[t]);
    }
    out
}

/// Sign flip of `values` through zero: buy on negative to positive, sell on
/// positive to negative.  Touching zero without crossing does not fire.
pub fn zero_cross(values: &[f64]) -> SignalPair {
    SignalPair {
        buy: edge(values, |prev, cur| prev < 0.0 && cur > 0.0),
        sell: edge(values, |prev, cur| prev > 0.0 && cur < 0.0),
    }
}

/// `fast` crossing `slow`, detected as a sign flip of `fast - slow`.
pub fn line_cross(fast: &[f64], slow: &[f64]) -> SignalPair {
    zero_cross(&series::sub(fast, slow))
}

/// `fast` overtaking `slow` after sitting at or below it (and the mirror).
///
/// Unlike [`line_cross`], a tie on the previous row counts as "not above", so a
/// short average leaving a flat stretch where both averages coincide still
/// fires.  The two outputs can never be true on the same row.
pub fn overtake(fast: &[f64], slow: &[f64]) -> SignalPair {
    let n = fast.len();
    let mut pair = SignalPair {
        buy: vec![false; n],
        sell: vec![false; n],
    };
    for t in 1..n {
        let (pf, ps, cf, cs) = (fast[t - 1], slow[t - 1], fast[t], slow[t]);
        pair.buy[t] = pf <= ps && cf > cs;
        pair.sell[t] = pf >= ps && cf < cs;
    }
    pair
}

/// `values` rising through `lower` (buy) and falling through `upper` (sell).
pub fn threshold_cross(values: &[f64], lower: f64, upper: f64) -> SignalPair {
    SignalPair {
        buy: edge(values, |prev, cur| prev < lower && cur > lower),
        sell: edge(values, |prev, cur| prev > upper && cur < upper),
    }
}

/// Lagged-delta divergence between a price column and an indicator column.
///
/// Over `window` rows, bullish (buy) where price fell while the indicator
/// rose; bearish (sell) where price rose while the indicator fell.  The first
/// `window` rows have no lagged value and are false.
pub fn divergence(price: &[f64], indicator: &[f64], window: usize) -> SignalPair {
    let price_delta = series::diff(price, window);
    let indicator_delta = series::diff(indicator, window);
    let (buy, sell) = price_delta
        .iter()
        .zip(&indicator_delta)
        .map(|(&p, &i)| (p < 0.0 && i > 0.0, p > 0.0 && i < 0.0))
        .unzip();
    SignalPair { buy, sell }
}
