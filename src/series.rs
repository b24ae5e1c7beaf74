// =============================================================================
// Column Kernels
// =============================================================================
//
// Window statistics shared by every engine.  Each kernel returns a column of
// the same length as its input; cells without enough history are NaN.  A NaN
// anywhere inside a window makes that window's result NaN, so undefined cells
// propagate into dependent columns.
//
// Windows are summed directly rather than with a running total so that a
// window's mean is exactly the arithmetic mean of its members.
// =============================================================================

/// Right-aligned rolling arithmetic mean.  Defined from index `window - 1`.
///
/// Callers guarantee `window >= 1`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Right-aligned rolling sample standard deviation (n - 1 denominator).
///
/// A window of one has no sample deviation and yields NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss: f64 = w.iter().map(|x| (x - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    })
}

/// Right-aligned rolling maximum.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        if w.iter().any(|x| x.is_nan()) {
            f64::NAN
        } else {
            w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    })
}

/// Right-aligned rolling minimum.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        if w.iter().any(|x| x.is_nan()) {
            f64::NAN
        } else {
            w.iter().copied().fold(f64::INFINITY, f64::min)
        }
    })
}

fn rolling(values: &[f64], window: usize, stat: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    debug_assert!(window >= 1, "rolling window must be positive");
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = stat(w);
    }
    out
}

/// Exponential moving average with smoothing factor `alpha = 2 / (span + 1)`.
///
/// Seeded with the first defined input (no SMA warm-up), so a gap-free column
/// yields a value from row 0:
///   EMA_0 = x_0
///   EMA_t = alpha * x_t + (1 - alpha) * EMA_{t-1}
///
/// Leading NaN cells stay NaN.  A NaN after the seed yields NaN at that row
/// and leaves the running average untouched for the next defined cell.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        if x.is_nan() {
            out.push(f64::NAN);
            continue;
        }
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        prev = Some(next);
        out.push(next);
    }
    out
}

/// `values[t] - values[t - lag]`; NaN for the first `lag` rows.
pub fn diff(values: &[f64], lag: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i < lag {
                f64::NAN
            } else {
                values[i] - values[i - lag]
            }
        })
        .collect()
}

/// Element-wise `a - b`.
pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
