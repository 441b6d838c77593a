//! True range and Average True Range.
//!
//! TR[0] = high - low; afterwards the classic three-way max against the
//! previous close. ATR is the simple rolling mean of TR over `window`
//! bars and stays NaN until the window fills.

use crate::domain::bar::Bar;

pub fn true_range_series(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

/// Simple rolling mean. A zero window never fills.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }

    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out[i] = sum / window as f64;
        }
    }
    out
}

pub fn calculate_atr(true_range: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(true_range, window)
}
