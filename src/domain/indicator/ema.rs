//! Exponential Moving Average.
//!
//! alpha = 2/(n+1), seeded with the first close (no warmup),
//! then EMA[i] = alpha*C[i] + (1-alpha)*EMA[i-1].

use crate::domain::bar::Bar;

pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

pub fn calculate_ema(bars: &[Bar], period: usize) -> Vec<f64> {
    let alpha = smoothing_factor(period);
    let mut values = Vec::with_capacity(bars.len());
    let mut prev: Option<f64> = None;

    for bar in bars {
        let ema = match prev {
            None => bar.close,
            Some(p) => alpha * bar.close + (1.0 - alpha) * p,
        };
        values.push(ema);
        prev = Some(ema);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + chrono::Duration::minutes(5 * i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
                open_interest: None,
            })
            .collect()
    }

    #[test]
    fn ema_seeded_with_first_close() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let ema = calculate_ema(&bars, 3);
        assert_relative_eq!(ema[0], 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let ema = calculate_ema(&bars, 3);

        let k = 0.5;
        let e1 = k * 20.0 + (1.0 - k) * 10.0;
        let e2 = k * 30.0 + (1.0 - k) * e1;
        let e3 = k * 40.0 + (1.0 - k) * e2;
        assert_relative_eq!(ema[1], e1);
        assert_relative_eq!(ema[2], e2);
        assert_relative_eq!(ema[3], e3);
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let bars = make_bars(&[10.0, 20.0, 15.0]);
        let ema = calculate_ema(&bars, 1);
        assert_eq!(ema, vec![10.0, 20.0, 15.0]);
    }

    #[test]
    fn ema_flat_prices() {
        let bars = make_bars(&[100.0; 6]);
        for v in calculate_ema(&bars, 4) {
            assert_relative_eq!(v, 100.0);
        }
    }

    #[test]
    fn ema_empty_bars() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_smoothing_factor() {
        assert_relative_eq!(smoothing_factor(10), 2.0 / 11.0);
    }
}
