//! Trend and volatility indicators computed once over a bar series.
//!
//! `IndicatorFrame` holds one value per bar for each derived column. It is
//! produced before the scan starts and only read afterwards.

pub mod atr;
pub mod ema;

use crate::domain::bar::Bar;
use crate::domain::config::StrategyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub true_range: Vec<f64>,
    /// NaN until `atr_window` bars are available.
    pub atr: Vec<f64>,
}

impl IndicatorFrame {
    pub fn compute(bars: &[Bar], config: &StrategyConfig) -> Self {
        Self::with_periods(
            bars,
            config.ema_fast_period,
            config.ema_slow_period,
            config.atr_window,
        )
    }

    pub fn with_periods(bars: &[Bar], fast: usize, slow: usize, atr_window: usize) -> Self {
        let true_range = atr::true_range_series(bars);
        let atr = atr::calculate_atr(&true_range, atr_window);
        IndicatorFrame {
            ema_fast: ema::calculate_ema(bars, fast),
            ema_slow: ema::calculate_ema(bars, slow),
            true_range,
            atr,
        }
    }

    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }

    pub fn trend_up(&self, i: usize) -> bool {
        self.ema_fast[i] > self.ema_slow[i]
    }

    pub fn trend_down(&self, i: usize) -> bool {
        self.ema_fast[i] < self.ema_slow[i]
    }

    /// False while ATR is still NaN.
    pub fn atr_at_least(&self, i: usize, min_points: f64) -> bool {
        self.atr[i] >= min_points
    }
}
