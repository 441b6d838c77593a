//! Entry signal detection.
//!
//! Breakout signals are a pure function of bars `i-1`, `i` and the
//! indicator frame at `i`. The long condition is evaluated first and wins
//! outright when permitted; the short condition is only looked at when the
//! long one did not produce a signal.

use super::bar::Bar;
use super::config::StrategyConfig;
use super::indicator::IndicatorFrame;
use super::position::Side;

pub fn breakout_signal(
    bars: &[Bar],
    frame: &IndicatorFrame,
    i: usize,
    config: &StrategyConfig,
) -> Option<Side> {
    if i < 1 || i >= bars.len() {
        return None;
    }
    let prev = &bars[i - 1];
    let curr = &bars[i];

    if !config.in_session(curr.time()) || !frame.atr_at_least(i, config.atr_min_points) {
        return None;
    }

    if curr.high > prev.high && frame.trend_up(i) && config.trade_direction.allows_long() {
        return Some(Side::Long);
    }
    if curr.low < prev.low && frame.trend_down(i) && config.trade_direction.allows_short() {
        return Some(Side::Short);
    }
    None
}

/// Trend still agrees with `side` at bar `i`.
pub fn trend_confirms(frame: &IndicatorFrame, i: usize, side: Side) -> bool {
    match side {
        Side::Long => frame.trend_up(i),
        Side::Short => frame.trend_down(i),
    }
}

/// Fixed cadence trigger: fires on every bar index divisible by `every_n_bars`.
/// A zero cadence is treated as one.
pub fn cadence_trigger(i: usize, every_n_bars: usize) -> bool {
    i % every_n_bars.max(1) == 0
}
