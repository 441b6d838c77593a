//! Intrabar path policies: resolve target-vs-stop ambiguity from OHLC alone.
//!
//! When a single bar touches both the target and the stop of an open
//! position, the true fill order is unknowable. Each `ExitBarPath` encodes
//! an explicit assumption about the path the price took inside the bar.
//! Fills always happen exactly at the touched level, never at the bar
//! extreme.

use super::bar::Bar;
use super::config::ExitBarPath;
use super::position::{ExitReason, Position, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitFill {
    pub price: f64,
    pub reason: ExitReason,
}

impl ExitFill {
    fn target(price: f64) -> Self {
        ExitFill {
            price,
            reason: ExitReason::TargetHit,
        }
    }

    fn stop(price: f64) -> Self {
        ExitFill {
            price,
            reason: ExitReason::StoplossHit,
        }
    }
}

/// Which extreme the bar visits first after the open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathOrder {
    /// open -> low -> high -> close
    LowFirst,
    /// open -> high -> low -> close
    HighFirst,
}

impl ExitBarPath {
    /// `None` for `Worst`, which assumes no ordering at all.
    fn order_for(&self, bar: &Bar) -> Option<PathOrder> {
        match self {
            ExitBarPath::Bull => Some(PathOrder::LowFirst),
            ExitBarPath::Bear => Some(PathOrder::HighFirst),
            ExitBarPath::Color if bar.is_bullish() => Some(PathOrder::LowFirst),
            ExitBarPath::Color => Some(PathOrder::HighFirst),
            ExitBarPath::Worst => None,
        }
    }
}

fn touched(bar: &Bar, side: Side, target: f64, stop: Option<f64>) -> (bool, bool) {
    match side {
        Side::Long => (bar.high >= target, stop.is_some_and(|s| bar.low <= s)),
        Side::Short => (bar.low <= target, stop.is_some_and(|s| bar.high >= s)),
    }
}

/// Decide whether `bar` closes a position with the given levels, and how.
pub fn resolve_exit(
    bar: &Bar,
    side: Side,
    target: f64,
    stop: Option<f64>,
    path: ExitBarPath,
) -> Option<ExitFill> {
    let (hit_target, hit_stop) = touched(bar, side, target, stop);

    let stop_level = match stop {
        Some(s) if hit_stop => s,
        _ => return hit_target.then(|| ExitFill::target(target)),
    };
    if !hit_target {
        return Some(ExitFill::stop(stop_level));
    }

    let Some(order) = path.order_for(bar) else {
        return Some(ExitFill::stop(stop_level));
    };
    // The level on the low side of the bar is the stop for a long and the
    // target for a short.
    let low_side_is_stop = side == Side::Long;
    let stop_first = match order {
        PathOrder::LowFirst => low_side_is_stop,
        PathOrder::HighFirst => !low_side_is_stop,
    };
    if stop_first {
        Some(ExitFill::stop(stop_level))
    } else {
        Some(ExitFill::target(target))
    }
}

pub fn resolve_position_exit(bar: &Bar, position: &Position, path: ExitBarPath) -> Option<ExitFill> {
    resolve_exit(
        bar,
        position.side,
        position.target_level,
        position.stop_level,
        path,
    )
}

/// Single-sided check used by the cadence dialect: target, then stop,
/// without any path assumption.
pub fn resolve_target_first(bar: &Bar, position: &Position) -> Option<ExitFill> {
    let (hit_target, hit_stop) = touched(bar, position.side, position.target_level, position.stop_level);
    if hit_target {
        return Some(ExitFill::target(position.target_level));
    }
    match position.stop_level {
        Some(s) if hit_stop => Some(ExitFill::stop(s)),
        _ => None,
    }
}
