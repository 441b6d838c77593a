//! Open position and closed trade records.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExitReason {
    TargetHit,
    StoplossHit,
    SquareOffEod,
    ForcedExitNewEntry,
    EndOfData,
    CloseAtBarEnd,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::TargetHit => "Target Hit",
            ExitReason::StoplossHit => "Stoploss Hit",
            ExitReason::SquareOffEod => "Square-off EOD",
            ExitReason::ForcedExitNewEntry => "Forced Exit (New Entry)",
            ExitReason::EndOfData => "End of Data",
            ExitReason::CloseAtBarEnd => "Close @ Bar End",
        }
    }

    /// Exits that fill exactly at a price threshold inside the bar.
    pub fn is_threshold(&self) -> bool {
        matches!(self, ExitReason::TargetHit | ExitReason::StoplossHit)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_index: usize,
    /// Bar whose signal scheduled this entry, if any.
    pub signal_index: Option<usize>,
    pub target_level: f64,
    /// `None` when the stop is disabled.
    pub stop_level: Option<f64>,
}

impl Position {
    /// Levels are `entry ± target_points` and `entry ∓ stoploss_points`
    /// by side. A non-positive stop distance leaves the stop unset.
    pub fn open(
        side: Side,
        entry_price: f64,
        entry_time: NaiveDateTime,
        entry_index: usize,
        target_points: f64,
        stoploss_points: f64,
    ) -> Self {
        let target_level = entry_price + side.sign() * target_points;
        let stop_level =
            (stoploss_points > 0.0).then(|| entry_price - side.sign() * stoploss_points);
        Position {
            side,
            entry_price,
            entry_time,
            entry_index,
            signal_index: None,
            target_level,
            stop_level,
        }
    }

    pub fn with_signal(mut self, signal_index: usize) -> Self {
        self.signal_index = Some(signal_index);
        self
    }

    /// Signed price move in the position's favour.
    pub fn points_at(&self, price: f64) -> f64 {
        self.side.sign() * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub signal_index: Option<usize>,
    pub entry_index: usize,
    pub exit_index: usize,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl_points: f64,
    pub gross_pnl: f64,
    pub costs: f64,
    pub net_pnl: f64,
    pub exit_reason: ExitReason,
    /// Running equity after this trade.
    pub equity: f64,
}
