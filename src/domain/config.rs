//! Strategy configuration.
//!
//! A `StrategyConfig` is built once per run and passed by reference into
//! every engine call. Nothing in the engine mutates it.

use chrono::NaiveTime;
use std::fmt;
use std::str::FromStr;

/// Assumed price path inside a bar when target and stop are both touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitBarPath {
    /// Bull ordering on green bars, bear ordering on red bars.
    #[default]
    Color,
    /// open -> low -> high -> close
    Bull,
    /// open -> high -> low -> close
    Bear,
    /// Stop always wins.
    Worst,
}

impl ExitBarPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitBarPath::Color => "color",
            ExitBarPath::Bull => "bull",
            ExitBarPath::Bear => "bear",
            ExitBarPath::Worst => "worst",
        }
    }
}

impl fmt::Display for ExitBarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExitBarPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "color" => Ok(ExitBarPath::Color),
            "bull" => Ok(ExitBarPath::Bull),
            "bear" => Ok(ExitBarPath::Bear),
            "worst" => Ok(ExitBarPath::Worst),
            other => Err(format!(
                "unknown exit bar path '{other}' (expected color, bull, bear or worst)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradeDirection {
    #[default]
    Both,
    LongOnly,
    ShortOnly,
}

impl TradeDirection {
    pub fn allows_long(&self) -> bool {
        matches!(self, TradeDirection::Both | TradeDirection::LongOnly)
    }

    pub fn allows_short(&self) -> bool {
        matches!(self, TradeDirection::Both | TradeDirection::ShortOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Both => "both",
            TradeDirection::LongOnly => "long_only",
            TradeDirection::ShortOnly => "short_only",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "both" => Ok(TradeDirection::Both),
            "long_only" => Ok(TradeDirection::LongOnly),
            "short_only" => Ok(TradeDirection::ShortOnly),
            other => Err(format!(
                "unknown trade direction '{other}' (expected both, long_only or short_only)"
            )),
        }
    }
}

/// Time-of-day interval in which new entries are allowed. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        SessionWindow { start, end }
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t <= self.end
    }
}

impl fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for SessionWindow {
    type Err = String;

    /// Parses `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("session window '{}' must look like HH:MM-HH:MM", s.trim()))?;
        Ok(SessionWindow {
            start: parse_hhmm(start)?,
            end: parse_hhmm(end)?,
        })
    }
}

pub fn parse_hhmm(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| format!("invalid time '{}' (expected HH:MM)", s.trim()))
}

/// Knobs for the fixed-cadence entry dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceRules {
    pub every_n_bars: usize,
    /// Exit at the bar's close when neither target nor stop was touched.
    pub close_at_bar_close: bool,
    /// When false, a cadence trigger force-closes an open position first.
    pub wait_for_exit: bool,
    /// Trigger on a bar's close and fill at the next bar's open instead of
    /// entering at the trigger bar's own open.
    pub enter_next_open: bool,
}

impl Default for CadenceRules {
    fn default() -> Self {
        CadenceRules {
            every_n_bars: 1,
            close_at_bar_close: true,
            wait_for_exit: false,
            enter_next_open: false,
        }
    }
}

/// How new positions are triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryRule {
    /// EMA trend + ATR filtered breakout of the previous bar's extreme,
    /// filled at the next bar's open.
    #[default]
    Breakout,
    /// Enter every N bars at that bar's open.
    Cadence(CadenceRules),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub entry: EntryRule,
    pub target_points: f64,
    /// Non-positive disables the stop.
    pub stoploss_points: f64,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub atr_window: usize,
    pub atr_min_points: f64,
    /// Realized daily net P&L at or below this halts new entries for the day.
    pub daily_loss_cap: f64,
    pub exit_bar_path: ExitBarPath,
    pub trade_direction: TradeDirection,
    pub confirm_trend_at_entry: bool,
    pub enable_eod_square_off: bool,
    pub square_off_time: NaiveTime,
    pub session_windows: Vec<SessionWindow>,
    pub brokerage_per_trade: f64,
    pub slippage_points: f64,
    pub qty_per_point: f64,
    pub quantity_multiplier: f64,
}

impl StrategyConfig {
    /// Per-point currency multiplier handed to the engine.
    pub fn effective_quantity(&self) -> f64 {
        self.qty_per_point * self.quantity_multiplier
    }

    pub fn in_session(&self, t: NaiveTime) -> bool {
        self.session_windows.iter().any(|w| w.contains(t))
    }

    pub fn past_square_off(&self, t: NaiveTime) -> bool {
        t >= self.square_off_time
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            entry: EntryRule::Breakout,
            target_points: 10.0,
            stoploss_points: 2.0,
            ema_fast_period: 5,
            ema_slow_period: 20,
            atr_window: 14,
            atr_min_points: 2.0,
            daily_loss_cap: -1000.0,
            exit_bar_path: ExitBarPath::Color,
            trade_direction: TradeDirection::Both,
            confirm_trend_at_entry: true,
            enable_eod_square_off: true,
            square_off_time: hm(15, 25),
            session_windows: vec![SessionWindow::new(hm(9, 20), hm(15, 5))],
            brokerage_per_trade: 20.0,
            slippage_points: 0.10,
            qty_per_point: 150.0,
            quantity_multiplier: 1.0,
        }
    }
}
