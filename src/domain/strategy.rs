//! Registered strategies and their parameter catalogue.

use std::fmt;
use std::str::FromStr;

use super::config::{CadenceRules, EntryRule, StrategyConfig};
use super::error::ScalpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    ScalpWithTrend,
    RandomScalp,
    /// Cadence triggered on the bar close, filled at the next open.
    RandomScalpLive,
}

/// One tunable parameter, as listed by the `strategies` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub constraint: &'static str,
}

const fn param(name: &'static str, default: &'static str, constraint: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        default,
        constraint,
    }
}

const SHARED_PARAMS: &[ParamSpec] = &[
    param("trade_direction", "both", "both | long_only | short_only"),
    param("quantity_multiplier", "1", "> 0"),
];

const TREND_PARAMS: &[ParamSpec] = &[
    param("target_points", "10", "> 0"),
    param("stoploss_points", "2", ">= 0, 0 disables the stop"),
    param("ema_fast", "5", "1..=200"),
    param("ema_slow", "20", "1..=200"),
    param("atr_window", "14", "1..=100"),
    param("atr_min_points", "2", ">= 0"),
    param("daily_loss_cap", "-1000", "<= 0"),
    param("exit_bar_path", "color", "color | bull | bear | worst"),
    param("confirm_trend_at_entry", "true", "bool"),
    param("enable_eod_square_off", "true", "bool"),
];

const CADENCE_PARAMS: &[ParamSpec] = &[
    param("target_points", "1", "> 0"),
    param("stoploss_points", "0.5", ">= 0, 0 disables the stop"),
    param("trade_every_n_bars", "1", "1..=1000"),
    param("close_at_bar_close", "true", "bool"),
    param("wait_for_exit", "false", "bool"),
];

const LIVE_CADENCE_PARAMS: &[ParamSpec] = &[
    param("target_points", "2", "> 0"),
    param("stoploss_points", "1", ">= 0, 0 disables the stop"),
    param("trade_every_n_bars", "1", "1..=1000"),
    param("close_at_bar_close", "false", "bool"),
    param("wait_for_exit", "true", "bool"),
];

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::ScalpWithTrend,
        StrategyKind::RandomScalp,
        StrategyKind::RandomScalpLive,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::ScalpWithTrend => "scalp_with_trend",
            StrategyKind::RandomScalp => "random_scalp",
            StrategyKind::RandomScalpLive => "random_scalp_live",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StrategyKind::ScalpWithTrend => "Scalp with Trend",
            StrategyKind::RandomScalp => "Random Scalp",
            StrategyKind::RandomScalpLive => "Random Scalp (Live-Aligned)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::ScalpWithTrend => {
                "Breakout of the previous bar's high/low in the direction of the EMA trend, \
                 filtered by ATR and session windows, entered at the next bar's open."
            }
            StrategyKind::RandomScalp => {
                "Enters at the open of every Nth bar with fixed target and stop, \
                 optionally closing at the bar's close."
            }
            StrategyKind::RandomScalpLive => {
                "Signals on every Nth bar's close and enters at the next bar's open, \
                 holding one position until target or stop."
            }
        }
    }

    /// Shared parameters first, then the strategy-specific ones.
    pub fn parameters(&self) -> Vec<ParamSpec> {
        let specific = match self {
            StrategyKind::ScalpWithTrend => TREND_PARAMS,
            StrategyKind::RandomScalp => CADENCE_PARAMS,
            StrategyKind::RandomScalpLive => LIVE_CADENCE_PARAMS,
        };
        SHARED_PARAMS.iter().chain(specific).copied().collect()
    }

    pub fn default_entry(&self) -> EntryRule {
        match self {
            StrategyKind::ScalpWithTrend => EntryRule::Breakout,
            StrategyKind::RandomScalp => EntryRule::Cadence(CadenceRules::default()),
            StrategyKind::RandomScalpLive => EntryRule::Cadence(CadenceRules {
                every_n_bars: 1,
                close_at_bar_close: false,
                wait_for_exit: true,
                enter_next_open: true,
            }),
        }
    }

    /// Defaults for every key the config file leaves out.
    pub fn default_config(&self) -> StrategyConfig {
        let base = StrategyConfig {
            entry: self.default_entry(),
            ..StrategyConfig::default()
        };
        let (target_points, stoploss_points) = match self {
            StrategyKind::ScalpWithTrend => return base,
            StrategyKind::RandomScalp => (1.0, 0.5),
            StrategyKind::RandomScalpLive => (2.0, 1.0),
        };
        StrategyConfig {
            target_points,
            stoploss_points,
            brokerage_per_trade: 0.0,
            slippage_points: 0.0,
            qty_per_point: 1.0,
            ..base
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ScalpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| ScalpError::UnknownStrategy {
                name: s.trim().to_string(),
            })
    }
}
