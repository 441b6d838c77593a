//! Backtest entry point: simulate, then aggregate.

use tracing::{info, warn};

use super::bar::Bar;
use super::config::{EntryRule, StrategyConfig};
use super::error::ScalpError;
use super::execution::simulate;
use super::metrics::{daily_breakdown, DailyBreakdown, Summary};
use super::position::Trade;

pub const NO_BARS_MESSAGE: &str = "No bars to backtest";
pub const NO_TRADES_MESSAGE: &str = "No trades generated for the given data and parameters";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// `None` when no trade was emitted.
    pub summary: Option<Summary>,
    pub daily_stats: Vec<DailyBreakdown>,
    /// Why the run produced nothing, when it produced nothing.
    pub message: Option<String>,
}

impl BacktestResult {
    fn empty(message: &str) -> Self {
        BacktestResult {
            trades: Vec::new(),
            summary: None,
            daily_stats: Vec::new(),
            message: Some(message.to_string()),
        }
    }

    pub fn has_trades(&self) -> bool {
        !self.trades.is_empty()
    }
}

/// Run one backtest over `bars`.
///
/// `quantity` is the currency value of one point, already multiplied out
/// (see [`StrategyConfig::effective_quantity`]). Empty input or zero
/// trades is not an error; the result carries an explanatory message.
pub fn run(
    bars: &[Bar],
    config: &StrategyConfig,
    starting_capital: f64,
    quantity: f64,
) -> Result<BacktestResult, ScalpError> {
    if bars.is_empty() {
        warn!("{NO_BARS_MESSAGE}");
        return Ok(BacktestResult::empty(NO_BARS_MESSAGE));
    }

    let trades = simulate(bars, config, starting_capital, quantity)?;
    if trades.is_empty() {
        warn!(bars = bars.len(), "{NO_TRADES_MESSAGE}");
        return Ok(BacktestResult::empty(NO_TRADES_MESSAGE));
    }

    let summary = Summary::compute(&trades, starting_capital);
    let daily_stats = daily_breakdown(&trades);

    let dialect = match config.entry {
        EntryRule::Breakout => "breakout",
        EntryRule::Cadence(_) => "cadence",
    };
    info!(
        dialect,
        bars = bars.len(),
        trades = summary.total_trades,
        net_pnl = summary.net_pnl,
        "backtest complete"
    );

    Ok(BacktestResult {
        trades,
        summary: Some(summary),
        daily_stats,
        message: None,
    })
}
