//! Single-instrument trade execution state machine.
//!
//! Walks an ordered bar series once, holding at most one open position.
//! While flat it asks the entry rule for a trigger; while in a position it
//! asks the path policy whether the bar closed it. Every exit is settled
//! into a `Trade` with round-trip costs and running equity.
//!
//! Everything the scan touches lives on the call stack of [`simulate`]; the
//! config is only ever borrowed.

use tracing::debug;

use super::bar::{ensure_ordered, is_last_bar_of_day, Bar};
use super::config::{CadenceRules, EntryRule, StrategyConfig, TradeDirection};
use super::daily::DailyGuard;
use super::error::ScalpError;
use super::indicator::IndicatorFrame;
use super::path_policy::{resolve_position_exit, resolve_target_first, ExitFill};
use super::position::{ExitReason, Position, Side, Trade};
use super::signal::{breakout_signal, cadence_trigger, trend_confirms};

/// Round-trip cost: brokerage on both legs plus slippage on both legs.
pub fn round_trip_costs(brokerage_per_trade: f64, slippage_points: f64, quantity: f64) -> f64 {
    2.0 * brokerage_per_trade + 2.0 * slippage_points * quantity
}

/// Realized trades plus the daily state they produced.
struct Book<'a> {
    config: &'a StrategyConfig,
    quantity: f64,
    equity: f64,
    guard: DailyGuard,
    trades: Vec<Trade>,
}

impl<'a> Book<'a> {
    fn new(config: &'a StrategyConfig, starting_capital: f64, quantity: f64) -> Self {
        Book {
            config,
            quantity,
            equity: starting_capital,
            guard: DailyGuard::new(config.daily_loss_cap),
            trades: Vec::new(),
        }
    }

    fn settle(&mut self, position: Position, bar: &Bar, exit_index: usize, fill: ExitFill) {
        let pnl_points = position.points_at(fill.price);
        let gross_pnl = pnl_points * self.quantity;
        let costs = round_trip_costs(
            self.config.brokerage_per_trade,
            self.config.slippage_points,
            self.quantity,
        );
        let net_pnl = gross_pnl - costs;
        self.equity += net_pnl;

        if self.guard.record(bar.date(), net_pnl) {
            debug!(date = %bar.date(), "daily loss cap reached, entries halted for the day");
        }

        debug!(
            side = %position.side,
            entry = position.entry_price,
            exit = fill.price,
            reason = %fill.reason,
            net_pnl,
            "closed position"
        );

        self.trades.push(Trade {
            entry_time: position.entry_time,
            exit_time: bar.timestamp,
            signal_index: position.signal_index,
            entry_index: position.entry_index,
            exit_index,
            side: position.side,
            entry_price: position.entry_price,
            exit_price: fill.price,
            pnl_points,
            gross_pnl,
            costs,
            net_pnl,
            exit_reason: fill.reason,
            equity: self.equity,
        });
    }

    /// Force-close whatever is still open at the last bar's close.
    fn finish(mut self, bars: &[Bar], position: Option<Position>) -> Vec<Trade> {
        if let (Some(position), Some(last)) = (position, bars.last()) {
            let fill = ExitFill {
                price: last.close,
                reason: ExitReason::EndOfData,
            };
            self.settle(position, last, bars.len() - 1, fill);
        }
        self.trades
    }

    fn open(&self, side: Side, bar: &Bar, index: usize) -> Position {
        debug!(side = %side, price = bar.open, time = %bar.timestamp, "opened position");
        Position::open(
            side,
            bar.open,
            bar.timestamp,
            index,
            self.config.target_points,
            self.config.stoploss_points,
        )
    }
}

/// Run the configured entry rule over `bars` and return the trade ledger.
///
/// `quantity` converts points into currency. The only failure is a bar
/// series whose timestamps are not strictly increasing.
pub fn simulate(
    bars: &[Bar],
    config: &StrategyConfig,
    starting_capital: f64,
    quantity: f64,
) -> Result<Vec<Trade>, ScalpError> {
    ensure_ordered(bars)?;
    let book = Book::new(config, starting_capital, quantity);
    let trades = match config.entry {
        EntryRule::Breakout => run_breakout(bars, book),
        EntryRule::Cadence(rules) => run_cadence(bars, rules, book),
    };
    Ok(trades)
}

fn run_breakout(bars: &[Bar], mut book: Book<'_>) -> Vec<Trade> {
    let config = book.config;
    let frame = IndicatorFrame::compute(bars, config);
    let mut position: Option<Position> = None;

    let mut i = 1;
    while i < bars.len() {
        let bar = &bars[i];

        if let Some(open) = position.take() {
            let fill = resolve_position_exit(bar, &open, config.exit_bar_path).or_else(|| {
                let eod = config.enable_eod_square_off
                    && (is_last_bar_of_day(bars, i) || config.past_square_off(bar.time()));
                eod.then_some(ExitFill {
                    price: bar.close,
                    reason: ExitReason::SquareOffEod,
                })
            });
            match fill {
                Some(fill) => book.settle(open, bar, i, fill),
                None => position = Some(open),
            }
            i += 1;
            continue;
        }

        if book.guard.is_stopped(bar.date()) {
            i += 1;
            continue;
        }

        let Some(side) = breakout_signal(bars, &frame, i, config) else {
            i += 1;
            continue;
        };

        // A signal that fails confirmation is dropped, not retried.
        if config.confirm_trend_at_entry && !trend_confirms(&frame, i, side) {
            i += 1;
            continue;
        }

        match bars.get(i + 1) {
            Some(next) => {
                position = Some(book.open(side, next, i + 1).with_signal(i));
                i += 2;
            }
            None => i += 1,
        }
    }

    book.finish(bars, position)
}

fn cadence_side(direction: TradeDirection) -> Side {
    match direction {
        TradeDirection::ShortOnly => Side::Short,
        TradeDirection::Both | TradeDirection::LongOnly => Side::Long,
    }
}

fn run_cadence(bars: &[Bar], rules: CadenceRules, mut book: Book<'_>) -> Vec<Trade> {
    let side = cadence_side(book.config.trade_direction);
    let mut position: Option<Position> = None;
    // Trigger bar whose entry fills at the following open.
    let mut pending: Option<usize> = None;

    for (i, bar) in bars.iter().enumerate() {
        if let Some(open) = position.take() {
            let fill = resolve_target_first(bar, &open).or_else(|| {
                rules.close_at_bar_close.then_some(ExitFill {
                    price: bar.close,
                    reason: ExitReason::CloseAtBarEnd,
                })
            });
            match fill {
                Some(fill) => book.settle(open, bar, i, fill),
                None => position = Some(open),
            }
        }

        if let Some(signal) = pending.take() {
            force_exit_at_open(&mut book, &mut position, bar, i);
            position = Some(book.open(side, bar, i).with_signal(signal));
        }

        if rules.enter_next_open {
            // Bars are counted from one when triggering on the close.
            let fires = cadence_trigger(i + 1, rules.every_n_bars);
            if fires && !(position.is_some() && rules.wait_for_exit) && i + 1 < bars.len() {
                pending = Some(i);
            }
            continue;
        }

        if !cadence_trigger(i, rules.every_n_bars) {
            continue;
        }
        if position.is_some() && rules.wait_for_exit {
            continue;
        }
        force_exit_at_open(&mut book, &mut position, bar, i);
        position = Some(book.open(side, bar, i));
    }

    book.finish(bars, position)
}

fn force_exit_at_open(book: &mut Book<'_>, position: &mut Option<Position>, bar: &Bar, i: usize) {
    if let Some(open) = position.take() {
        let fill = ExitFill {
            price: bar.open,
            reason: ExitReason::ForcedExitNewEntry,
        };
        book.settle(open, bar, i, fill);
    }
}
