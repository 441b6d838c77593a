//! Trade ledger statistics and per-day breakdown.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::position::{ExitReason, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub flats: usize,
    /// Percentage, 0-100.
    pub win_rate: f64,
    pub gross_pnl: f64,
    pub costs: f64,
    pub net_pnl: f64,
    pub final_equity: f64,
    pub roi_percent: f64,
    pub avg_win: f64,
    /// Negative (or zero when there are no losers).
    pub avg_loss: f64,
    pub risk_reward: f64,
    /// Largest peak-to-trough fall of cumulative net P&L, as a non-negative amount.
    pub max_drawdown: f64,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl Summary {
    pub fn compute(trades: &[Trade], starting_capital: f64) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut flats = 0usize;
        let mut win_sum = 0.0_f64;
        let mut loss_sum = 0.0_f64;
        let mut gross_pnl = 0.0_f64;
        let mut costs = 0.0_f64;
        let mut net_pnl = 0.0_f64;
        let mut exit_reasons = BTreeMap::new();

        for trade in trades {
            let pnl = trade.net_pnl;
            if pnl > 0.0 {
                wins += 1;
                win_sum += pnl;
            } else if pnl < 0.0 {
                losses += 1;
                loss_sum += pnl;
            } else {
                flats += 1;
            }
            gross_pnl += trade.gross_pnl;
            costs += trade.costs;
            net_pnl += pnl;
            *exit_reasons.entry(trade.exit_reason).or_insert(0) += 1;
        }

        let total_trades = trades.len();
        let avg_win = ratio(win_sum, wins as f64);
        let avg_loss = ratio(loss_sum, losses as f64);

        Summary {
            total_trades,
            wins,
            losses,
            flats,
            win_rate: ratio(wins as f64, total_trades as f64) * 100.0,
            gross_pnl,
            costs,
            net_pnl,
            final_equity: starting_capital + net_pnl,
            roi_percent: ratio(net_pnl, starting_capital) * 100.0,
            avg_win,
            avg_loss,
            risk_reward: ratio(avg_win, avg_loss).abs(),
            max_drawdown: compute_drawdown(trades),
            exit_reasons,
        }
    }
}

/// The running peak starts at the first trade's cumulative P&L.
fn compute_drawdown(trades: &[Trade]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        cumulative += trade.net_pnl;
        peak = peak.max(cumulative);
        max_dd = max_dd.max(peak - cumulative);
    }

    max_dd
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyBreakdown {
    pub date: NaiveDate,
    /// e.g. "01 Sep 2025"
    pub date_label: String,
    pub net_pnl: f64,
    pub profit: f64,
    pub loss: f64,
    pub wins: usize,
    pub losses: usize,
    pub trades: usize,
}

impl DailyBreakdown {
    fn empty(date: NaiveDate) -> Self {
        DailyBreakdown {
            date,
            date_label: date.format("%d %b %Y").to_string(),
            net_pnl: 0.0,
            profit: 0.0,
            loss: 0.0,
            wins: 0,
            losses: 0,
            trades: 0,
        }
    }
}

/// Group trades by exit date, ascending.
pub fn daily_breakdown(trades: &[Trade]) -> Vec<DailyBreakdown> {
    let mut days: BTreeMap<NaiveDate, DailyBreakdown> = BTreeMap::new();

    for trade in trades {
        let date = trade.exit_time.date();
        let day = days
            .entry(date)
            .or_insert_with(|| DailyBreakdown::empty(date));
        let pnl = trade.net_pnl;
        day.net_pnl += pnl;
        day.trades += 1;
        if pnl > 0.0 {
            day.profit += pnl;
            day.wins += 1;
        } else if pnl < 0.0 {
            day.loss += pnl;
            day.losses += 1;
        }
    }

    days.into_values().collect()
}
