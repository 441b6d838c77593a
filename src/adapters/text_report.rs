//! Plain-text report adapter implementing ReportPort.
//!
//! Sections are built as strings so they can be checked in isolation:
//! - Run header (dialect and key parameters)
//! - Summary block
//! - Exit reason histogram
//! - Daily breakdown table
//! - Trade ledger (optional)

use std::io::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::config::{EntryRule, StrategyConfig};
use crate::domain::error::ScalpError;
use crate::domain::metrics::{DailyBreakdown, Summary};
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReport {
    pub show_trades: bool,
}

impl TextReport {
    pub fn new(show_trades: bool) -> Self {
        Self { show_trades }
    }
}

fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_header(config: &StrategyConfig) -> String {
    let mut out = String::new();
    match config.entry {
        EntryRule::Breakout => {
            out.push_str("=== Scalp with Trend ===\n");
            out.push_str(&format!(
                "EMA {}/{}  ATR {} (min {:.2})  path {}  direction {}\n",
                config.ema_fast_period,
                config.ema_slow_period,
                config.atr_window,
                config.atr_min_points,
                config.exit_bar_path,
                config.trade_direction,
            ));
            let windows: Vec<String> = config
                .session_windows
                .iter()
                .map(|w| w.to_string())
                .collect();
            out.push_str(&format!(
                "Session {}  square-off {}  daily cap {:.2}\n",
                windows.join(", "),
                config.square_off_time.format("%H:%M"),
                config.daily_loss_cap,
            ));
        }
        EntryRule::Cadence(rules) => {
            if rules.enter_next_open {
                out.push_str("=== Random Scalp (Live-Aligned) ===\n");
            } else {
                out.push_str("=== Random Scalp ===\n");
            }
            out.push_str(&format!(
                "Every {} bar(s)  close at bar end {}  wait for exit {}  next-open entry {}  direction {}\n",
                rules.every_n_bars,
                rules.close_at_bar_close,
                rules.wait_for_exit,
                rules.enter_next_open,
                config.trade_direction,
            ));
        }
    }
    out.push_str(&format!(
        "Target {:.2} pts  stop {:.2} pts  qty {}  brokerage {:.2}  slippage {:.2}\n",
        config.target_points,
        config.stoploss_points,
        config.effective_quantity(),
        config.brokerage_per_trade,
        config.slippage_points,
    ));
    out
}

pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::from("\n=== Summary ===\n");
    out.push_str(&format!("Total Trades:     {}\n", summary.total_trades));
    out.push_str(&format!(
        "Wins / Losses:    {} / {} ({} flat)\n",
        summary.wins, summary.losses, summary.flats
    ));
    out.push_str(&format!("Win Rate:         {:.1}%\n", summary.win_rate));
    out.push_str(&format!("Gross P&L:        {}\n", signed(summary.gross_pnl)));
    out.push_str(&format!("Costs:            {:.2}\n", summary.costs));
    out.push_str(&format!("Net P&L:          {}\n", signed(summary.net_pnl)));
    out.push_str(&format!("Final Equity:     {:.2}\n", summary.final_equity));
    out.push_str(&format!("ROI:              {:.2}%\n", summary.roi_percent));
    out.push_str(&format!("Avg Win:          {:.2}\n", summary.avg_win));
    out.push_str(&format!("Avg Loss:         {:.2}\n", summary.avg_loss));
    out.push_str(&format!("Risk:Reward:      {:.2}\n", summary.risk_reward));
    out.push_str(&format!("Max Drawdown:     {:.2}\n", summary.max_drawdown));
    out
}

pub fn format_exit_reasons(summary: &Summary) -> String {
    let mut out = String::from("\n=== Exit Reasons ===\n");
    for (reason, count) in &summary.exit_reasons {
        out.push_str(&format!("  {:<26}{:>6}\n", reason.as_str(), count));
    }
    out
}

pub fn format_daily(days: &[DailyBreakdown]) -> String {
    let mut out = String::from("\n=== Daily Breakdown ===\n");
    out.push_str(&format!(
        "  {:<12}{:>7}{:>6}{:>6}{:>14}{:>14}{:>14}\n",
        "Date", "Trades", "Wins", "Loss", "Profit", "Loss", "Net"
    ));
    for day in days {
        out.push_str(&format!(
            "  {:<12}{:>7}{:>6}{:>6}{:>14.2}{:>14.2}{:>14}\n",
            day.date_label,
            day.trades,
            day.wins,
            day.losses,
            day.profit,
            day.loss,
            signed(day.net_pnl),
        ));
    }
    out
}

pub fn format_trade_log(trades: &[Trade]) -> String {
    let mut out = String::from("\n=== Trades ===\n");
    out.push_str(&format!(
        "  {:<17}{:<17}{:<6}{:>11}{:>11}{:>9}{:>12}  {}\n",
        "Entry", "Exit", "Side", "Entry Px", "Exit Px", "Points", "Net", "Reason"
    ));
    for t in trades {
        out.push_str(&format!(
            "  {:<17}{:<17}{:<6}{:>11.2}{:>11.2}{:>9.2}{:>12}  {}\n",
            t.entry_time.format(TIME_FORMAT).to_string(),
            t.exit_time.format(TIME_FORMAT).to_string(),
            t.side.as_str(),
            t.entry_price,
            t.exit_price,
            t.pnl_points,
            signed(t.net_pnl),
            t.exit_reason,
        ));
    }
    out
}

impl ReportPort for TextReport {
    fn write(
        &self,
        result: &BacktestResult,
        config: &StrategyConfig,
        out: &mut dyn Write,
    ) -> Result<(), ScalpError> {
        out.write_all(format_header(config).as_bytes())?;

        let Some(summary) = &result.summary else {
            let message = result.message.as_deref().unwrap_or("No trades");
            writeln!(out, "\n{message}")?;
            return Ok(());
        };

        out.write_all(format_summary(summary).as_bytes())?;
        out.write_all(format_exit_reasons(summary).as_bytes())?;
        out.write_all(format_daily(&result.daily_stats).as_bytes())?;
        if self.show_trades {
            out.write_all(format_trade_log(&result.trades).as_bytes())?;
        }
        out.flush()?;
        Ok(())
    }
}
