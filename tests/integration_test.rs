//! End-to-end engine scenarios.
//!
//! Tests cover:
//! - Breakout entry at the next bar's open with an End of Data close
//! - Intrabar path policies on a bar that touches both levels
//! - Daily loss cap halting entries for one date only
//! - Cadence dialect with a disabled stop
//! - Round-trip costs flowing into equity and the summary
//! - Full pipeline with a mock data port and the text report

mod common;

use approx::assert_relative_eq;
use common::*;
use scalptester::adapters::text_report::TextReport;
use scalptester::cli::{run_backtest_pipeline, BacktestRequest};
use scalptester::domain::backtest::{run, NO_BARS_MESSAGE, NO_TRADES_MESSAGE};
use scalptester::domain::config::{CadenceRules, EntryRule, ExitBarPath, StrategyConfig};
use scalptester::domain::error::ScalpError;
use scalptester::domain::position::{ExitReason, Side};
use scalptester::domain::strategy::StrategyKind;

fn three_bar_scenario() -> Vec<scalptester::domain::bar::Bar> {
    minute_bars(
        at(9, 20),
        &[
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 103.0, 99.5, 102.5),
            (102.0, 103.0, 101.5, 102.8),
        ],
    )
}

/// Long entry at exactly 100 on bar 2, then a bar spanning 97..112.
fn both_levels_bars(exit_bar: (f64, f64, f64, f64)) -> Vec<scalptester::domain::bar::Bar> {
    minute_bars(
        at(10, 0),
        &[
            (98.0, 99.0, 97.0, 98.0),
            (98.0, 101.0, 97.5, 100.5),
            (100.0, 101.0, 99.5, 100.5),
            exit_bar,
        ],
    )
}

mod breakout {
    use super::*;

    #[test]
    fn three_bars_enter_next_open_and_end_of_data() {
        let config = StrategyConfig {
            target_points: 10.0,
            stoploss_points: 2.0,
            ..breakout_config()
        };
        let result = run(&three_bar_scenario(), &config, 100_000.0, 1.0).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.side, Side::Long);
        assert_eq!(trade.signal_index, Some(1));
        assert_eq!(trade.entry_index, 2);
        assert_eq!(trade.entry_time, at(9, 22));
        assert_relative_eq!(trade.entry_price, 102.0);
        assert_relative_eq!(trade.exit_price, 102.8);
        assert_eq!(trade.exit_reason, ExitReason::EndOfData);
    }

    #[test]
    fn bull_path_resolves_stop_at_level() {
        let config = StrategyConfig {
            exit_bar_path: ExitBarPath::Bull,
            ..breakout_config()
        };
        let bars = both_levels_bars((100.5, 112.0, 97.0, 105.0));
        let result = run(&bars, &config, 100_000.0, 1.0).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_relative_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_reason, ExitReason::StoplossHit);
        assert_relative_eq!(trade.exit_price, 98.0);
        assert_eq!(trade.exit_index, 3);
    }

    #[test]
    fn worst_path_resolves_stop_at_level() {
        let config = StrategyConfig {
            exit_bar_path: ExitBarPath::Worst,
            ..breakout_config()
        };
        let bars = both_levels_bars((100.5, 112.0, 97.0, 105.0));
        let trade = &run(&bars, &config, 100_000.0, 1.0).unwrap().trades[0];
        assert_eq!(trade.exit_reason, ExitReason::StoplossHit);
        assert_relative_eq!(trade.exit_price, 98.0);
    }

    #[test]
    fn bear_path_resolves_target() {
        let config = StrategyConfig {
            exit_bar_path: ExitBarPath::Bear,
            ..breakout_config()
        };
        let bars = both_levels_bars((100.5, 112.0, 97.0, 105.0));
        let trade = &run(&bars, &config, 100_000.0, 1.0).unwrap().trades[0];
        assert_eq!(trade.exit_reason, ExitReason::TargetHit);
        assert_relative_eq!(trade.exit_price, 110.0);
    }

    #[test]
    fn color_path_follows_exit_bar_candle() {
        let config = StrategyConfig {
            exit_bar_path: ExitBarPath::Color,
            ..breakout_config()
        };
        let green = both_levels_bars((100.5, 112.0, 97.0, 105.0));
        let red = both_levels_bars((105.0, 112.0, 97.0, 100.5));

        let on_green = &run(&green, &config, 100_000.0, 1.0).unwrap().trades[0];
        let on_red = &run(&red, &config, 100_000.0, 1.0).unwrap().trades[0];
        assert_eq!(on_green.exit_reason, ExitReason::StoplossHit);
        assert_eq!(on_red.exit_reason, ExitReason::TargetHit);
    }

    #[test]
    fn costs_applied_per_round_trip() {
        let config = StrategyConfig {
            brokerage_per_trade: 20.0,
            slippage_points: 0.1,
            ..breakout_config()
        };
        let result = run(&three_bar_scenario(), &config, 100_000.0, 150.0).unwrap();
        let trade = &result.trades[0];

        assert_relative_eq!(trade.gross_pnl, 120.0, epsilon = 1e-6);
        assert_relative_eq!(trade.costs, 70.0, epsilon = 1e-9);
        assert_relative_eq!(trade.net_pnl, 50.0, epsilon = 1e-6);
        assert_relative_eq!(trade.equity, 100_050.0, epsilon = 1e-6);

        let summary = result.summary.unwrap();
        assert_relative_eq!(summary.costs, 70.0, epsilon = 1e-9);
        assert_relative_eq!(summary.final_equity, 100_050.0, epsilon = 1e-6);
    }

    #[test]
    fn daily_loss_cap_resets_next_day() {
        let mut bars = minute_bars(
            at(9, 15),
            &[
                (100.0, 101.0, 99.0, 100.0),
                (100.0, 103.0, 99.5, 102.5),
                (102.0, 103.0, 101.5, 102.8),
                (102.8, 103.0, 99.0, 99.5),
                (99.5, 104.5, 99.4, 104.0),
            ],
        );
        bars.extend(minute_bars(
            date(2025, 9, 2).and_time(time(9, 15)),
            &[
                (104.0, 104.2, 103.8, 104.0),
                (104.0, 106.0, 103.9, 105.5),
                (105.5, 106.0, 105.0, 105.8),
            ],
        ));
        let config = StrategyConfig {
            daily_loss_cap: -100.0,
            ..breakout_config()
        };
        let result = run(&bars, &config, 100_000.0, 100.0).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].exit_reason, ExitReason::StoplossHit);
        assert_relative_eq!(result.trades[0].net_pnl, -200.0, epsilon = 1e-6);
        // Bar 4 breaks out but day one is already stopped.
        assert_eq!(result.trades[1].signal_index, Some(6));
        assert_eq!(result.trades[1].entry_time.date(), date(2025, 9, 2));

        assert_eq!(result.daily_stats.len(), 2);
        assert_relative_eq!(result.daily_stats[0].net_pnl, -200.0, epsilon = 1e-6);
    }

    #[test]
    fn out_of_session_signal_ignored() {
        let config = StrategyConfig {
            session_windows: vec![scalptester::domain::config::SessionWindow::new(
                time(11, 0),
                time(15, 5),
            )],
            ..breakout_config()
        };
        let result = run(&three_bar_scenario(), &config, 100_000.0, 1.0).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.message.as_deref(), Some(NO_TRADES_MESSAGE));
    }
}

mod cadence {
    use super::*;

    #[test]
    fn every_third_bar_with_disabled_stop() {
        let config = StrategyConfig {
            entry: EntryRule::Cadence(CadenceRules {
                every_n_bars: 3,
                close_at_bar_close: false,
                wait_for_exit: true,
                enter_next_open: false,
            }),
            target_points: 1.0,
            stoploss_points: 0.0,
            brokerage_per_trade: 0.0,
            slippage_points: 0.0,
            ..StrategyKind::RandomScalp.default_config()
        };
        let bars = minute_bars(
            at(9, 15),
            &[
                (100.0, 100.5, 99.5, 100.2),
                (100.2, 100.8, 99.0, 100.5),
                (100.5, 101.2, 100.3, 101.0),
                (101.0, 101.3, 100.8, 101.1),
                (101.1, 101.5, 100.0, 101.4),
            ],
        );
        let result = run(&bars, &config, 100_000.0, 1.0).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].exit_reason, ExitReason::TargetHit);
        assert_eq!(result.trades[0].exit_index, 2);
        assert_relative_eq!(result.trades[0].exit_price, 101.0);
        assert_eq!(result.trades[1].entry_index, 3);
        assert_eq!(result.trades[1].exit_reason, ExitReason::EndOfData);

        let summary = result.summary.unwrap();
        assert_relative_eq!(summary.net_pnl, 1.4, epsilon = 1e-9);
    }

    #[test]
    fn default_cadence_closes_every_bar() {
        let config = StrategyConfig {
            brokerage_per_trade: 0.0,
            slippage_points: 0.0,
            ..StrategyKind::RandomScalp.default_config()
        };
        let bars = minute_bars(
            at(9, 15),
            &[
                (100.0, 100.5, 99.5, 100.2),
                (100.2, 100.8, 99.9, 100.5),
                (100.5, 100.9, 100.3, 100.6),
            ],
        );
        let result = run(&bars, &config, 100_000.0, 1.0).unwrap();

        // Each position is held from one bar's open to the next bar's close.
        assert_eq!(result.trades.len(), 3);
        for trade in &result.trades[..2] {
            assert_eq!(trade.exit_reason, ExitReason::CloseAtBarEnd);
            assert_eq!(trade.exit_index, trade.entry_index + 1);
        }
        assert_eq!(result.trades[2].entry_index, 2);
        assert_eq!(result.trades[2].exit_reason, ExitReason::EndOfData);
    }

    #[test]
    fn live_defaults_enter_on_next_open_and_hold_to_levels() {
        let config = StrategyKind::RandomScalpLive.default_config();
        let bars = minute_bars(
            at(9, 15),
            &[
                (100.0, 100.5, 99.5, 100.2),
                (100.2, 101.0, 99.8, 100.8),
                (100.8, 102.5, 100.5, 102.3),
                (102.3, 102.6, 101.0, 101.2),
                (101.2, 101.5, 100.0, 100.4),
            ],
        );
        let result = run(&bars, &config, 100_000.0, config.effective_quantity()).unwrap();

        assert_eq!(result.trades.len(), 2);
        let first = &result.trades[0];
        assert_eq!(first.signal_index, Some(0));
        assert_eq!(first.entry_index, 1);
        assert_relative_eq!(first.entry_price, 100.2);
        assert_eq!(first.exit_reason, ExitReason::TargetHit);
        assert_relative_eq!(first.exit_price, 102.2, epsilon = 1e-9);

        let second = &result.trades[1];
        assert_eq!(second.signal_index, Some(2));
        assert_eq!(second.entry_index, 3);
        assert_eq!(second.exit_reason, ExitReason::StoplossHit);
        assert_relative_eq!(second.exit_price, 101.3, epsilon = 1e-9);

        let summary = result.summary.unwrap();
        assert_relative_eq!(summary.costs, 0.0);
        assert_relative_eq!(summary.net_pnl, 1.0, epsilon = 1e-9);
    }
}

mod pipeline {
    use super::*;

    fn request(symbol: &str) -> BacktestRequest {
        BacktestRequest {
            symbol: symbol.to_string(),
            start: date(2025, 9, 1),
            end: date(2025, 9, 30),
            starting_capital: 100_000.0,
        }
    }

    #[test]
    fn mock_port_to_text_report() {
        let port = MockDataPort::new().with_bars("NIFTY", three_bar_scenario());
        let config = StrategyConfig {
            qty_per_point: 1.0,
            ..breakout_config()
        };
        let mut out: Vec<u8> = Vec::new();
        let result = run_backtest_pipeline(
            &port,
            &TextReport::new(true),
            &config,
            &request("NIFTY"),
            &mut out,
        )
        .unwrap();

        assert_eq!(result.trades.len(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=== Summary ==="));
        assert!(text.contains("End of Data"));
        assert!(text.contains("01 Sep 2025"));
    }

    #[test]
    fn window_outside_data_reports_no_bars() {
        let port = MockDataPort::new().with_bars("NIFTY", three_bar_scenario());
        let req = BacktestRequest {
            start: date(2025, 10, 1),
            end: date(2025, 10, 31),
            ..request("NIFTY")
        };
        let mut out: Vec<u8> = Vec::new();
        let result =
            run_backtest_pipeline(&port, &TextReport::default(), &breakout_config(), &req, &mut out)
                .unwrap();

        assert!(result.summary.is_none());
        assert_eq!(result.message.as_deref(), Some(NO_BARS_MESSAGE));
        assert!(String::from_utf8(out).unwrap().contains(NO_BARS_MESSAGE));
    }

    #[test]
    fn data_port_error_propagates() {
        let port = MockDataPort::new().with_error("NIFTY", "feed offline");
        let mut out: Vec<u8> = Vec::new();
        let err = run_backtest_pipeline(
            &port,
            &TextReport::default(),
            &breakout_config(),
            &request("NIFTY"),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, ScalpError::Data { ref reason } if reason == "feed offline"));
    }

    #[test]
    fn duplicate_timestamps_rejected() {
        let mut bars = three_bar_scenario();
        bars[2].timestamp = bars[1].timestamp;
        let port = MockDataPort::new().with_bars("NIFTY", bars);
        let mut out: Vec<u8> = Vec::new();
        let err = run_backtest_pipeline(
            &port,
            &TextReport::default(),
            &breakout_config(),
            &request("NIFTY"),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, ScalpError::UnorderedBars { index: 2, .. }));
    }
}
