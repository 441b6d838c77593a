#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use scalptester::domain::bar::Bar;
use scalptester::domain::config::{SessionWindow, StrategyConfig};
use scalptester::domain::error::ScalpError;
use scalptester::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ScalpError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScalpError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date() >= start && b.date() <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ScalpError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScalpError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.timestamp).min().unwrap();
                let max = bars.iter().map(|b| b.timestamp).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// 1 Sep 2025 at `h:m`.
pub fn at(h: u32, m: u32) -> NaiveDateTime {
    date(2025, 9, 1).and_time(time(h, m))
}

pub fn make_bar(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp,
        open,
        high,
        low,
        close,
        volume: 1000.0,
        open_interest: None,
    }
}

/// Bars every minute from `start`, one per `(open, high, low, close)` tuple.
pub fn minute_bars(start: NaiveDateTime, ohlc: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    ohlc.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| {
            make_bar(
                start + chrono::Duration::minutes(i as i64),
                o,
                h,
                l,
                c,
            )
        })
        .collect()
}

/// Breakout config with fast-reacting indicators, no costs and a
/// session that covers the whole trading day.
pub fn breakout_config() -> StrategyConfig {
    StrategyConfig {
        ema_fast_period: 1,
        ema_slow_period: 3,
        atr_window: 2,
        atr_min_points: 0.0,
        confirm_trend_at_entry: false,
        brokerage_per_trade: 0.0,
        slippage_points: 0.0,
        session_windows: vec![SessionWindow::new(time(9, 15), time(15, 30))],
        ..StrategyConfig::default()
    }
}

pub const NIFTY_CSV: &str = "timestamp,open,high,low,close,volume\n\
    2025-09-01 09:15:00,100.0,101.0,99.0,100.0,1000\n\
    2025-09-01 09:20:00,100.0,103.0,99.5,102.5,1200\n\
    2025-09-01 09:25:00,102.0,103.0,101.5,102.8,900\n";
