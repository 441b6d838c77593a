//! Configuration range validation.
//!
//! Runs before a `StrategyConfig` is built. The engine itself accepts any
//! value; these checks catch typos and out-of-range settings up front.

use crate::domain::config::{parse_hhmm, ExitBarPath, SessionWindow, TradeDirection};
use crate::domain::error::ScalpError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    validate_starting_capital(config)?;
    validate_non_negative(config, "backtest", "brokerage_per_trade")?;
    validate_non_negative(config, "backtest", "slippage_points")?;
    validate_positive(config, "backtest", "qty_per_point")?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    validate_strategy_name(config)?;
    validate_positive(config, "strategy", "target_points")?;
    validate_non_negative(config, "strategy", "stoploss_points")?;
    validate_int_range(config, "ema_fast", 1, 200)?;
    validate_int_range(config, "ema_slow", 1, 200)?;
    validate_int_range(config, "atr_window", 1, 100)?;
    validate_non_negative(config, "strategy", "atr_min_points")?;
    validate_loss_cap(config)?;
    validate_positive(config, "strategy", "quantity_multiplier")?;
    validate_int_range(config, "trade_every_n_bars", 1, 1000)?;
    validate_parsed::<ExitBarPath>(config, "strategy", "exit_bar_path")?;
    validate_parsed::<TradeDirection>(config, "strategy", "trade_direction")?;
    Ok(())
}

pub fn validate_session_config(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    if let Some(windows) = config.get_list("session", "windows") {
        if windows.is_empty() {
            return Err(ScalpError::invalid(
                "session",
                "windows",
                "at least one session window is required",
            ));
        }
        for raw in &windows {
            let window = SessionWindow::from_str(raw)
                .map_err(|reason| ScalpError::invalid("session", "windows", reason))?;
            if window.start >= window.end {
                return Err(ScalpError::invalid(
                    "session",
                    "windows",
                    format!("window {window} must start before it ends"),
                ));
            }
        }
    }

    if let Some(raw) = config.get_string("session", "square_off_time") {
        parse_hhmm(&raw).map_err(|reason| ScalpError::invalid("session", "square_off_time", reason))?;
    }
    Ok(())
}

/// All three sections, in file order.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    validate_session_config(config)
}

fn validate_starting_capital(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    let value = config.get_double("backtest", "starting_capital", 100_000.0);
    if value <= 0.0 {
        return Err(ScalpError::invalid(
            "backtest",
            "starting_capital",
            "starting_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), ScalpError> {
    let value = config.get_double(section, key, 1.0);
    if value <= 0.0 {
        return Err(ScalpError::invalid(
            section,
            key,
            format!("{key} must be positive"),
        ));
    }
    Ok(())
}

fn validate_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), ScalpError> {
    let value = config.get_double(section, key, 0.0);
    if value < 0.0 {
        return Err(ScalpError::invalid(
            section,
            key,
            format!("{key} must be non-negative"),
        ));
    }
    Ok(())
}

fn validate_int_range(
    config: &dyn ConfigPort,
    key: &str,
    min: i64,
    max: i64,
) -> Result<(), ScalpError> {
    let value = config.get_int("strategy", key, min);
    if value < min || value > max {
        return Err(ScalpError::invalid(
            "strategy",
            key,
            format!("{key} must be between {min} and {max}"),
        ));
    }
    Ok(())
}

fn validate_loss_cap(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    let value = config.get_double("strategy", "daily_loss_cap", -1000.0);
    if value > 0.0 {
        return Err(ScalpError::invalid(
            "strategy",
            "daily_loss_cap",
            "daily_loss_cap must be zero or negative",
        ));
    }
    Ok(())
}

fn validate_parsed<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), ScalpError>
where
    T: FromStr<Err = String>,
{
    match config.get_string(section, key) {
        Some(raw) => T::from_str(&raw)
            .map(|_| ())
            .map_err(|reason| ScalpError::invalid(section, key, reason)),
        None => Ok(()),
    }
}

fn validate_strategy_name(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    match config.get_string("strategy", "name") {
        Some(name) => StrategyKind::from_str(&name).map(|_| ()),
        None => Ok(()),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ScalpError> {
    let start = parse_date(config.get_string("backtest", "start").as_deref(), "start")?;
    let end = parse_date(config.get_string("backtest", "end").as_deref(), "end")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ScalpError::invalid(
                "backtest",
                "start",
                "start must not be after end",
            ));
        }
    }
    Ok(())
}

/// Missing dates are allowed and mean an open-ended window.
pub fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ScalpError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ScalpError::invalid(
                    "backtest",
                    field,
                    format!("invalid {field} format, expected YYYY-MM-DD"),
                )
            }),
    }
}
