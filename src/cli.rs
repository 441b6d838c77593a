//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::TextReport;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config::{
    parse_hhmm, CadenceRules, EntryRule, ExitBarPath, SessionWindow, StrategyConfig,
    TradeDirection,
};
use crate::domain::config_validation::{parse_date, validate_all};
use crate::domain::error::ScalpError;
use crate::domain::strategy::StrategyKind;
use crate::logging::LogFormat;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_STARTING_CAPITAL: f64 = 100_000.0;

#[derive(Parser, Debug)]
#[command(name = "scalptester", about = "Intraday scalping strategy backtester")]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV file or directory of <SYMBOL>.csv files; overrides [backtest] data_file
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Overrides [strategy] name
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        /// Print the trade ledger
        #[arg(long)]
        trades: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List registered strategies and their parameters
    Strategies,
    /// Show the data range of a bar file
    Info {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Everything the pipeline needs besides the strategy itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub starting_capital: f64,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            symbol,
            trades,
        } => run_backtest(
            &config,
            data.as_deref(),
            strategy.as_deref(),
            symbol.as_deref(),
            trades,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Strategies => run_strategies(),
        Command::Info { data, symbol } => run_info(&data, symbol.as_deref()),
    }
}

fn fail(err: ScalpError) -> ExitCode {
    error!("{err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    strategy_override: Option<&str>,
    symbol_override: Option<&str>,
    show_trades: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    info!(config = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        return fail(e);
    }

    // Stage 2: Resolve strategy and build its config
    let kind = match resolve_strategy_kind(strategy_override, &adapter) {
        Ok(k) => k,
        Err(e) => return fail(e),
    };
    let strategy_config = match build_strategy_config(&adapter, kind) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    info!(strategy = %kind, "strategy loaded");

    // Stage 3: Resolve data source and window
    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let request = match build_request(symbol_override, &data_path, &adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let data_port = CsvAdapter::new(data_path);

    // Stage 4: Run and report
    let report = TextReport::new(show_trades);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_backtest_pipeline(&data_port, &report, &strategy_config, &request, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

/// Fetch bars, run the engine and render the report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    config: &StrategyConfig,
    request: &BacktestRequest,
    out: &mut dyn Write,
) -> Result<BacktestResult, ScalpError> {
    let bars = data_port.fetch_bars(&request.symbol, request.start, request.end)?;
    info!(symbol = %request.symbol, bars = bars.len(), "bars loaded");

    let result = backtest_engine::run(
        &bars,
        config,
        request.starting_capital,
        config.effective_quantity(),
    )?;

    report.write(&result, config, out)?;
    Ok(result)
}

pub fn resolve_strategy_kind(
    name_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<StrategyKind, ScalpError> {
    match name_override
        .map(str::to_string)
        .or_else(|| config.get_string("strategy", "name"))
    {
        Some(name) => StrategyKind::from_str(&name),
        None => Ok(StrategyKind::ScalpWithTrend),
    }
}

fn parse_key<T>(config: &dyn ConfigPort, section: &str, key: &str, default: T) -> Result<T, ScalpError>
where
    T: FromStr<Err = String>,
{
    match config.get_string(section, key) {
        Some(raw) => T::from_str(&raw).map_err(|reason| ScalpError::invalid(section, key, reason)),
        None => Ok(default),
    }
}

fn get_usize(config: &dyn ConfigPort, key: &str, default: usize) -> usize {
    let value = config.get_int("strategy", key, default as i64);
    usize::try_from(value).unwrap_or(default)
}

fn parse_sessions(
    config: &dyn ConfigPort,
    default: Vec<SessionWindow>,
) -> Result<Vec<SessionWindow>, ScalpError> {
    match config.get_list("session", "windows") {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(|raw| {
                SessionWindow::from_str(raw)
                    .map_err(|reason| ScalpError::invalid("session", "windows", reason))
            })
            .collect(),
        _ => Ok(default),
    }
}

/// Build the engine config for `kind`, applying defaults for every
/// missing key.
pub fn build_strategy_config(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<StrategyConfig, ScalpError> {
    let defaults = kind.default_config();

    let entry = match kind.default_entry() {
        EntryRule::Breakout => EntryRule::Breakout,
        EntryRule::Cadence(rules) => EntryRule::Cadence(CadenceRules {
            every_n_bars: get_usize(config, "trade_every_n_bars", rules.every_n_bars),
            close_at_bar_close: config.get_bool(
                "strategy",
                "close_at_bar_close",
                rules.close_at_bar_close,
            ),
            wait_for_exit: config.get_bool("strategy", "wait_for_exit", rules.wait_for_exit),
            enter_next_open: rules.enter_next_open,
        }),
    };

    let square_off_time = match config.get_string("session", "square_off_time") {
        Some(raw) => parse_hhmm(&raw)
            .map_err(|reason| ScalpError::invalid("session", "square_off_time", reason))?,
        None => defaults.square_off_time,
    };

    Ok(StrategyConfig {
        entry,
        target_points: config.get_double("strategy", "target_points", defaults.target_points),
        stoploss_points: config.get_double("strategy", "stoploss_points", defaults.stoploss_points),
        ema_fast_period: get_usize(config, "ema_fast", defaults.ema_fast_period),
        ema_slow_period: get_usize(config, "ema_slow", defaults.ema_slow_period),
        atr_window: get_usize(config, "atr_window", defaults.atr_window),
        atr_min_points: config.get_double("strategy", "atr_min_points", defaults.atr_min_points),
        daily_loss_cap: config.get_double("strategy", "daily_loss_cap", defaults.daily_loss_cap),
        exit_bar_path: parse_key::<ExitBarPath>(
            config,
            "strategy",
            "exit_bar_path",
            defaults.exit_bar_path,
        )?,
        trade_direction: parse_key::<TradeDirection>(
            config,
            "strategy",
            "trade_direction",
            defaults.trade_direction,
        )?,
        confirm_trend_at_entry: config.get_bool(
            "strategy",
            "confirm_trend_at_entry",
            defaults.confirm_trend_at_entry,
        ),
        enable_eod_square_off: config.get_bool(
            "strategy",
            "enable_eod_square_off",
            defaults.enable_eod_square_off,
        ),
        square_off_time,
        session_windows: parse_sessions(config, defaults.session_windows)?,
        brokerage_per_trade: config.get_double(
            "backtest",
            "brokerage_per_trade",
            defaults.brokerage_per_trade,
        ),
        slippage_points: config.get_double("backtest", "slippage_points", defaults.slippage_points),
        qty_per_point: config.get_double("backtest", "qty_per_point", defaults.qty_per_point),
        quantity_multiplier: config.get_double(
            "strategy",
            "quantity_multiplier",
            defaults.quantity_multiplier,
        ),
    })
}

pub fn resolve_data_path(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, ScalpError> {
    if let Some(path) = data_override {
        return Ok(path.to_path_buf());
    }
    config
        .get_string("backtest", "data_file")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ScalpError::ConfigMissing {
            section: "backtest".into(),
            key: "data_file".into(),
        })
}

/// Symbol from the override, then `[backtest] symbol`, then the data file stem.
pub fn resolve_symbol(symbol_override: Option<&str>, data_path: &Path, config: &dyn ConfigPort) -> String {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            data_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_uppercase())
        })
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

pub fn build_request(
    symbol_override: Option<&str>,
    data_path: &Path,
    config: &dyn ConfigPort,
) -> Result<BacktestRequest, ScalpError> {
    let start = parse_date(config.get_string("backtest", "start").as_deref(), "start")?;
    let end = parse_date(config.get_string("backtest", "end").as_deref(), "end")?;
    Ok(BacktestRequest {
        symbol: resolve_symbol(symbol_override, data_path, config),
        start: start.unwrap_or(NaiveDate::MIN),
        end: end.unwrap_or(NaiveDate::MAX),
        starting_capital: config.get_double("backtest", "starting_capital", DEFAULT_STARTING_CAPITAL),
    })
}

fn run_validate(config_path: &Path) -> ExitCode {
    info!(config = %config_path.display(), "validating config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        return fail(e);
    }
    let kind = match resolve_strategy_kind(None, &adapter) {
        Ok(k) => k,
        Err(e) => return fail(e),
    };
    let config = match build_strategy_config(&adapter, kind) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let windows: Vec<String> = config.session_windows.iter().map(|w| w.to_string()).collect();
    println!("Strategy:  {} ({})", kind.title(), kind.name());
    println!(
        "Levels:    target {:.2} pts, stop {:.2} pts",
        config.target_points, config.stoploss_points
    );
    println!("Sessions:  {}", windows.join(", "));
    println!("Quantity:  {}", config.effective_quantity());
    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    for kind in StrategyKind::ALL {
        println!("{} - {}", kind.name(), kind.title());
        println!("  {}", kind.description());
        for p in kind.parameters() {
            println!("    {:<24} default {:<8} {}", p.name, p.default, p.constraint);
        }
        println!();
    }
    ExitCode::SUCCESS
}

fn run_info(data_path: &Path, symbol: Option<&str>) -> ExitCode {
    let symbol = symbol
        .map(|s| s.trim().to_uppercase())
        .or_else(|| {
            data_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_uppercase())
        })
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let adapter = CsvAdapter::new(data_path.to_path_buf());
    match adapter.data_range(&symbol) {
        Ok(Some((first, last, count))) => {
            println!("{symbol}: {count} bars, {first} to {last}");
            ExitCode::SUCCESS
        }
        Ok(None) => fail(ScalpError::NoData { symbol }),
        Err(e) => fail(e),
    }
}
