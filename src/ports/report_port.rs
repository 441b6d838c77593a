//! Report generation port.

use crate::domain::backtest::BacktestResult;
use crate::domain::config::StrategyConfig;
use crate::domain::error::ScalpError;
use std::io::Write;

/// Port for rendering a backtest result.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        config: &StrategyConfig,
        out: &mut dyn Write,
    ) -> Result<(), ScalpError>;
}
