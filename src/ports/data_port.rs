//! Intraday bar data port.

use crate::domain::bar::Bar;
use crate::domain::error::ScalpError;
use chrono::{NaiveDate, NaiveDateTime};

pub trait DataPort {
    /// Bars for `symbol` whose date falls in `start..=end`, sorted by timestamp.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ScalpError>;

    /// First timestamp, last timestamp and bar count, or `None` if empty.
    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ScalpError>;
}
