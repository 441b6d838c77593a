//! Intraday OHLCV bar.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::ScalpError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_interest: Option<f64>,
}

impl Bar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// Close at or above open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Inclusive range check against this bar's low/high.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

/// Reject a series whose timestamps are not strictly increasing.
pub fn ensure_ordered(bars: &[Bar]) -> Result<(), ScalpError> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(ScalpError::UnorderedBars {
                index: i + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

/// True when `index` is the final bar of its calendar date (or of the series).
pub fn is_last_bar_of_day(bars: &[Bar], index: usize) -> bool {
    match bars.get(index + 1) {
        Some(next) => next.date() != bars[index].date(),
        None => true,
    }
}
