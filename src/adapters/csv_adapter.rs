//! CSV intraday bar adapter.
//!
//! Expects a header row followed by
//! `timestamp,open,high,low,close,volume[,oi]`. The adapter points either at
//! a single file, or at a directory holding one `<SYMBOL>.csv` per symbol.

use crate::domain::bar::Bar;
use crate::domain::error::ScalpError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{symbol}.csv"))
        } else {
            self.path.clone()
        }
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<Bar>, ScalpError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ScalpError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let mut bars = parse_bars(&content, &path)?;
        bars.sort_by_key(|b| b.timestamp);
        debug!(path = %path.display(), bars = bars.len(), "loaded csv");
        Ok(bars)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn field<'a>(record: &'a csv::StringRecord, index: usize, name: &str, line: u64) -> Result<&'a str, ScalpError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| ScalpError::Data {
            reason: format!("line {line}: missing {name} column"),
        })
}

fn number(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<f64, ScalpError> {
    let raw = field(record, index, name, line)?;
    raw.parse().map_err(|e| ScalpError::Data {
        reason: format!("line {line}: invalid {name} value '{raw}': {e}"),
    })
}

fn parse_bars(content: &str, path: &Path) -> Result<Vec<Bar>, ScalpError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| ScalpError::Data {
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        })?;
        let line = record.position().map_or(0, |p| p.line());

        let raw_ts = field(&record, 0, "timestamp", line)?;
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| ScalpError::Data {
            reason: format!("line {line}: invalid timestamp '{raw_ts}'"),
        })?;

        let open_interest = match record.get(6).map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(number(&record, 6, "oi", line)?),
            _ => None,
        };

        bars.push(Bar {
            timestamp,
            open: number(&record, 1, "open", line)?,
            high: number(&record, 2, "high", line)?,
            low: number(&record, 3, "low", line)?,
            close: number(&record, 4, "close", line)?,
            volume: number(&record, 5, "volume", line)?,
            open_interest,
        });
    }

    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ScalpError> {
        let bars: Vec<Bar> = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date() >= start && b.date() <= end)
            .collect();
        Ok(bars)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ScalpError> {
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}
