//! CSV file data adapter.
//!
//! Expects a header row naming `timestamp` (or `date`), `open`, `high`,
//! `low`, `close` and `volume`, in any order and any case. Rows with an
//! empty cell in one of those columns are dropped.

use crate::domain::error::TradeSignalError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn column_positions(headers: &csv::StringRecord) -> Result<[usize; 6], TradeSignalError> {
        let mut positions = [0usize; 6];
        for (slot, name) in positions.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| {
                    let h = h.trim().to_ascii_lowercase();
                    h == name || (name == "timestamp" && h == "date")
                })
                .ok_or_else(|| TradeSignalError::InvalidSeries {
                    reason: format!("missing {} column", name),
                })?;
        }
        Ok(positions)
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TradeSignalError> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TradeSignalError::InvalidSeries {
            reason: format!("invalid timestamp '{}'", value),
        })
}

fn parse_price(value: &str, column: &str) -> Result<f64, TradeSignalError> {
    value
        .parse()
        .map_err(|e| TradeSignalError::InvalidSeries {
            reason: format!("invalid {} value '{}': {}", column, value, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<BarSeries, TradeSignalError> {
        let content = fs::read_to_string(&self.path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| TradeSignalError::InvalidSeries {
                reason: format!("CSV parse error: {}", e),
            })?
            .clone();
        let positions = Self::column_positions(&headers)?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| TradeSignalError::InvalidSeries {
                reason: format!("CSV parse error: {}", e),
            })?;

            let cells: Vec<&str> = positions
                .iter()
                .map(|&p| record.get(p).map(str::trim).unwrap_or(""))
                .collect();
            if cells.iter().any(|c| c.is_empty()) {
                dropped += 1;
                continue;
            }

            bars.push(OhlcvBar {
                timestamp: parse_timestamp(cells[0])?,
                open: parse_price(cells[1], "open")?,
                high: parse_price(cells[2], "high")?,
                low: parse_price(cells[3], "low")?,
                close: parse_price(cells[4], "close")?,
                volume: parse_price(cells[5], "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(
            path = %self.path.display(),
            symbol,
            bars = bars.len(),
            dropped,
            "loaded bars"
        );
        BarSeries::new(symbol, bars)
    }
}
