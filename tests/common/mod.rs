#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tradesignal::domain::backtest::RunOutcome;
use tradesignal::domain::error::{ExecutionError, TradeSignalError};
pub use tradesignal::domain::ohlcv::{BarSeries, OhlcvBar};
use tradesignal::domain::order::OrderIntent;
use tradesignal::domain::position::PositionSide;
use tradesignal::domain::report::BacktestReport;
use tradesignal::ports::data_port::DataPort;
use tradesignal::ports::execution_port::{ExecutionPort, ExecutionSession};
use tradesignal::ports::report_port::ReportPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<BarSeries, TradeSignalError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradeSignalError::InvalidSeries {
                reason: reason.clone(),
            });
        }
        BarSeries::new(symbol, self.data.get(symbol).cloned().unwrap_or_default())
    }
}

/// Captures the last report instead of writing it.
#[derive(Default)]
pub struct CapturingReportPort {
    pub written: RefCell<Option<(BacktestReport, Option<PathBuf>)>>,
}

impl ReportPort for CapturingReportPort {
    fn write(
        &self,
        report: &BacktestReport,
        output_path: Option<&Path>,
    ) -> Result<(), TradeSignalError> {
        *self.written.borrow_mut() = Some((report.clone(), output_path.map(Path::to_path_buf)));
        Ok(())
    }
}

/// Execution port whose sessions always fail.
pub struct FailingEngine;

impl ExecutionPort for FailingEngine {
    fn open_session(
        &self,
        _series: &BarSeries,
    ) -> Result<Box<dyn ExecutionSession>, ExecutionError> {
        Ok(Box::new(FailingSession))
    }
}

struct FailingSession;

impl ExecutionSession for FailingSession {
    fn on_bar(&mut self, index: usize, _bar: &OhlcvBar) -> Result<(), ExecutionError> {
        Err(ExecutionError::new(format!("engine rejected bar {}", index)))
    }

    fn position(&self) -> PositionSide {
        PositionSide::Flat
    }

    fn submit(&mut self, _intent: OrderIntent) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RunOutcome, ExecutionError> {
        Err(ExecutionError::new("session never completed"))
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Daily bar with open = close and a one-point range either side.
pub fn make_bar(day: usize, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: start_time() + Duration::days(day as i64),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

/// close[i] = start + step * i
pub fn linear_closes(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Smooth oscillation around `base`, enough to trigger crossovers.
pub fn wave_closes(n: usize, base: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            base + amplitude * (2.0 * std::f64::consts::PI * x / period).sin() + 0.05 * x
        })
        .collect()
}

pub fn series(symbol: &str, closes: &[f64]) -> BarSeries {
    BarSeries::new(symbol, bars_from_closes(closes)).unwrap()
}

pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
