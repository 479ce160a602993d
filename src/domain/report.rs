//! Result extraction: reshapes the two optimization winners into the report
//! layout consumed by clients.
//!
//! Trades are column-oriented (one array per field), in chronological order.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::error::TradeSignalError;
use crate::domain::optimizer::{OptimizationOutcome, OptimizationResult};
use crate::domain::parameters::ParameterSet;
use crate::domain::position::TradeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    #[serde(rename = "Strategy")]
    pub strategy: String,
    #[serde(rename = "results_best_returns")]
    pub best_returns: ResultSummary,
    #[serde(rename = "results_best_winrate")]
    pub best_win_rate: ResultSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    #[serde(rename = "Parameters")]
    pub parameters: ParameterSet,
    /// `null` when the run closed no trades.
    #[serde(rename = "Win Rate %")]
    pub win_rate_percent: Option<f64>,
    #[serde(rename = "Return %")]
    pub return_percent: f64,
    #[serde(rename = "Trades")]
    pub trades: TradeColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeColumns {
    #[serde(rename = "EntryPrice")]
    pub entry_price: Vec<f64>,
    #[serde(rename = "ExitPrice")]
    pub exit_price: Vec<f64>,
    #[serde(rename = "Profit&Loss")]
    pub pnl: Vec<f64>,
    #[serde(rename = "EntryTime")]
    pub entry_time: Vec<NaiveDateTime>,
    #[serde(rename = "ExitTime")]
    pub exit_time: Vec<NaiveDateTime>,
}

impl TradeColumns {
    pub fn len(&self) -> usize {
        self.pnl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pnl.is_empty()
    }
}

impl From<&[TradeRecord]> for TradeColumns {
    fn from(trades: &[TradeRecord]) -> Self {
        let mut columns = TradeColumns::default();
        for trade in trades {
            columns.entry_price.push(trade.entry_price);
            columns.exit_price.push(trade.exit_price);
            columns.pnl.push(trade.pnl);
            columns.entry_time.push(trade.entry_time);
            columns.exit_time.push(trade.exit_time);
        }
        columns
    }
}

fn summarize(result: &OptimizationResult) -> Result<ResultSummary, TradeSignalError> {
    let trades = result
        .outcome
        .trades
        .as_deref()
        .ok_or_else(|| TradeSignalError::MissingTrades {
            objective: result.objective.to_string(),
        })?;

    Ok(ResultSummary {
        parameters: result.parameters.clone(),
        win_rate_percent: result.outcome.win_rate_percent,
        return_percent: result.outcome.return_percent,
        trades: TradeColumns::from(trades),
    })
}

/// Fails with `MissingTrades` if either winner carries no trade list.
pub fn prepare_report(outcome: &OptimizationOutcome) -> Result<BacktestReport, TradeSignalError> {
    Ok(BacktestReport {
        strategy: outcome.strategy.to_string(),
        best_returns: summarize(&outcome.best_by_equity)?,
        best_win_rate: summarize(&outcome.best_by_win_rate)?,
    })
}
