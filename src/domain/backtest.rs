//! The bar walk: drives a bound strategy over a series through an execution
//! session.
//!
//! Bars are visited strictly in order and the strategy only ever sees the
//! prefix ending at the current bar.

use tracing::{debug, trace};

use crate::domain::error::ExecutionError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::order::{OrderIntent, OrderKind};
use crate::domain::position::{PositionSide, TradeRecord};
use crate::domain::strategy::SignalStrategy;
use crate::ports::execution_port::{ExecutionPort, ExecutionSession};

/// Capital and cost settings for the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
    /// Fraction of equity committed per entry.
    pub position_size: f64,
    pub allow_shorting: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000_000.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
            position_size: 0.9999,
            allow_shorting: true,
        }
    }
}

/// What an execution engine reports for one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub return_percent: f64,
    /// `None` when the run closed no trades.
    pub win_rate_percent: Option<f64>,
    /// Chronological; `None` if the engine did not keep a trade list.
    pub trades: Option<Vec<TradeRecord>>,
}

impl RunOutcome {
    pub fn from_trades(initial_capital: f64, final_equity: f64, trades: Vec<TradeRecord>) -> Self {
        let return_percent = if initial_capital != 0.0 {
            (final_equity - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };
        let win_rate_percent = (!trades.is_empty()).then(|| {
            let wins = trades.iter().filter(|t| t.is_win()).count();
            wins as f64 / trades.len() as f64 * 100.0
        });
        RunOutcome {
            initial_capital,
            final_equity,
            return_percent,
            win_rate_percent,
            trades: Some(trades),
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.as_ref().map_or(0, Vec::len)
    }
}

/// The strategy's decision at the last bar of `history`; warm-up reads
/// become "no decision".
fn signal_at(
    strategy: &dyn SignalStrategy,
    history: &[OhlcvBar],
    side: PositionSide,
) -> Option<OrderKind> {
    match strategy.on_bar(history, side) {
        Ok(order) => order,
        Err(undefined) => {
            trace!(strategy = %strategy.kind(), %undefined, "warm-up skip");
            None
        }
    }
}

/// Walks every bar through `session`, returning the intents submitted.
pub fn run_strategy(
    strategy: &dyn SignalStrategy,
    series: &BarSeries,
    session: &mut dyn ExecutionSession,
) -> Result<Vec<OrderIntent>, ExecutionError> {
    let bars = series.bars();
    let mut intents = Vec::new();

    for (index, bar) in bars.iter().enumerate() {
        session.on_bar(index, bar)?;
        let side = session.position();
        if let Some(kind) = signal_at(strategy, &bars[..=index], side) {
            let intent = OrderIntent {
                bar_index: index,
                kind,
            };
            debug!(strategy = %strategy.kind(), bar = index, order = %kind, "intent");
            session.submit(intent)?;
            intents.push(intent);
        }
    }

    Ok(intents)
}

/// One full run through a fresh session of `port`.
pub fn execute(
    strategy: &dyn SignalStrategy,
    series: &BarSeries,
    port: &dyn ExecutionPort,
) -> Result<RunOutcome, ExecutionError> {
    let mut session = port.open_session(series)?;
    run_strategy(strategy, series, session.as_mut())?;
    session.finish()
}

/// Intents emitted when each one is assumed to take effect immediately.
///
/// No fills, stops or capital: the position side is the only state. Used to
/// inspect a strategy's raw signal stream.
pub fn record_intents(strategy: &dyn SignalStrategy, series: &BarSeries) -> Vec<OrderIntent> {
    let bars = series.bars();
    let mut side = PositionSide::Flat;
    let mut intents = Vec::new();

    for index in 0..bars.len() {
        if let Some(kind) = signal_at(strategy, &bars[..=index], side) {
            side = side.apply(&kind);
            intents.push(OrderIntent {
                bar_index: index,
                kind,
            });
        }
    }

    intents
}
