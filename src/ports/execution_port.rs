//! Bar-execution engine port.
//!
//! The core emits order intents; an execution engine applies them to
//! capital, tracks the open position and produces the trade list. One
//! session is opened per strategy run and is never shared between runs.

use crate::domain::backtest::RunOutcome;
use crate::domain::error::ExecutionError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::order::OrderIntent;
use crate::domain::position::PositionSide;

pub trait ExecutionPort: Sync {
    fn open_session(&self, series: &BarSeries) -> Result<Box<dyn ExecutionSession>, ExecutionError>;
}

pub trait ExecutionSession: Send {
    /// Advances to bar `index`. Called once per bar, in order, before the
    /// strategy is consulted for that bar.
    fn on_bar(&mut self, index: usize, bar: &OhlcvBar) -> Result<(), ExecutionError>;

    /// Position side as of the current bar.
    fn position(&self) -> PositionSide;

    fn submit(&mut self, intent: OrderIntent) -> Result<(), ExecutionError>;

    /// Closes out the run and reports equity and trades.
    fn finish(self: Box<Self>) -> Result<RunOutcome, ExecutionError>;
}
