//! Reference bar-execution engine.
//!
//! Market orders submitted on bar `i` fill at the open of bar `i + 1`.
//! Orders submitted on the final bar never fill; a position still open at
//! the end is closed at the last close. One position at a time; an entry
//! against an opposite position reverses it.

pub mod fills;
pub mod portfolio;

use tracing::{debug, trace};

use crate::domain::backtest::{BacktestConfig, RunOutcome};
use crate::domain::error::ExecutionError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::order::{OrderIntent, OrderKind};
use crate::domain::position::PositionSide;
use crate::ports::execution_port::{ExecutionPort, ExecutionSession};

use fills::check_trigger;
use portfolio::{Account, EntryResult};

#[derive(Debug, Clone)]
pub struct BarSimulator {
    config: BacktestConfig,
}

impl BarSimulator {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }
}

impl ExecutionPort for BarSimulator {
    fn open_session(&self, _series: &BarSeries) -> Result<Box<dyn ExecutionSession>, ExecutionError> {
        Ok(Box::new(SimulatorSession::new(self.config.clone())))
    }
}

pub struct SimulatorSession {
    config: BacktestConfig,
    account: Account,
    pending: Option<OrderIntent>,
    last_bar: Option<OhlcvBar>,
    next_index: usize,
}

impl SimulatorSession {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            account: Account::new(config.initial_capital),
            config,
            pending: None,
            last_bar: None,
            next_index: 0,
        }
    }

    fn fill(&mut self, intent: OrderIntent, bar: &OhlcvBar) {
        let (side, levels) = match intent.kind {
            OrderKind::CloseAll => {
                self.account.exit(bar.open, bar.timestamp, &self.config);
                return;
            }
            OrderKind::Buy {
                stop_loss,
                take_profit,
            } => (PositionSide::Long, (stop_loss, take_profit)),
            OrderKind::Sell {
                stop_loss,
                take_profit,
            } => (PositionSide::Short, (stop_loss, take_profit)),
        };

        if !self.account.side().is_flat() {
            self.account.exit(bar.open, bar.timestamp, &self.config);
        }
        if side.is_short() && !self.config.allow_shorting {
            trace!(bar = intent.bar_index, "short entry ignored, shorting disabled");
            return;
        }

        let result = self
            .account
            .enter(side, bar.open, bar.timestamp, levels, &self.config);
        if result == EntryResult::InsufficientCapital {
            debug!(bar = intent.bar_index, price = bar.open, "entry skipped, insufficient capital");
        }
    }

    fn check_protective_levels(&mut self, bar: &OhlcvBar) {
        let trigger = self
            .account
            .position
            .as_ref()
            .and_then(|p| check_trigger(p.side, p.stop_loss, p.take_profit, bar));
        if let Some(trigger) = trigger {
            trace!(?trigger, time = %bar.timestamp, "protective exit");
            self.account.exit(trigger.price(), bar.timestamp, &self.config);
        }
    }
}

impl ExecutionSession for SimulatorSession {
    fn on_bar(&mut self, index: usize, bar: &OhlcvBar) -> Result<(), ExecutionError> {
        if index != self.next_index {
            return Err(ExecutionError::new(format!(
                "bar {} delivered out of order, expected {}",
                index, self.next_index
            )));
        }
        self.next_index += 1;

        if let Some(intent) = self.pending.take() {
            self.fill(intent, bar);
        }
        self.check_protective_levels(bar);
        self.last_bar = Some(bar.clone());
        Ok(())
    }

    fn position(&self) -> PositionSide {
        self.account.side()
    }

    fn submit(&mut self, intent: OrderIntent) -> Result<(), ExecutionError> {
        if self.pending.is_some() {
            return Err(ExecutionError::new(format!(
                "second order submitted on bar {}",
                intent.bar_index
            )));
        }
        let doubles = match intent.kind {
            OrderKind::Buy { .. } => self.account.side().is_long(),
            OrderKind::Sell { .. } => self.account.side().is_short(),
            OrderKind::CloseAll => false,
        };
        if doubles {
            return Err(ExecutionError::new(format!(
                "{} on bar {} would add to the open {:?} position",
                intent.kind,
                intent.bar_index,
                self.account.side()
            )));
        }
        self.pending = Some(intent);
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<RunOutcome, ExecutionError> {
        if let Some(intent) = self.pending.take() {
            trace!(bar = intent.bar_index, order = %intent.kind, "order on final bar dropped");
        }
        if let Some(bar) = self.last_bar.take() {
            self.account.exit(bar.close, bar.timestamp, &self.config);
        }

        let account = self.account;
        Ok(RunOutcome::from_trades(
            account.initial_capital,
            account.cash,
            account.trades,
        ))
    }
}
