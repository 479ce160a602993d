//! Cash and single-position bookkeeping for one simulated run.

use chrono::NaiveDateTime;

use crate::domain::backtest::BacktestConfig;
use crate::domain::position::{PositionSide, TradeRecord};

use super::fills::{commission, entry_price, exit_price};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub side: PositionSide,
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_commission: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl OpenPosition {
    /// Value returned to cash if closed at `price` (before exit costs).
    /// Shorts escrow their entry notional and settle the difference.
    pub fn market_value(&self, price: f64) -> f64 {
        let qty = self.quantity as f64;
        match self.side {
            PositionSide::Short => qty * (2.0 * self.entry_price - price),
            _ => qty * price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<OpenPosition>,
    pub trades: Vec<TradeRecord>,
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { quantity: i64, fill_price: f64 },
    InsufficientCapital,
}

impl Account {
    pub fn new(initial_capital: f64) -> Self {
        Account {
            cash: initial_capital,
            initial_capital,
            position: None,
            trades: Vec::new(),
        }
    }

    pub fn side(&self) -> PositionSide {
        self.position.as_ref().map_or(PositionSide::Flat, |p| p.side)
    }

    pub fn equity(&self, mark: f64) -> f64 {
        self.cash + self.position.as_ref().map_or(0.0, |p| p.market_value(mark))
    }

    /// Opens a position sized as a fraction of current equity. The account
    /// must be flat.
    pub fn enter(
        &mut self,
        side: PositionSide,
        market_price: f64,
        time: NaiveDateTime,
        (stop_loss, take_profit): (Option<f64>, Option<f64>),
        config: &BacktestConfig,
    ) -> EntryResult {
        let commission_pct = config.commission_pct;
        let fill_price = entry_price(side, market_price, config.slippage_pct);
        if fill_price <= 0.0 {
            return EntryResult::InsufficientCapital;
        }

        let unit_cost = fill_price * (1.0 + commission_pct / 100.0);
        let quantity = (self.cash * config.position_size / unit_cost).floor() as i64;
        if quantity <= 0 {
            return EntryResult::InsufficientCapital;
        }

        let cost = quantity as f64 * fill_price;
        let entry_commission = commission(cost, commission_pct);
        if cost + entry_commission > self.cash {
            return EntryResult::InsufficientCapital;
        }

        self.cash -= cost + entry_commission;
        self.position = Some(OpenPosition {
            side,
            quantity,
            entry_price: fill_price,
            entry_time: time,
            entry_commission,
            stop_loss,
            take_profit,
        });

        EntryResult::Entered {
            quantity,
            fill_price,
        }
    }

    /// Closes the open position at `market_price`, recording the trade.
    /// Returns `None` when flat.
    pub fn exit(
        &mut self,
        market_price: f64,
        time: NaiveDateTime,
        config: &BacktestConfig,
    ) -> Option<&TradeRecord> {
        let position = self.position.take()?;
        let fill_price = exit_price(position.side, market_price, config.slippage_pct);
        let qty = position.quantity as f64;
        let exit_commission = commission(qty * fill_price, config.commission_pct);

        let direction = if position.side == PositionSide::Short { -1.0 } else { 1.0 };
        let pnl = direction * qty * (fill_price - position.entry_price)
            - position.entry_commission
            - exit_commission;

        self.cash += position.market_value(fill_price) - exit_commission;
        self.trades.push(TradeRecord {
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price: fill_price,
            pnl,
            entry_time: position.entry_time,
            exit_time: time,
        });
        self.trades.last()
    }
}
