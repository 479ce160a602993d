//! Position state and completed round-trip trades.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::order::OrderKind;

/// Direction of the single position a strategy run may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionSide {
    pub fn is_flat(&self) -> bool {
        *self == PositionSide::Flat
    }

    pub fn is_long(&self) -> bool {
        *self == PositionSide::Long
    }

    pub fn is_short(&self) -> bool {
        *self == PositionSide::Short
    }

    /// The side after `order` is applied. An entry against an opposite
    /// position reverses it.
    pub fn apply(self, order: &OrderKind) -> PositionSide {
        match order {
            OrderKind::Buy { .. } => PositionSide::Long,
            OrderKind::Sell { .. } => PositionSide::Short,
            OrderKind::CloseAll => PositionSide::Flat,
        }
    }
}

/// One completed round trip, as produced by the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub side: PositionSide,
    pub quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}
