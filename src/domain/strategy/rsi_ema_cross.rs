//! RSI momentum entry filtered by two EMAs; long only.
//!
//! Parameters: `n1` fast EMA, `n2` slow EMA, `n3` RSI length, `n4` ATR
//! length, `n5` stop-loss coefficient.

use crate::domain::error::UndefinedIndicatorAccess;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;
use crate::domain::strategy::cross::crosses_above_level;
use crate::domain::strategy::{SignalStrategy, StrategyKind, closes, current_index};

/// RSI level whose upward crossing triggers an entry.
pub const RSI_ENTRY_LEVEL: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiEmaParams {
    pub fast_ema: usize,
    pub slow_ema: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub stop_coeff: f64,
}

impl RsiEmaParams {
    pub fn from_set(params: &ParameterSet) -> Result<Self, ParameterError> {
        Ok(Self {
            fast_ema: params.period("n1")?,
            slow_ema: params.period("n2")?,
            rsi_period: params.period("n3")?,
            atr_period: params.period("n4")?,
            stop_coeff: params.float("n5")?,
        })
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.fast_ema),
            IndicatorType::Ema(self.slow_ema),
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Atr(self.atr_period),
        ]
    }
}

pub struct RsiEmaCross {
    params: RsiEmaParams,
    fast_ema: IndicatorSeries,
    slow_ema: IndicatorSeries,
    rsi: IndicatorSeries,
    atr: IndicatorSeries,
}

impl RsiEmaCross {
    pub fn new(params: RsiEmaParams, bars: &[OhlcvBar]) -> Self {
        let closes = closes(bars);
        Self {
            fast_ema: calculate_ema(&closes, params.fast_ema),
            slow_ema: calculate_ema(&closes, params.slow_ema),
            rsi: calculate_rsi(&closes, params.rsi_period),
            atr: calculate_atr(bars, params.atr_period),
            params,
        }
    }
}

impl SignalStrategy for RsiEmaCross {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RsiEmaCross
    }

    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess> {
        let Some(i) = current_index(history) else {
            return Ok(None);
        };
        let fast = self.fast_ema.at(i)?;
        let slow = self.slow_ema.at(i)?;
        let rsi = self.rsi.pair(i)?;
        let atr = self.atr.at(i)?;
        let close = history[i].close;

        if close > fast && close > slow {
            if crosses_above_level(rsi, RSI_ENTRY_LEVEL) && !side.is_long() {
                let stop = close - self.params.stop_coeff * atr;
                return Ok(Some(OrderKind::buy(Some(stop), None)));
            }
        } else if (close < slow || close < fast) && side.is_long() {
            return Ok(Some(OrderKind::CloseAll));
        }
        Ok(None)
    }
}
