//! Fast/slow SMA crossover, long and short.
//!
//! Parameters: `n1` fast SMA, `n2` slow SMA, `n3` ATR length,
//! `n4` stop-loss coefficient (multiples of ATR).

use crate::domain::error::UndefinedIndicatorAccess;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;
use crate::domain::strategy::cross::{crosses_above, crosses_below};
use crate::domain::strategy::{SignalStrategy, StrategyKind, closes, current_index};

#[derive(Debug, Clone, PartialEq)]
pub struct SmaCrossParams {
    pub fast: usize,
    pub slow: usize,
    pub atr_period: usize,
    pub stop_coeff: f64,
}

impl SmaCrossParams {
    pub fn from_set(params: &ParameterSet) -> Result<Self, ParameterError> {
        Ok(Self {
            fast: params.period("n1")?,
            slow: params.period("n2")?,
            atr_period: params.period("n3")?,
            stop_coeff: params.float("n4")?,
        })
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.fast),
            IndicatorType::Sma(self.slow),
            IndicatorType::Atr(self.atr_period),
        ]
    }
}

pub struct SmaCross {
    params: SmaCrossParams,
    fast: IndicatorSeries,
    slow: IndicatorSeries,
    atr: IndicatorSeries,
}

impl SmaCross {
    pub fn new(params: SmaCrossParams, bars: &[OhlcvBar]) -> Self {
        let closes = closes(bars);
        Self {
            fast: calculate_sma(&closes, params.fast),
            slow: calculate_sma(&closes, params.slow),
            atr: calculate_atr(bars, params.atr_period),
            params,
        }
    }
}

impl SignalStrategy for SmaCross {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SmaCross
    }

    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess> {
        let Some(i) = current_index(history) else {
            return Ok(None);
        };
        let fast = self.fast.pair(i)?;
        let slow = self.slow.pair(i)?;
        let atr = self.atr.at(i)?;
        let close = history[i].close;
        let offset = self.params.stop_coeff * atr;

        // An entry already held in the same direction is left alone.
        if crosses_above(fast, slow) && !side.is_long() {
            return Ok(Some(OrderKind::buy(Some(close - offset), None)));
        }
        if crosses_below(fast, slow) && !side.is_short() {
            return Ok(Some(OrderKind::sell(Some(close + offset), None)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::{bars, series};

    fn strategy(fast: &[Option<f64>], slow: &[Option<f64>]) -> SmaCross {
        SmaCross {
            params: SmaCrossParams {
                fast: 2,
                slow: 3,
                atr_period: 2,
                stop_coeff: 2.0,
            },
            fast: series(IndicatorType::Sma(2), fast),
            slow: series(IndicatorType::Sma(3), slow),
            atr: series(IndicatorType::Atr(2), &[Some(1.5); 4]),
        }
    }

    #[test]
    fn cross_up_buys_with_stop_below() {
        let s = strategy(&[None, Some(9.0), Some(11.0)], &[None, Some(10.0), Some(10.0)]);
        let history = bars(&[100.0, 101.0, 102.0]);

        let order = s.on_bar(&history, PositionSide::Flat).unwrap();
        assert_eq!(order, Some(OrderKind::buy(Some(99.0), None)));

        // Short positions are reversed by the same buy.
        let order = s.on_bar(&history, PositionSide::Short).unwrap();
        assert_eq!(order, Some(OrderKind::buy(Some(99.0), None)));
    }

    #[test]
    fn cross_down_sells_with_stop_above() {
        let s = strategy(&[None, Some(11.0), Some(9.0)], &[None, Some(10.0), Some(10.0)]);
        let history = bars(&[100.0, 101.0, 102.0]);

        let order = s.on_bar(&history, PositionSide::Long).unwrap();
        assert_eq!(order, Some(OrderKind::sell(Some(105.0), None)));
    }

    #[test]
    fn no_double_entry() {
        let s = strategy(&[None, Some(9.0), Some(11.0)], &[None, Some(10.0), Some(10.0)]);
        let history = bars(&[100.0, 101.0, 102.0]);
        assert_eq!(s.on_bar(&history, PositionSide::Long).unwrap(), None);
    }

    #[test]
    fn touching_is_not_crossing() {
        let s = strategy(&[None, Some(10.0), Some(11.0)], &[None, Some(10.0), Some(10.0)]);
        let history = bars(&[100.0, 101.0, 102.0]);
        assert_eq!(s.on_bar(&history, PositionSide::Flat).unwrap(), None);
    }

    #[test]
    fn warmup_is_reported() {
        let s = strategy(&[None, Some(9.0), Some(11.0)], &[None, Some(10.0), Some(10.0)]);
        let history = bars(&[100.0, 101.0]);
        let err = s.on_bar(&history, PositionSide::Flat).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.indicator, "SMA(2)");
    }
}
