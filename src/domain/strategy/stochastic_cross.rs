//! Stochastic %K/%D crossover in the oversold/overbought zones; long only.
//!
//! Parameters: `n1` %K length, `n2` %D length, `n3` ATR length,
//! `n4` stop-loss coefficient, `n6` oversold threshold, `n7` overbought
//! threshold. There is no `n5`.

use crate::domain::error::UndefinedIndicatorAccess;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::stochastic::{calculate_stochastic, StochasticSeries};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;
use crate::domain::strategy::cross::crosses_above;
use crate::domain::strategy::{SignalStrategy, StrategyKind, current_index};

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticParams {
    pub k_period: usize,
    pub d_period: usize,
    pub atr_period: usize,
    pub stop_coeff: f64,
    pub oversold: f64,
    pub overbought: f64,
}

impl StochasticParams {
    pub fn from_set(params: &ParameterSet) -> Result<Self, ParameterError> {
        Ok(Self {
            k_period: params.period("n1")?,
            d_period: params.period("n2")?,
            atr_period: params.period("n3")?,
            stop_coeff: params.float("n4")?,
            oversold: params.float("n6")?,
            overbought: params.float("n7")?,
        })
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::StochasticD {
                k_period: self.k_period,
                d_period: self.d_period,
            },
            IndicatorType::Atr(self.atr_period),
        ]
    }
}

pub struct StochasticCrossover {
    params: StochasticParams,
    stoch: StochasticSeries,
    atr: IndicatorSeries,
}

impl StochasticCrossover {
    pub fn new(params: StochasticParams, bars: &[OhlcvBar]) -> Self {
        Self {
            stoch: calculate_stochastic(bars, params.k_period, params.d_period),
            atr: calculate_atr(bars, params.atr_period),
            params,
        }
    }
}

impl SignalStrategy for StochasticCrossover {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StochasticCrossover
    }

    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess> {
        let Some(i) = current_index(history) else {
            return Ok(None);
        };
        let k = self.stoch.k.pair(i)?;
        let d = self.stoch.d.pair(i)?;
        let atr = self.atr.at(i)?;
        let close = history[i].close;

        if side.is_flat() {
            if crosses_above(k, d) && k.1 < self.params.oversold {
                let stop = close - self.params.stop_coeff * atr;
                return Ok(Some(OrderKind::buy(Some(stop), None)));
            }
        } else if crosses_above(d, k) && k.1 > self.params.overbought {
            return Ok(Some(OrderKind::CloseAll));
        }
        Ok(None)
    }
}
