//! MACD/signal crossover with an EMA trend filter; long only.
//!
//! Parameters: `n1`/`n2`/`n3` MACD fast, slow and signal lengths, `n4`
//! trend EMA length, `n5` ATR length, `n6` stop-loss coefficient.

use crate::domain::error::UndefinedIndicatorAccess;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::macd::{calculate_macd, MacdSeries};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;
use crate::domain::strategy::cross::{crosses_above, crosses_below};
use crate::domain::strategy::{SignalStrategy, StrategyKind, closes, current_index};

#[derive(Debug, Clone, PartialEq)]
pub struct MacdEmaParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub trend_ema: usize,
    pub atr_period: usize,
    pub stop_coeff: f64,
}

impl MacdEmaParams {
    pub fn from_set(params: &ParameterSet) -> Result<Self, ParameterError> {
        Ok(Self {
            fast: params.period("n1")?,
            slow: params.period("n2")?,
            signal: params.period("n3")?,
            trend_ema: params.period("n4")?,
            atr_period: params.period("n5")?,
            stop_coeff: params.float("n6")?,
        })
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::MacdSignal {
                fast: self.fast,
                slow: self.slow,
                signal: self.signal,
            },
            IndicatorType::Ema(self.trend_ema),
            IndicatorType::Atr(self.atr_period),
        ]
    }
}

pub struct MacdEmaCrossover {
    params: MacdEmaParams,
    macd: MacdSeries,
    trend: IndicatorSeries,
    atr: IndicatorSeries,
}

impl MacdEmaCrossover {
    pub fn new(params: MacdEmaParams, bars: &[OhlcvBar]) -> Self {
        let closes = closes(bars);
        Self {
            macd: calculate_macd(&closes, params.fast, params.slow, params.signal),
            trend: calculate_ema(&closes, params.trend_ema),
            atr: calculate_atr(bars, params.atr_period),
            params,
        }
    }
}

impl SignalStrategy for MacdEmaCrossover {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MacdEmaCrossover
    }

    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess> {
        let Some(i) = current_index(history) else {
            return Ok(None);
        };
        let line = self.macd.line.pair(i)?;
        let signal = self.macd.signal.pair(i)?;
        let trend = self.trend.at(i)?;
        let atr = self.atr.at(i)?;
        let close = history[i].close;

        if crosses_above(line, signal) && close > trend && !side.is_long() {
            let stop = close - self.params.stop_coeff * atr;
            return Ok(Some(OrderKind::buy(Some(stop), None)));
        }
        if (crosses_below(line, signal) || close < trend) && side.is_long() {
            return Ok(Some(OrderKind::CloseAll));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::{bars, series};

    fn strategy(line: [f64; 2], signal: [f64; 2], trend: f64) -> MacdEmaCrossover {
        let line_type = IndicatorType::MacdLine { fast: 3, slow: 6 };
        let signal_type = IndicatorType::MacdSignal {
            fast: 3,
            slow: 6,
            signal: 2,
        };
        MacdEmaCrossover {
            params: MacdEmaParams {
                fast: 3,
                slow: 6,
                signal: 2,
                trend_ema: 10,
                atr_period: 3,
                stop_coeff: 3.0,
            },
            macd: MacdSeries {
                line: series(line_type, &[Some(line[0]), Some(line[1])]),
                signal: series(signal_type, &[Some(signal[0]), Some(signal[1])]),
            },
            trend: series(IndicatorType::Ema(10), &[Some(trend); 2]),
            atr: series(IndicatorType::Atr(3), &[Some(1.0); 2]),
        }
    }

    #[test]
    fn cross_above_in_uptrend_buys() {
        let s = strategy([-0.5, 0.5], [0.0, 0.0], 95.0);
        let history = bars(&[99.0, 100.0]);
        assert_eq!(
            s.on_bar(&history, PositionSide::Flat).unwrap(),
            Some(OrderKind::buy(Some(97.0), None))
        );
    }

    #[test]
    fn cross_above_below_trend_ignored() {
        let s = strategy([-0.5, 0.5], [0.0, 0.0], 105.0);
        let history = bars(&[99.0, 100.0]);
        assert_eq!(s.on_bar(&history, PositionSide::Flat).unwrap(), None);
    }

    #[test]
    fn cross_below_closes_long() {
        let s = strategy([0.5, -0.5], [0.0, 0.0], 95.0);
        let history = bars(&[99.0, 100.0]);
        assert_eq!(
            s.on_bar(&history, PositionSide::Long).unwrap(),
            Some(OrderKind::CloseAll)
        );
        assert_eq!(s.on_bar(&history, PositionSide::Flat).unwrap(), None);
    }

    #[test]
    fn falling_under_trend_closes_long() {
        let s = strategy([0.5, 0.6], [0.0, 0.0], 101.0);
        let history = bars(&[99.0, 100.0]);
        assert_eq!(
            s.on_bar(&history, PositionSide::Long).unwrap(),
            Some(OrderKind::CloseAll)
        );
    }

    #[test]
    fn indicators_use_own_trend_length() {
        let params = MacdEmaParams {
            fast: 12,
            slow: 26,
            signal: 9,
            trend_ema: 200,
            atr_period: 14,
            stop_coeff: 2.0,
        };
        let lookbacks: Vec<usize> = params.indicators().iter().map(|t| t.lookback()).collect();
        assert_eq!(lookbacks, vec![34, 200, 14]);
    }
}
