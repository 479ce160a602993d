//! Price vs. SMA trend following; long only, no stops.
//!
//! Parameter: `n1` SMA length.

use crate::domain::error::UndefinedIndicatorAccess;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;
use crate::domain::strategy::{SignalStrategy, StrategyKind, closes, current_index};

#[derive(Debug, Clone, PartialEq)]
pub struct SmaTrendParams {
    pub period: usize,
}

impl SmaTrendParams {
    pub fn from_set(params: &ParameterSet) -> Result<Self, ParameterError> {
        Ok(Self {
            period: params.period("n1")?,
        })
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Sma(self.period)]
    }
}

pub struct SmaTrendFollowing {
    sma: IndicatorSeries,
}

impl SmaTrendFollowing {
    pub fn new(params: SmaTrendParams, bars: &[OhlcvBar]) -> Self {
        Self {
            sma: calculate_sma(&closes(bars), params.period),
        }
    }
}

impl SignalStrategy for SmaTrendFollowing {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SmaTrendFollowing
    }

    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess> {
        let Some(i) = current_index(history) else {
            return Ok(None);
        };
        let sma = self.sma.at(i)?;
        let close = history[i].close;

        if side.is_flat() && close > sma {
            Ok(Some(OrderKind::buy(None, None)))
        } else if !side.is_flat() && close < sma {
            Ok(Some(OrderKind::CloseAll))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::bars;

    #[test]
    fn enters_on_first_defined_bar_above_sma() {
        let history = bars(&[10.0, 11.0, 12.0, 13.0]);
        let s = SmaTrendFollowing::new(SmaTrendParams { period: 3 }, &history);

        assert!(s.on_bar(&history[..2], PositionSide::Flat).is_err());
        assert_eq!(
            s.on_bar(&history[..3], PositionSide::Flat).unwrap(),
            Some(OrderKind::buy(None, None))
        );
        assert_eq!(s.on_bar(&history[..4], PositionSide::Long).unwrap(), None);
    }

    #[test]
    fn exits_below_sma() {
        let history = bars(&[10.0, 11.0, 12.0, 8.0]);
        let s = SmaTrendFollowing::new(SmaTrendParams { period: 3 }, &history);
        assert_eq!(
            s.on_bar(&history, PositionSide::Long).unwrap(),
            Some(OrderKind::CloseAll)
        );
        assert_eq!(s.on_bar(&history, PositionSide::Flat).unwrap(), None);
    }

    #[test]
    fn close_equal_to_sma_holds() {
        let history = bars(&[10.0, 10.0, 10.0]);
        let s = SmaTrendFollowing::new(SmaTrendParams { period: 3 }, &history);
        assert_eq!(s.on_bar(&history, PositionSide::Flat).unwrap(), None);
        assert_eq!(s.on_bar(&history, PositionSide::Long).unwrap(), None);
    }
}
