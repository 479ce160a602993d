//! Bar-by-bar signal strategies.
//!
//! A strategy is bound once to a bar series (indicators are computed up
//! front), then asked for a decision at each bar given the current position
//! side. It sees only the bars up to and including the current one.
//!
//! Reading an indicator inside its warm-up prefix returns
//! `UndefinedIndicatorAccess`; the bar walk treats that as "skip this bar".

pub mod bollinger_breakout;
pub mod cross;
pub mod macd_ema;
pub mod rsi_ema_cross;
pub mod sma_cross;
pub mod sma_trend;
pub mod stochastic_cross;

use std::fmt;

use crate::domain::error::{TradeSignalError, UndefinedIndicatorAccess};
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;

use bollinger_breakout::{BollingerBandBreakout, BollingerParams};
use macd_ema::{MacdEmaCrossover, MacdEmaParams};
use rsi_ema_cross::{RsiEmaCross, RsiEmaParams};
use sma_cross::{SmaCross, SmaCrossParams};
use sma_trend::{SmaTrendFollowing, SmaTrendParams};
use stochastic_cross::{StochasticCrossover, StochasticParams};

pub trait SignalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Decision at the last bar of `history`.
    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    SmaCross,
    RsiEmaCross,
    MacdEmaCrossover,
    BollingerBandBreakout,
    SmaTrendFollowing,
    StochasticCrossover,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::SmaCross,
        StrategyKind::RsiEmaCross,
        StrategyKind::MacdEmaCrossover,
        StrategyKind::BollingerBandBreakout,
        StrategyKind::SmaTrendFollowing,
        StrategyKind::StochasticCrossover,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::SmaCross => "SmaCross",
            StrategyKind::RsiEmaCross => "RsiEmaCross",
            StrategyKind::MacdEmaCrossover => "MACDEmaCrossover",
            StrategyKind::BollingerBandBreakout => "BollingerBandBreakout",
            StrategyKind::SmaTrendFollowing => "SMATrendFollowing",
            StrategyKind::StochasticCrossover => "StochasticCrossover",
        }
    }

    /// Case-sensitive lookup by registry name.
    pub fn from_name(name: &str) -> Option<StrategyKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Indicators the strategy binds for `params`.
    pub fn indicators(&self, params: &ParameterSet) -> Result<Vec<IndicatorType>, ParameterError> {
        Ok(match self {
            StrategyKind::SmaCross => SmaCrossParams::from_set(params)?.indicators(),
            StrategyKind::RsiEmaCross => RsiEmaParams::from_set(params)?.indicators(),
            StrategyKind::MacdEmaCrossover => MacdEmaParams::from_set(params)?.indicators(),
            StrategyKind::BollingerBandBreakout => BollingerParams::from_set(params)?.indicators(),
            StrategyKind::SmaTrendFollowing => SmaTrendParams::from_set(params)?.indicators(),
            StrategyKind::StochasticCrossover => StochasticParams::from_set(params)?.indicators(),
        })
    }

    /// Largest indicator lookback for `params`.
    pub fn required_bars(&self, params: &ParameterSet) -> Result<usize, ParameterError> {
        Ok(self
            .indicators(params)?
            .iter()
            .map(IndicatorType::lookback)
            .max()
            .unwrap_or(1))
    }

    /// Validates `params`, checks the series is long enough and computes the
    /// indicator bindings.
    pub fn bind(
        &self,
        params: &ParameterSet,
        series: &BarSeries,
    ) -> Result<Box<dyn SignalStrategy>, TradeSignalError> {
        series.require(self.required_bars(params)?)?;
        let bars = series.bars();

        let strategy: Box<dyn SignalStrategy> = match self {
            StrategyKind::SmaCross => Box::new(SmaCross::new(SmaCrossParams::from_set(params)?, bars)),
            StrategyKind::RsiEmaCross => {
                Box::new(RsiEmaCross::new(RsiEmaParams::from_set(params)?, bars))
            }
            StrategyKind::MacdEmaCrossover => {
                Box::new(MacdEmaCrossover::new(MacdEmaParams::from_set(params)?, bars))
            }
            StrategyKind::BollingerBandBreakout => {
                Box::new(BollingerBandBreakout::new(BollingerParams::from_set(params)?, bars))
            }
            StrategyKind::SmaTrendFollowing => {
                Box::new(SmaTrendFollowing::new(SmaTrendParams::from_set(params)?, bars))
            }
            StrategyKind::StochasticCrossover => {
                Box::new(StochasticCrossover::new(StochasticParams::from_set(params)?, bars))
            }
        };
        Ok(strategy)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Index of the current (last) bar; `None` for an empty history.
pub(crate) fn current_index(history: &[OhlcvBar]) -> Option<usize> {
    history.len().checked_sub(1)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, NaiveDate};

    use crate::domain::indicator::{IndicatorSeries, IndicatorType};
    use crate::domain::ohlcv::OhlcvBar;

    /// Daily bars with high/low one unit around the close.
    pub fn bars(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    pub fn series(indicator_type: IndicatorType, values: &[Option<f64>]) -> IndicatorSeries {
        IndicatorSeries::new(indicator_type, values.to_vec())
    }
}
