//! Bollinger band reversal breakout, long and short, with ATR stop and target.
//!
//! Parameters: `n1` band length, `n2` band width in standard deviations,
//! `n3` RSI length, `n4` ATR length, `n5` stop-loss coefficient, `n6`
//! take-profit coefficient, `n7` RSI low threshold, `n8` RSI high threshold,
//! `n9` minimum bandwidth.

use crate::domain::error::UndefinedIndicatorAccess;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::{calculate_bollinger, stddev_mult_x100, BollingerBands};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::OrderKind;
use crate::domain::parameters::{ParameterError, ParameterSet};
use crate::domain::position::PositionSide;
use crate::domain::strategy::{SignalStrategy, StrategyKind, closes, current_index};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerParams {
    pub band_period: usize,
    pub band_stddev: f64,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub stop_coeff: f64,
    pub target_coeff: f64,
    pub rsi_low: f64,
    pub rsi_high: f64,
    pub min_bandwidth: f64,
}

impl BollingerParams {
    pub fn from_set(params: &ParameterSet) -> Result<Self, ParameterError> {
        Ok(Self {
            band_period: params.period("n1")?,
            band_stddev: params.float("n2")?,
            rsi_period: params.period("n3")?,
            atr_period: params.period("n4")?,
            stop_coeff: params.float("n5")?,
            target_coeff: params.float("n6")?,
            rsi_low: params.float("n7")?,
            rsi_high: params.float("n8")?,
            min_bandwidth: params.float("n9")?,
        })
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::BollingerWidth {
                period: self.band_period,
                stddev_mult_x100: stddev_mult_x100(self.band_stddev),
            },
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Atr(self.atr_period),
        ]
    }
}

pub struct BollingerBandBreakout {
    params: BollingerParams,
    bands: BollingerBands,
    width: IndicatorSeries,
    rsi: IndicatorSeries,
    atr: IndicatorSeries,
}

impl BollingerBandBreakout {
    pub fn new(params: BollingerParams, bars: &[OhlcvBar]) -> Self {
        let closes = closes(bars);
        let bands = calculate_bollinger(
            &closes,
            params.band_period,
            params.band_stddev,
        );
        Self {
            width: bands.bandwidth(),
            bands,
            rsi: calculate_rsi(&closes, params.rsi_period),
            atr: calculate_atr(bars, params.atr_period),
            params,
        }
    }
}

impl SignalStrategy for BollingerBandBreakout {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BollingerBandBreakout
    }

    fn on_bar(
        &self,
        history: &[OhlcvBar],
        side: PositionSide,
    ) -> Result<Option<OrderKind>, UndefinedIndicatorAccess> {
        let Some(i) = current_index(history) else {
            return Ok(None);
        };
        let (prev_lower, _) = self.bands.lower.pair(i)?;
        let (prev_upper, _) = self.bands.upper.pair(i)?;
        let (prev_rsi, _) = self.rsi.pair(i)?;
        let width = self.width.at(i)?;
        let atr = self.atr.at(i)?;

        let p = &self.params;
        let prev = &history[i - 1];
        let close = history[i].close;
        let wide = width > p.min_bandwidth;

        if prev.close < prev_lower && prev_rsi < p.rsi_low && close > prev.high && wide {
            if side.is_long() {
                return Ok(None);
            }
            return Ok(Some(OrderKind::buy(
                Some(close - p.stop_coeff * atr),
                Some(close + p.target_coeff * atr),
            )));
        }
        if prev.close > prev_upper && prev_rsi > p.rsi_high && close < prev.low && wide {
            if side.is_short() {
                return Ok(None);
            }
            return Ok(Some(OrderKind::sell(
                Some(close + p.stop_coeff * atr),
                Some(close - p.target_coeff * atr),
            )));
        }
        Ok(None)
    }
}
