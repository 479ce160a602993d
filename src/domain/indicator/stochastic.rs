//! Stochastic oscillator.
//!
//! %K = 100 × (C - LowestLow(k)) / (HighestHigh(k) - LowestLow(k))
//! %D = SMA(%K, d)
//!
//! Warmup: %K undefined for the first (k-1) bars, %D for a further (d-1).
//! A window with no range (highest == lowest) gives %K = 0.

use crate::domain::indicator::rolling::{rolling_high, rolling_low};
use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn calculate_stochastic(bars: &[OhlcvBar], k_period: usize, d_period: usize) -> StochasticSeries {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_high(&highs, k_period);
    let lowest = rolling_low(&lows, k_period);

    let k: Vec<Option<f64>> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let hh = highest.get(i)?;
            let ll = lowest.get(i)?;
            let range = hh - ll;
            if range > 0.0 {
                Some(100.0 * (bar.close - ll) / range)
            } else {
                Some(0.0)
            }
        })
        .collect();

    let d = rolling_mean(&k, d_period);

    StochasticSeries {
        k: IndicatorSeries::new(IndicatorType::StochasticK { k_period }, k),
        d: IndicatorSeries::new(IndicatorType::StochasticD { k_period, d_period }, d),
    }
}
