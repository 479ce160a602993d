//! Average True Range.
//!
//! TR[0] = high - low, TR[i] = max(high - low, |high - C[i-1]|, |low - C[i-1]|).
//! ATR(n) is the trailing simple mean of TR over n bars.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let true_ranges: Vec<Option<f64>> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            Some(if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            })
        })
        .collect();

    IndicatorSeries::new(IndicatorType::Atr(period), rolling_mean(&true_ranges, period))
}
