//! Trailing highest / lowest value over a fixed window.
//!
//! Warmup: first (window-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn rolling_high(values: &[f64], window: usize) -> IndicatorSeries {
    IndicatorSeries::new(
        IndicatorType::RollingHigh(window),
        rolling_extreme(values, window, f64::max),
    )
}

pub fn rolling_low(values: &[f64], window: usize) -> IndicatorSeries {
    IndicatorSeries::new(
        IndicatorType::RollingLow(window),
        rolling_extreme(values, window, f64::min),
    )
}

fn rolling_extreme(values: &[f64], window: usize, pick: fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i].iter().copied().reduce(pick)
        })
        .collect()
}
