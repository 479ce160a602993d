//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! Bandwidth = (Upper - Lower) / Middle.
//!
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::stddev::rolling_stddev;
use crate::domain::indicator::{defined, rolling_mean, IndicatorSeries, IndicatorType};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub period: usize,
    pub multiplier: f64,
    pub lower: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
}

impl BollingerBands {
    /// (upper - lower) / middle; undefined where the middle band is zero.
    pub fn bandwidth(&self) -> IndicatorSeries {
        let values = (0..self.middle.len())
            .map(|i| {
                let upper = self.upper.get(i)?;
                let lower = self.lower.get(i)?;
                let middle = self.middle.get(i)?;
                (middle != 0.0).then(|| (upper - lower) / middle)
            })
            .collect();

        IndicatorSeries::new(
            IndicatorType::BollingerWidth {
                period: self.period,
                stddev_mult_x100: stddev_mult_x100(self.multiplier),
            },
            values,
        )
    }
}

pub fn calculate_bollinger(values: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let label = stddev_mult_x100(multiplier);
    let middle = rolling_mean(&defined(values), period);
    let stddev = rolling_stddev(values, period);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, s)| Some((*m)? + sign * multiplier * (*s)?))
            .collect()
    };

    BollingerBands {
        period,
        multiplier,
        lower: IndicatorSeries::new(
            IndicatorType::BollingerLower {
                period,
                stddev_mult_x100: label,
            },
            band(-1.0),
        ),
        upper: IndicatorSeries::new(
            IndicatorType::BollingerUpper {
                period,
                stddev_mult_x100: label,
            },
            band(1.0),
        ),
        middle: IndicatorSeries::new(IndicatorType::BollingerMiddle { period }, middle),
    }
}

/// Hundredths form of a multiplier, used only to label the band series.
pub fn stddev_mult_x100(multiplier: f64) -> u32 {
    (multiplier * 100.0).round().max(0.0) as u32
}
