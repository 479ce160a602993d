//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{defined, rolling_mean, IndicatorSeries, IndicatorType};

pub fn calculate_sma(values: &[f64], period: usize) -> IndicatorSeries {
    IndicatorSeries::new(
        IndicatorType::Sma(period),
        rolling_mean(&defined(values), period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warmup() {
        let series = calculate_sma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(series.len(), 5);
        assert_eq!(series.warmup(), 2);
    }

    #[test]
    fn sma_values() {
        let series = calculate_sma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(series.get(2), Some(20.0));
        assert_eq!(series.get(3), Some(30.0));
        assert_eq!(series.get(4), Some(40.0));
    }

    #[test]
    fn sma_constant_series() {
        let series = calculate_sma(&[7.5; 10], 4);
        for i in 3..10 {
            assert!((series.at(i).unwrap() - 7.5).abs() < 1e-12);
        }
    }

    #[test]
    fn sma_period_longer_than_input() {
        let series = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn sma_indicator_type() {
        let series = calculate_sma(&[1.0], 5);
        assert_eq!(series.indicator_type, IndicatorType::Sma(5));
    }
}
