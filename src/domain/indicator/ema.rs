//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first available value (no bias adjustment),
//! then EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! Warmup: the first (n-1) outputs after the seed are undefined.

use crate::domain::indicator::{defined, IndicatorSeries, IndicatorType};

pub fn calculate_ema(values: &[f64], period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Ema(period), ema_of(&defined(values), period))
}

/// EMA over a series that may itself carry a warm-up prefix. The recursion
/// starts at the first defined input.
pub(crate) fn ema_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(|v| v.is_some()) else {
        return out;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;

    for (i, value) in values.iter().enumerate().skip(start) {
        let Some(v) = *value else {
            continue;
        };
        let next = match ema {
            None => v,
            Some(prev) => v * k + prev * (1.0 - k),
        };
        ema = Some(next);
        if i + 1 >= start + period {
            out[i] = Some(next);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(series.get(0).is_none());
        assert!(series.get(1).is_none());
        assert!(series.get(2).is_some());
        assert!(series.get(4).is_some());
    }

    #[test]
    fn ema_period_1() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(series.values, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn ema_seeded_from_first_value() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 0.5;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);
        assert!((series.at(2).unwrap() - e2).abs() < 1e-12);
        assert!((series.at(3).unwrap() - e3).abs() < 1e-12);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&[100.0; 5], 3);
        for i in 2..5 {
            assert!((series.at(i).unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_of_offset_input() {
        let out = ema_of(&[None, None, Some(4.0), Some(4.0), Some(4.0)], 2);
        assert_eq!(out, vec![None, None, None, Some(4.0), Some(4.0)]);
    }

    #[test]
    fn ema_period_0() {
        let series = calculate_ema(&[10.0, 20.0], 0);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn ema_smoothing_factor() {
        let period = 10;
        let k = 2.0 / (period as f64 + 1.0);
        assert!((k - 2.0 / 11.0).abs() < f64::EPSILON);
    }
}
