//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded from the first defined MACD value
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: line undefined for max(fast, slow) - 1 bars, signal for a further signal - 1.

use crate::domain::indicator::ema::{calculate_ema, ema_of};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
}

pub fn calculate_macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let ema_fast = calculate_ema(values, fast);
    let ema_slow = calculate_ema(values, slow);

    let line: Vec<Option<f64>> = ema_fast
        .values
        .iter()
        .zip(&ema_slow.values)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal = ema_of(&line, signal_period);

    MacdSeries {
        line: IndicatorSeries::new(IndicatorType::MacdLine { fast, slow }, line),
        signal: IndicatorSeries::new(
            IndicatorType::MacdSignal {
                fast,
                slow,
                signal: signal_period,
            },
            signal,
        ),
    }
}
