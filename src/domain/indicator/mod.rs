//! Technical indicator implementations.
//!
//! Every indicator is a pure function of its input series. Outputs are
//! index-aligned with the input: same length, with a leading run of `None`
//! (the warm-up prefix) of exactly `lookback - 1` entries.
//!
//! - `IndicatorType`: indicator identity + parameters (label and lookback)
//! - `IndicatorSeries`: an aligned series of optional values

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub(crate) mod stddev;
pub mod stochastic;

use std::fmt;

use crate::domain::error::UndefinedIndicatorAccess;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    RollingHigh(usize),
    RollingLow(usize),
    MacdLine {
        fast: usize,
        slow: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BollingerLower {
        period: usize,
        stddev_mult_x100: u32,
    },
    BollingerMiddle {
        period: usize,
    },
    BollingerUpper {
        period: usize,
        stddev_mult_x100: u32,
    },
    BollingerWidth {
        period: usize,
        stddev_mult_x100: u32,
    },
    StochasticK {
        k_period: usize,
    },
    StochasticD {
        k_period: usize,
        d_period: usize,
    },
}

impl IndicatorType {
    /// Minimum number of bars needed before the first defined output.
    pub fn lookback(&self) -> usize {
        match self {
            IndicatorType::Sma(n)
            | IndicatorType::Ema(n)
            | IndicatorType::Atr(n)
            | IndicatorType::RollingHigh(n)
            | IndicatorType::RollingLow(n) => *n,
            IndicatorType::Rsi(n) => n + 1,
            IndicatorType::MacdLine { fast, slow } => *fast.max(slow),
            IndicatorType::MacdSignal { fast, slow, signal } => fast.max(slow) + signal - 1,
            IndicatorType::BollingerLower { period, .. }
            | IndicatorType::BollingerMiddle { period }
            | IndicatorType::BollingerUpper { period, .. }
            | IndicatorType::BollingerWidth { period, .. } => *period,
            IndicatorType::StochasticK { k_period } => *k_period,
            IndicatorType::StochasticD { k_period, d_period } => k_period + d_period - 1,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::RollingHigh(window) => write!(f, "HIGHEST({})", window),
            IndicatorType::RollingLow(window) => write!(f, "LOWEST({})", window),
            IndicatorType::MacdLine { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::BollingerLower {
                period,
                stddev_mult_x100,
            } => write!(f, "BB_LOWER({},{})", period, mult(*stddev_mult_x100)),
            IndicatorType::BollingerMiddle { period } => write!(f, "BB_MIDDLE({})", period),
            IndicatorType::BollingerUpper {
                period,
                stddev_mult_x100,
            } => write!(f, "BB_UPPER({},{})", period, mult(*stddev_mult_x100)),
            IndicatorType::BollingerWidth {
                period,
                stddev_mult_x100,
            } => write!(f, "BB_WIDTH({},{})", period, mult(*stddev_mult_x100)),
            IndicatorType::StochasticK { k_period } => write!(f, "STOCH_K({})", k_period),
            IndicatorType::StochasticD { k_period, d_period } => {
                write!(f, "STOCH_D({},{})", k_period, d_period)
            }
        }
    }
}

fn mult(stddev_mult_x100: u32) -> f64 {
    stddev_mult_x100 as f64 / 100.0
}

/// An indicator output aligned 1:1 by index with the bar sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(indicator_type: IndicatorType, values: Vec<Option<f64>>) -> Self {
        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Value at `index`, or `UndefinedIndicatorAccess` inside the warm-up
    /// prefix (or past the end of the series).
    pub fn at(&self, index: usize) -> Result<f64, UndefinedIndicatorAccess> {
        self.get(index).ok_or_else(|| UndefinedIndicatorAccess {
            indicator: self.indicator_type.to_string(),
            index,
        })
    }

    /// Values at `index - 1` and `index`.
    pub fn pair(&self, index: usize) -> Result<(f64, f64), UndefinedIndicatorAccess> {
        let prev = index.checked_sub(1).ok_or_else(|| UndefinedIndicatorAccess {
            indicator: self.indicator_type.to_string(),
            index,
        })?;
        Ok((self.at(prev)?, self.at(index)?))
    }

    /// Length of the leading undefined run.
    pub fn warmup(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }
}

/// Trailing mean over `period` entries; `None` while the window holds any
/// undefined entry.
pub(crate) fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let sum = window.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))?;
            Some(sum / period as f64)
        })
        .collect()
}

pub(crate) fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| Some(v)).collect()
}
