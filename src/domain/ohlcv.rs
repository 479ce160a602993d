//! OHLCV bar representation and validated bar series.

use chrono::NaiveDateTime;

use crate::domain::error::TradeSignalError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= self.low
    }
}

/// An ordered, immutable bar sequence with strictly increasing timestamps.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, TradeSignalError> {
        if bars.is_empty() {
            return Err(TradeSignalError::InvalidSeries {
                reason: "empty bar sequence".into(),
            });
        }

        if let Some((i, bar)) = bars.iter().enumerate().find(|(_, b)| !b.is_well_formed()) {
            return Err(TradeSignalError::InvalidSeries {
                reason: format!("malformed bar {} at {}", i, bar.timestamp),
            });
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(TradeSignalError::InvalidSeries {
                reason: format!(
                    "timestamp {} does not follow {}",
                    pair[1].timestamp, pair[0].timestamp
                ),
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Fails with `InsufficientData` when the series holds fewer than `minimum` bars.
    pub fn require(&self, minimum: usize) -> Result<(), TradeSignalError> {
        if self.bars.len() < minimum {
            return Err(TradeSignalError::InsufficientData {
                symbol: self.symbol.clone(),
                bars: self.bars.len(),
                minimum,
            });
        }
        Ok(())
    }
}
