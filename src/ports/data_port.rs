//! Bar retrieval port trait.

use crate::domain::error::TradeSignalError;
use crate::domain::ohlcv::BarSeries;

pub trait DataPort {
    /// Loads the full bar series for `symbol`, validated and in time order.
    fn fetch_bars(&self, symbol: &str) -> Result<BarSeries, TradeSignalError>;
}
