//! Market data access port trait.

use crate::domain::error::MarketdashError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::HistoricalSeries;
use crate::domain::symbol::Symbol;

pub trait MarketDataPort {
    /// Daily history for `symbol`, oldest first.
    fn fetch_history(&self, symbol: &Symbol) -> Result<HistoricalSeries, MarketdashError>;

    fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals, MarketdashError>;
}
