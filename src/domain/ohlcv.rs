//! Daily bars and the per-symbol historical series.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Daily closes for one symbol, oldest first.
#[derive(Debug, Clone)]
pub struct HistoricalSeries {
    pub symbol: String,
    bars: Vec<OhlcvBar>,
}

impl HistoricalSeries {
    /// Sorts by date and drops bars whose close is not a finite number.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<OhlcvBar>) -> Self {
        bars.retain(|b| b.close.is_finite());
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn latest(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// Close `sessions` trading sessions before the latest one.
    pub fn close_sessions_ago(&self, sessions: usize) -> Option<f64> {
        let idx = self.bars.len().checked_sub(sessions + 1)?;
        Some(self.bars[idx].close)
    }

    /// First close dated in `year`.
    pub fn first_close_in_year(&self, year: i32) -> Option<f64> {
        self.bars
            .iter()
            .find(|b| b.date.year() == year)
            .map(|b| b.close)
    }
}
