#![allow(dead_code)]

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use marketdash::domain::error::MarketdashError;
pub use marketdash::domain::fundamentals::Fundamentals;
pub use marketdash::domain::ohlcv::{HistoricalSeries, OhlcvBar};
use marketdash::domain::symbol::Symbol;
use marketdash::ports::data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub struct MockDataPort {
    pub history: HashMap<String, Vec<OhlcvBar>>,
    pub fundamentals: HashMap<String, Fundamentals>,
    pub errors: HashMap<String, String>,
    pub fundamentals_errors: HashSet<String>,
    /// Symbols in the order `fetch_history` saw them.
    pub requests: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            history: HashMap::new(),
            fundamentals: HashMap::new(),
            errors: HashMap::new(),
            fundamentals_errors: HashSet::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.history.insert(symbol.to_string(), bars);
        self
    }

    /// One bar per calendar day from 2023-06-01.
    pub fn with_closes(self, symbol: &str, closes: &[f64]) -> Self {
        let bars = make_bars(date("2023-06-01"), closes);
        self.with_bars(symbol, bars)
    }

    pub fn with_fundamentals(mut self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(symbol.to_string(), fundamentals);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_fundamentals_error(mut self, symbol: &str) -> Self {
        self.fundamentals_errors.insert(symbol.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_history(&self, symbol: &Symbol) -> Result<HistoricalSeries, MarketdashError> {
        self.requests.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol.as_str()) {
            return Err(MarketdashError::unavailable(symbol.as_str(), reason.clone()));
        }
        let bars = self.history.get(symbol.as_str()).cloned().unwrap_or_default();
        Ok(HistoricalSeries::new(symbol.as_str(), bars))
    }

    fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals, MarketdashError> {
        if self.fundamentals_errors.contains(symbol.as_str()) {
            return Err(MarketdashError::unavailable(symbol.as_str(), "quote service down"));
        }
        Ok(self
            .fundamentals
            .get(symbol.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.sheet_names()
}

/// Cell text per row; numbers are rendered with `Display`.
pub fn sheet_rows(path: &Path, name: &str) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(name).unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: date(date_str),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000,
    }
}

pub fn make_bars(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        })
        .collect()
}

/// `count` closes rising by one from 100.
pub fn rising_closes(count: usize) -> Vec<f64> {
    (0..count).map(|i| 100.0 + i as f64).collect()
}

pub fn stock_fundamentals() -> Fundamentals {
    Fundamentals {
        current_price: Some(1_650.0),
        pe_ratio: Some(19.5),
        industry_pe: Some(17.2),
        market_cap: Some(1.25e13),
        dividend_yield: Some(0.011),
        beta: Some(0.95),
    }
}

pub fn etf_fundamentals() -> Fundamentals {
    Fundamentals {
        current_price: Some(61.2),
        pe_ratio: None,
        industry_pe: None,
        market_cap: Some(1.1e11),
        dividend_yield: None,
        beta: Some(0.12),
    }
}
