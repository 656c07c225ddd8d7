//! CSV file market data adapter.
//!
//! Offline provider: `{dir}/{SYMBOL}.csv` holds `date,open,high,low,close,volume`
//! rows; an optional `{dir}/fundamentals.csv` holds one row per symbol with
//! `symbol,price,pe_ratio,industry_pe,market_cap,dividend_yield,beta`.
//! Blank fundamentals cells are missing values.

use crate::domain::error::MarketdashError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::{HistoricalSeries, OhlcvBar};
use crate::domain::symbol::Symbol;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn history_path(&self, symbol: &Symbol) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.as_str()))
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    symbol: &Symbol,
) -> Result<&'r str, MarketdashError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| MarketdashError::unavailable(symbol.as_str(), format!("missing {name} column")))
}

fn number(value: &str, name: &str, symbol: &Symbol) -> Result<f64, MarketdashError> {
    value.parse().map_err(|e| {
        MarketdashError::unavailable(symbol.as_str(), format!("invalid {name} value: {e}"))
    })
}

fn optional_number(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

impl MarketDataPort for CsvAdapter {
    fn fetch_history(&self, symbol: &Symbol) -> Result<HistoricalSeries, MarketdashError> {
        let path = self.history_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            MarketdashError::unavailable(
                symbol.as_str(),
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| {
                MarketdashError::unavailable(symbol.as_str(), format!("CSV parse error: {e}"))
            })?;

            let date_str = field(&record, 0, "date", symbol)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                MarketdashError::unavailable(symbol.as_str(), format!("invalid date format: {e}"))
            })?;

            bars.push(OhlcvBar {
                date,
                open: number(field(&record, 1, "open", symbol)?, "open", symbol)?,
                high: number(field(&record, 2, "high", symbol)?, "high", symbol)?,
                low: number(field(&record, 3, "low", symbol)?, "low", symbol)?,
                close: number(field(&record, 4, "close", symbol)?, "close", symbol)?,
                volume: field(&record, 5, "volume", symbol)?.parse().unwrap_or(0),
            });
        }

        Ok(HistoricalSeries::new(symbol.as_str(), bars))
    }

    fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals, MarketdashError> {
        let path = self.base_path.join(FUNDAMENTALS_FILE);
        if !path.exists() {
            return Ok(Fundamentals::empty());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| {
            MarketdashError::unavailable(
                symbol.as_str(),
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        for result in rdr.records() {
            let record = result.map_err(|e| {
                MarketdashError::unavailable(symbol.as_str(), format!("CSV parse error: {e}"))
            })?;
            let matches = record
                .get(0)
                .is_some_and(|s| s.trim().eq_ignore_ascii_case(symbol.as_str()));
            if !matches {
                continue;
            }
            return Ok(Fundamentals {
                current_price: optional_number(record.get(1)),
                pe_ratio: optional_number(record.get(2)),
                industry_pe: optional_number(record.get(3)),
                market_cap: optional_number(record.get(4)),
                dividend_yield: optional_number(record.get(5)),
                beta: optional_number(record.get(6)),
            });
        }

        Ok(Fundamentals::empty())
    }
}
