//! Symbols and the configured watch list.
//!
//! Parses symbol lists from configuration. Stocks are listed before indexes,
//! and that order is the dashboard's row order.

use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_STOCKS: &[&str] = &[
    "HDFCBANK.NS",
    "RELIANCE.NS",
    "ICICIBANK.NS",
    "BEL.NS",
    "HAL.NS",
    "GOLDBEES.NS",
    "SILVERBEES.NS",
    "TATAMOTORS.NS",
    "BHARTIARTL.NS",
];

pub const DEFAULT_INDEXES: &[&str] = &["^NSEI", "^BSESN"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Stock,
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    ticker: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn new(ticker: &str, kind: SymbolKind) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            kind,
        }
    }

    pub fn stock(ticker: &str) -> Self {
        Self::new(ticker, SymbolKind::Stock)
    }

    pub fn index(ticker: &str) -> Self {
        Self::new(ticker, SymbolKind::Index)
    }

    pub fn as_str(&self) -> &str {
        &self.ticker
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ticker)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// The stock and index lists a run reports on.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchList {
    pub stocks: Vec<Symbol>,
    pub indexes: Vec<Symbol>,
}

impl WatchList {
    pub fn new(stocks: &[String], indexes: &[String]) -> Result<Self, SymbolListError> {
        let list = Self {
            stocks: stocks.iter().map(|s| Symbol::stock(s)).collect(),
            indexes: indexes.iter().map(|s| Symbol::index(s)).collect(),
        };

        let mut seen = HashSet::new();
        for symbol in list.all() {
            if !seen.insert(symbol.as_str()) {
                return Err(SymbolListError::DuplicateSymbol(symbol.to_string()));
            }
        }
        Ok(list)
    }

    /// All symbols in report order: stocks, then indexes.
    pub fn all(&self) -> impl Iterator<Item = &Symbol> {
        self.stocks.iter().chain(self.indexes.iter())
    }

    pub fn count(&self) -> usize {
        self.stocks.len() + self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl Default for WatchList {
    fn default() -> Self {
        Self {
            stocks: DEFAULT_STOCKS.iter().map(|s| Symbol::stock(s)).collect(),
            indexes: DEFAULT_INDEXES.iter().map(|s| Symbol::index(s)).collect(),
        }
    }
}
