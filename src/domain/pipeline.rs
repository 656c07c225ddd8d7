//! Fetch and compute stages of a run.
//!
//! Each symbol resolves to a [`SymbolOutcome`]: a dashboard row, or the
//! error that excluded it. A data failure for one symbol never aborts the run.

use crate::domain::error::MarketdashError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::metrics::{MarketCapUnit, MetricRow};
use crate::domain::symbol::{Symbol, SymbolKind, WatchList};
use crate::ports::data_port::MarketDataPort;
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

pub const DEFAULT_MIN_SESSIONS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub min_sessions: usize,
    pub market_cap_unit: MarketCapUnit,
    /// Run date; YTD is measured within its calendar year.
    pub as_of: NaiveDate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_sessions: DEFAULT_MIN_SESSIONS,
            market_cap_unit: MarketCapUnit::default(),
            as_of: Local::now().date_naive(),
        }
    }
}

#[derive(Debug)]
pub enum SymbolOutcome {
    Reported(MetricRow),
    Skipped {
        symbol: String,
        reason: MarketdashError,
    },
}

pub fn process_symbol(
    port: &dyn MarketDataPort,
    symbol: &Symbol,
    config: &PipelineConfig,
) -> SymbolOutcome {
    let skip = |reason: MarketdashError| SymbolOutcome::Skipped {
        symbol: symbol.to_string(),
        reason,
    };

    let history = match port.fetch_history(symbol) {
        Ok(series) => series,
        Err(e) => return skip(e),
    };

    if history.is_empty() {
        return skip(MarketdashError::unavailable(
            symbol.as_str(),
            "provider returned no sessions",
        ));
    }

    if history.len() < config.min_sessions {
        return skip(MarketdashError::InsufficientData {
            symbol: symbol.to_string(),
            sessions: history.len(),
            minimum: config.min_sessions,
        });
    }

    let fundamentals = match port.fetch_fundamentals(symbol) {
        Ok(f) => f.normalized(),
        Err(e) => {
            warn!("fundamentals unavailable for {}: {}", symbol, e);
            Fundamentals::empty()
        }
    };

    if symbol.kind() == SymbolKind::Stock && !fundamentals.has_pe() {
        warn!("PE data not available for {}", symbol);
    }

    let row = MetricRow::build(&history, &fundamentals, config.market_cap_unit, config.as_of);
    debug!(
        "{}: {} sessions, last close {:?}, price {:?}",
        symbol,
        history.len(),
        history.latest().map(|b| b.close),
        fundamentals.current_price
    );
    SymbolOutcome::Reported(row)
}

#[derive(Debug)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: MarketdashError,
}

/// Rows in watch-list order plus every symbol that was left out.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows: Vec<MetricRow>,
    pub skipped: Vec<SkippedSymbol>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.rows.len()
    }

    pub fn failed(&self) -> usize {
        self.skipped.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.failed()
    }
}

pub fn collect_rows(
    port: &dyn MarketDataPort,
    watch_list: &WatchList,
    config: &PipelineConfig,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for symbol in watch_list.all() {
        info!("Fetching data for {}", symbol);
        match process_symbol(port, symbol, config) {
            SymbolOutcome::Reported(row) => {
                info!("Fetched {}", symbol);
                summary.rows.push(row);
            }
            SymbolOutcome::Skipped { symbol, reason } => {
                warn!("skipping {} ({})", symbol, reason);
                summary.skipped.push(SkippedSymbol { symbol, reason });
            }
        }
    }

    summary
}
