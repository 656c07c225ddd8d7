//! Percentage-change metrics and dashboard rows.
//!
//! change(N) = close[latest] / close[latest - N] - 1
//! A field is missing when the series is shorter than N + 1 sessions or the
//! base close is zero.

use super::fundamentals::Fundamentals;
use super::ohlcv::HistoricalSeries;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

pub const DAILY_SESSIONS: usize = 1;
pub const WEEKLY_SESSIONS: usize = 5;
pub const MONTHLY_SESSIONS: usize = 21;
pub const YEARLY_SESSIONS: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Ytd,
    Yearly,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::Ytd,
        Period::Yearly,
    ];

    /// Fixed lookback in sessions; `None` for YTD, whose base depends on the calendar.
    pub fn sessions(self) -> Option<usize> {
        match self {
            Period::Daily => Some(DAILY_SESSIONS),
            Period::Weekly => Some(WEEKLY_SESSIONS),
            Period::Monthly => Some(MONTHLY_SESSIONS),
            Period::Ytd => None,
            Period::Yearly => Some(YEARLY_SESSIONS),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Ytd => "YTD",
            Period::Yearly => "Yearly",
        }
    }
}

pub fn pct_change(latest: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let change = latest / base - 1.0;
    change.is_finite().then_some(change)
}

/// Change between the latest close and the close `sessions` sessions earlier.
pub fn change_over(series: &HistoricalSeries, sessions: usize) -> Option<f64> {
    let latest = series.latest()?.close;
    let base = series.close_sessions_ago(sessions)?;
    pct_change(latest, base)
}

/// Change since the first session of `as_of`'s calendar year. Missing when
/// the series has no session in that year yet.
pub fn ytd_change(series: &HistoricalSeries, as_of: NaiveDate) -> Option<f64> {
    let latest = series.latest()?.close;
    let base = series.first_close_in_year(as_of.year())?;
    pct_change(latest, base)
}

/// The five change fields of a dashboard row, as fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceChanges {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
    pub ytd: Option<f64>,
    pub yearly: Option<f64>,
}

impl PriceChanges {
    pub fn compute(series: &HistoricalSeries, as_of: NaiveDate) -> Self {
        Self {
            daily: change_over(series, DAILY_SESSIONS),
            weekly: change_over(series, WEEKLY_SESSIONS),
            monthly: change_over(series, MONTHLY_SESSIONS),
            ytd: ytd_change(series, as_of),
            yearly: change_over(series, YEARLY_SESSIONS),
        }
    }

    pub fn get(&self, period: Period) -> Option<f64> {
        match period {
            Period::Daily => self.daily,
            Period::Weekly => self.weekly,
            Period::Monthly => self.monthly,
            Period::Ytd => self.ytd,
            Period::Yearly => self.yearly,
        }
    }
}

/// Display unit for market capitalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketCapUnit {
    /// 10^8 currency units.
    #[default]
    HundredMillion,
    /// 10^7 currency units.
    Crore,
}

impl MarketCapUnit {
    pub fn divisor(self) -> f64 {
        match self {
            MarketCapUnit::HundredMillion => 1e8,
            MarketCapUnit::Crore => 1e7,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            MarketCapUnit::HundredMillion => "100M",
            MarketCapUnit::Crore => "Cr",
        }
    }

    pub fn convert(self, raw: f64) -> f64 {
        raw / self.divisor()
    }
}

impl FromStr for MarketCapUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hundred_million" | "100m" => Ok(MarketCapUnit::HundredMillion),
            "crore" | "cr" => Ok(MarketCapUnit::Crore),
            other => Err(format!(
                "unknown market cap unit '{other}' (expected hundred_million or crore)"
            )),
        }
    }
}

impl fmt::Display for MarketCapUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketCapUnit::HundredMillion => f.write_str("hundred_million"),
            MarketCapUnit::Crore => f.write_str("crore"),
        }
    }
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub symbol: String,
    pub changes: PriceChanges,
    pub pe_ratio: Option<f64>,
    pub industry_pe: Option<f64>,
    /// In the configured display unit.
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
}

impl MetricRow {
    pub fn build(
        series: &HistoricalSeries,
        fundamentals: &Fundamentals,
        unit: MarketCapUnit,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            symbol: series.symbol.clone(),
            changes: PriceChanges::compute(series, as_of),
            pe_ratio: fundamentals.pe_ratio,
            industry_pe: fundamentals.industry_pe,
            market_cap: fundamentals.market_cap.map(|v| unit.convert(v)),
            dividend_yield: fundamentals.dividend_yield,
            beta: fundamentals.beta,
        }
    }
}
