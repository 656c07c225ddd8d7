//! Yahoo Finance market data adapter.
//!
//! History comes from the v8 chart endpoint, fundamentals from the v10
//! quoteSummary endpoint. Yahoo wants a session cookie plus a crumb token; the
//! crumb is requested once per adapter and omitted if it cannot be obtained.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use chrono::DateTime;
use reqwest::blocking::Client;
use reqwest::header::REFERER;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::error::MarketdashError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::{HistoricalSeries, OhlcvBar};
use crate::domain::settings::ProviderSettings;
use crate::domain::symbol::Symbol;
use crate::ports::data_port::MarketDataPort;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) marketdash/0.1";
const YAHOO_REFERER: &str = "https://finance.yahoo.com/";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics";

pub struct YahooAdapter {
    client: Client,
    base_url: String,
    range: String,
    crumb: OnceCell<Option<String>>,
    /// `meta.regularMarketPrice` from the last chart response, per symbol.
    chart_prices: RefCell<HashMap<String, f64>>,
}

impl YahooAdapter {
    pub fn new(settings: &ProviderSettings) -> Result<Self, MarketdashError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(std::io::Error::other)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            range: settings.range.clone(),
            crumb: OnceCell::new(),
            chart_prices: RefCell::new(HashMap::new()),
        })
    }

    fn is_live_yahoo(&self) -> bool {
        self.base_url.ends_with("finance.yahoo.com")
    }

    fn crumb(&self) -> Option<&str> {
        self.crumb.get_or_init(|| self.fetch_crumb()).as_deref()
    }

    fn fetch_crumb(&self) -> Option<String> {
        if self.is_live_yahoo() {
            // Only the Set-Cookie matters; the page itself is usually a 404.
            if let Err(e) = self.client.get(COOKIE_URL).header(REFERER, YAHOO_REFERER).send() {
                debug!("cookie request failed: {}", e);
            }
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let response = match self.client.get(&url).header(REFERER, YAHOO_REFERER).send() {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!("crumb request returned status {}", r.status().as_u16());
                return None;
            }
            Err(e) => {
                debug!("crumb request failed: {}", e);
                return None;
            }
        };

        let body = response.text().ok()?;
        let crumb = body.trim();
        if crumb.is_empty() || crumb.len() >= 100 || crumb.contains(' ') || crumb.contains('<') {
            warn!("ignoring malformed crumb response");
            return None;
        }
        Some(crumb.to_string())
    }

    fn with_crumb(&self, mut url: String) -> String {
        if let Some(crumb) = self.crumb() {
            url.push_str("&crumb=");
            url.push_str(&urlencoding::encode(crumb));
        }
        url
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        self.with_crumb(format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d&includeAdjustedClose=true",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            self.range
        ))
    }

    fn summary_url(&self, symbol: &Symbol) -> String {
        self.with_crumb(format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(SUMMARY_MODULES)
        ))
    }

    /// Response body. Error statuses pass through when they carry a JSON
    /// payload, since Yahoo reports unknown symbols that way.
    fn get(&self, symbol: &Symbol, url: &str) -> Result<String, MarketdashError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(REFERER, YAHOO_REFERER)
            .send()
            .map_err(|e| MarketdashError::unavailable(symbol.as_str(), format!("transport error: {e}")))?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            MarketdashError::unavailable(symbol.as_str(), format!("failed to read response: {e}"))
        })?;

        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(MarketdashError::unavailable(
                symbol.as_str(),
                format!("provider returned status {}", status.as_u16()),
            ));
        }
        Ok(body)
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_history(&self, symbol: &Symbol) -> Result<HistoricalSeries, MarketdashError> {
        let url = self.chart_url(symbol);
        let body = self.get(symbol, &url)?;
        let chart = parse_chart(symbol.as_str(), &body)?;

        if let Some(price) = chart.market_price {
            self.chart_prices
                .borrow_mut()
                .insert(symbol.to_string(), price);
        }
        Ok(chart.series)
    }

    fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals, MarketdashError> {
        let url = self.summary_url(symbol);
        let body = self.get(symbol, &url)?;
        let mut fundamentals = parse_quote_summary(symbol.as_str(), &body)?;

        if fundamentals.current_price.is_none() {
            fundamentals.current_price = self.chart_prices.borrow().get(symbol.as_str()).copied();
        }
        Ok(fundamentals)
    }
}

#[derive(Debug)]
pub struct ChartData {
    pub series: HistoricalSeries,
    pub market_price: Option<f64>,
}

pub fn parse_chart(symbol: &str, body: &str) -> Result<ChartData, MarketdashError> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| {
        MarketdashError::unavailable(symbol, format!("failed to parse chart response: {e}"))
    })?;

    if let Some(error) = response.chart.error {
        return Err(MarketdashError::unavailable(symbol, error.to_string()));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketdashError::unavailable(symbol, "no chart data in response"))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .unwrap_or_default();
    let offset = result.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let raw_close = at(&quote.close, i);
        let Some(close) = at(&adjclose, i).or(raw_close) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        bars.push(OhlcvBar {
            date,
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    Ok(ChartData {
        series: HistoricalSeries::new(symbol, bars),
        market_price: result.meta.and_then(|m| m.regular_market_price),
    })
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<Fundamentals, MarketdashError> {
    let response: QuoteSummaryResponse = serde_json::from_str(body).map_err(|e| {
        MarketdashError::unavailable(symbol, format!("failed to parse quoteSummary response: {e}"))
    })?;

    if let Some(error) = response.quote_summary.error {
        return Err(MarketdashError::unavailable(symbol, error.to_string()));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketdashError::unavailable(symbol, "no quoteSummary data in response"))?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    // No provider field is a true industry PE; fall back through the closest ones.
    let industry_pe = value(&detail.industry_pe)
        .or_else(|| value(&detail.sector_pe))
        .or_else(|| value(&detail.forward_pe))
        .or_else(|| value(&stats.forward_pe));

    Ok(Fundamentals {
        current_price: value(&price.regular_market_price),
        pe_ratio: value(&detail.trailing_pe),
        industry_pe,
        market_cap: value(&price.market_cap).or_else(|| value(&detail.market_cap)),
        dividend_yield: value(&detail.dividend_yield)
            .or_else(|| value(&detail.trailing_annual_dividend_yield)),
        beta: value(&detail.beta).or_else(|| value(&stats.beta_3_year)),
    }
    .normalized())
}

fn value(field: &Option<RawValue>) -> Option<f64> {
    field.as_ref().and_then(RawValue::as_f64)
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.description) {
            (Some(code), Some(desc)) => write!(f, "{code}: {desc}"),
            (None, Some(desc)) => f.write_str(desc),
            (Some(code), None) => f.write_str(code),
            (None, None) => f.write_str("provider error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE", default)]
    forward_pe: Option<RawValue>,
    #[serde(rename = "industryPE", default)]
    industry_pe: Option<RawValue>,
    #[serde(rename = "sectorPE", default)]
    sector_pe: Option<RawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<RawValue>,
    #[serde(rename = "dividendYield", default)]
    dividend_yield: Option<RawValue>,
    #[serde(rename = "trailingAnnualDividendYield", default)]
    trailing_annual_dividend_yield: Option<RawValue>,
    #[serde(default)]
    beta: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "forwardPE", default)]
    forward_pe: Option<RawValue>,
    #[serde(rename = "beta3Year", default)]
    beta_3_year: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.2, "fmt": "1.20"}`, or `{}` when absent.
/// `raw` is occasionally a string such as "Infinity".
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<serde_json::Value>,
}

impl RawValue {
    fn as_f64(&self) -> Option<f64> {
        self.raw.as_ref().and_then(serde_json::Value::as_f64)
    }
}
