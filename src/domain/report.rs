//! Report layout: column schemas, cell values, and the placeholder news sheet.

use super::metrics::{MarketCapUnit, MetricRow, Period};

pub const DASHBOARD_SHEET: &str = "Dashboard";
pub const NEWS_SHEET: &str = "News Feed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Fraction shown as a percentage.
    Percent,
    /// Plain multiple, two decimals.
    Ratio,
    Currency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub kind: ColumnKind,
    pub width: f64,
}

impl Column {
    fn new(header: impl Into<String>, kind: ColumnKind, width: f64) -> Self {
        Self {
            header: header.into(),
            kind,
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn from_option(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    /// Plain-text rendering for flat file output.
    pub fn render(&self, kind: ColumnKind) -> String {
        match (self, kind) {
            (Cell::Text(s), _) => s.clone(),
            (Cell::Empty, _) => String::new(),
            (Cell::Number(v), ColumnKind::Percent) => format!("{:.2}%", v * 100.0),
            (Cell::Number(v), _) => format!("{:.2}", v),
        }
    }
}

pub fn dashboard_columns(unit: MarketCapUnit) -> Vec<Column> {
    let mut columns = vec![Column::new("Symbol", ColumnKind::Text, 16.0)];
    columns.extend(
        Period::ALL
            .iter()
            .map(|p| Column::new(format!("{} Change %", p.label()), ColumnKind::Percent, 17.0)),
    );
    columns.push(Column::new("PE Ratio", ColumnKind::Ratio, 10.0));
    columns.push(Column::new("Industry PE", ColumnKind::Ratio, 12.0));
    columns.push(Column::new(
        format!("Market Cap ({})", unit.abbreviation()),
        ColumnKind::Currency,
        18.0,
    ));
    columns.push(Column::new("Dividend Yield %", ColumnKind::Percent, 17.0));
    columns.push(Column::new("Beta", ColumnKind::Ratio, 8.0));
    columns
}

/// Cells in `dashboard_columns` order.
pub fn row_cells(row: &MetricRow) -> Vec<Cell> {
    let mut cells = vec![Cell::Text(row.symbol.clone())];
    cells.extend(
        Period::ALL
            .iter()
            .map(|p| Cell::from_option(row.changes.get(*p))),
    );
    cells.push(Cell::from_option(row.pe_ratio));
    cells.push(Cell::from_option(row.industry_pe));
    cells.push(Cell::from_option(row.market_cap));
    cells.push(Cell::from_option(row.dividend_yield));
    cells.push(Cell::from_option(row.beta));
    cells
}

pub fn news_columns() -> Vec<Column> {
    vec![
        Column::new("Stock", ColumnKind::Text, 16.0),
        Column::new("Headline", ColumnKind::Text, 48.0),
        Column::new("Source", ColumnKind::Text, 20.0),
        Column::new("Published At", ColumnKind::Text, 14.0),
        Column::new("URL", ColumnKind::Text, 40.0),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub stock: &'static str,
    pub headline: &'static str,
    pub source: &'static str,
    pub published_at: &'static str,
    pub url: &'static str,
}

impl NewsItem {
    pub fn cells(&self) -> Vec<Cell> {
        [
            self.stock,
            self.headline,
            self.source,
            self.published_at,
            self.url,
        ]
        .iter()
        .map(|s| Cell::Text(s.to_string()))
        .collect()
    }
}

/// Static news rows; no live news source is queried.
pub fn placeholder_news() -> Vec<NewsItem> {
    vec![
        NewsItem {
            stock: "HDFCBANK.NS",
            headline: "HDFC Bank sees growth in retail loans",
            source: "Economic Times",
            published_at: "2025-01-10",
            url: "https://economictimes.indiatimes.com",
        },
        NewsItem {
            stock: "RELIANCE.NS",
            headline: "Reliance Industries reports strong Q3 results",
            source: "Business Standard",
            published_at: "2025-01-09",
            url: "https://business-standard.com",
        },
    ]
}

/// Everything the writer needs for one output file.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: Vec<MetricRow>,
    pub news: Vec<NewsItem>,
    pub market_cap_unit: MarketCapUnit,
}

impl Report {
    pub fn new(rows: Vec<MetricRow>, market_cap_unit: MarketCapUnit) -> Self {
        Self {
            rows,
            news: placeholder_news(),
            market_cap_unit,
        }
    }

    pub fn dashboard_columns(&self) -> Vec<Column> {
        dashboard_columns(self.market_cap_unit)
    }

    pub fn dashboard_rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        self.rows.iter().map(row_cells)
    }

    pub fn news_rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        self.news.iter().map(NewsItem::cells)
    }
}
