//! Excel workbook report adapter implementing ReportPort.
//!
//! Writes the dashboard and the news sheet with `rust_xlsxwriter`. Percent
//! columns carry the raw fraction with a `0.00%` number format, so the cells
//! stay numeric for sorting and filtering. Market cap is shown in rupees.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::debug;

use super::ensure_parent_dir;
use crate::domain::error::MarketdashError;
use crate::domain::report::{news_columns, Cell, Column, ColumnKind, Report, DASHBOARD_SHEET, NEWS_SHEET};
use crate::ports::report_port::ReportPort;

/// Indian rupee with thousands separators.
pub const CURRENCY_FORMAT: &str = "[$₹-4009] #,##0.00";
pub const PERCENT_FORMAT: &str = "0.00%";

pub struct XlsxReportAdapter;

impl XlsxReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XlsxReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

struct Formats {
    header: Format,
    percent: Format,
    ratio: Format,
    currency: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            percent: Format::new().set_num_format(PERCENT_FORMAT),
            ratio: Format::new().set_num_format("0.00"),
            currency: Format::new().set_num_format(CURRENCY_FORMAT),
        }
    }

    fn for_kind(&self, kind: ColumnKind) -> Option<&Format> {
        match kind {
            ColumnKind::Text => None,
            ColumnKind::Percent => Some(&self.percent),
            ColumnKind::Ratio => Some(&self.ratio),
            ColumnKind::Currency => Some(&self.currency),
        }
    }
}

fn build_sheet(
    name: &str,
    columns: &[Column],
    rows: impl Iterator<Item = Vec<Cell>>,
    formats: &Formats,
) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, &column.header, &formats.header)?;
        sheet.set_column_width(col, column.width)?;
    }

    let mut last_row = 0u32;
    for (idx, cells) in rows.enumerate() {
        let row = idx as u32 + 1;
        last_row = row;
        for (col, (cell, column)) in cells.iter().zip(columns).enumerate() {
            let col = col as u16;
            match (cell, formats.for_kind(column.kind)) {
                (Cell::Text(text), _) => {
                    sheet.write_string(row, col, text)?;
                }
                (Cell::Number(value), Some(format)) => {
                    sheet.write_number_with_format(row, col, *value, format)?;
                }
                (Cell::Number(value), None) => {
                    sheet.write_number(row, col, *value)?;
                }
                (Cell::Empty, _) => {}
            }
        }
    }

    if !columns.is_empty() {
        sheet.set_freeze_panes(1, 0)?;
        sheet.autofilter(0, 0, last_row, columns.len() as u16 - 1)?;
    }
    Ok(sheet)
}

impl ReportPort for XlsxReportAdapter {
    fn write(&self, report: &Report, output_path: &Path) -> Result<(), MarketdashError> {
        let path_str = output_path.display().to_string();
        ensure_parent_dir(output_path)?;

        let formats = Formats::new();
        let to_failure = |e: XlsxError| MarketdashError::write_failure(&path_str, e);

        let dashboard = build_sheet(
            DASHBOARD_SHEET,
            &report.dashboard_columns(),
            report.dashboard_rows(),
            &formats,
        )
        .map_err(to_failure)?;
        let news = build_sheet(NEWS_SHEET, &news_columns(), report.news_rows(), &formats)
            .map_err(to_failure)?;

        let mut workbook = Workbook::new();
        workbook.push_worksheet(dashboard);
        workbook.push_worksheet(news);
        workbook.save(output_path).map_err(to_failure)?;

        debug!(
            "wrote {} dashboard rows and {} news rows to {}",
            report.rows.len(),
            report.news.len(),
            path_str
        );
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}
