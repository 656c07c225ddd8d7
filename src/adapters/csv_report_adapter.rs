//! Flat-file report adapter implementing ReportPort.
//!
//! The dashboard goes to the output path; the news sheet goes beside it as
//! `{stem}_news.csv`.

use std::path::{Path, PathBuf};

use super::ensure_parent_dir;
use crate::domain::error::MarketdashError;
use crate::domain::report::{news_columns, Cell, Column, Report};
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Path of the news file written next to `output_path`.
pub fn news_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_path.with_file_name(format!("{stem}_news.csv"))
}

fn write_table(
    path: &Path,
    columns: &[Column],
    rows: impl Iterator<Item = Vec<Cell>>,
) -> Result<(), MarketdashError> {
    let path_str = path.display().to_string();
    let to_failure = |e: csv::Error| MarketdashError::write_failure(&path_str, e);

    let mut writer = csv::Writer::from_path(path).map_err(to_failure)?;
    writer
        .write_record(columns.iter().map(|c| c.header.as_str()))
        .map_err(to_failure)?;
    for cells in rows {
        let record: Vec<String> = cells
            .iter()
            .zip(columns)
            .map(|(cell, column)| cell.render(column.kind))
            .collect();
        writer.write_record(&record).map_err(to_failure)?;
    }
    writer
        .flush()
        .map_err(|e| MarketdashError::write_failure(&path_str, e))
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &Report, output_path: &Path) -> Result<(), MarketdashError> {
        ensure_parent_dir(output_path)?;
        write_table(
            output_path,
            &report.dashboard_columns(),
            report.dashboard_rows(),
        )?;
        write_table(&news_path(output_path), &news_columns(), report.news_rows())
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}
