//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod xlsx_report_adapter;
pub mod yahoo_adapter;

use crate::domain::error::MarketdashError;
use std::path::Path;

/// Create the directory that will hold `output_path`, if it has one.
pub(crate) fn ensure_parent_dir(output_path: &Path) -> Result<(), MarketdashError> {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| MarketdashError::write_failure(&output_path.display().to_string(), e)),
        _ => Ok(()),
    }
}
