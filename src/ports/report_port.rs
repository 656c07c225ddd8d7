//! Report generation port trait.

use crate::domain::error::MarketdashError;
use crate::domain::report::Report;
use std::path::Path;

/// Port for writing the dashboard report. Implementations overwrite any
/// existing file and fail with `WriteFailure` on serialization errors.
pub trait ReportPort {
    fn write(&self, report: &Report, output_path: &Path) -> Result<(), MarketdashError>;

    /// File extension the adapter writes, without the dot.
    fn extension(&self) -> &'static str;
}
