//! Run settings resolved from the configuration file and CLI overrides.

use crate::domain::metrics::MarketCapUnit;
use crate::domain::pipeline::PipelineConfig;
use crate::domain::symbol::WatchList;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OUTPUT: &str = "Portfolio_Analysis.xlsx";
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_RANGE: &str = "2y";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "csv" => Ok(ProviderKind::Csv),
            other => Err(format!("unknown provider '{other}' (expected yahoo or csv)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown report format '{other}' (expected xlsx or csv)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Xlsx => f.write_str("xlsx"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

/// Default report path with the extension for `format`.
pub fn default_output(format: OutputFormat) -> PathBuf {
    Path::new(DEFAULT_OUTPUT).with_extension(format.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub base_url: String,
    pub range: String,
    pub timeout_secs: u64,
    pub data_dir: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: DEFAULT_BASE_URL.to_string(),
            range: DEFAULT_RANGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub watch_list: WatchList,
    pub provider: ProviderSettings,
    pub pipeline: PipelineConfig,
    pub output: PathBuf,
    pub format: OutputFormat,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            watch_list: WatchList::default(),
            provider: ProviderSettings::default(),
            pipeline: PipelineConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: OutputFormat::default(),
        }
    }
}

impl RunSettings {
    pub fn market_cap_unit(&self) -> MarketCapUnit {
        self.pipeline.market_cap_unit
    }
}
