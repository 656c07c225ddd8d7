//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::xlsx_report_adapter::XlsxReportAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::config_validation::{parse_setting, read_symbol_list, validate_dashboard_config};
use crate::domain::error::MarketdashError;
use crate::domain::metrics::MarketCapUnit;
use crate::domain::pipeline::{collect_rows, PipelineConfig, RunSummary, DEFAULT_MIN_SESSIONS};
use crate::domain::report::Report;
use crate::domain::settings::{
    default_output, OutputFormat, ProviderKind, ProviderSettings, RunSettings,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::symbol::{parse_symbols, Symbol, WatchList, DEFAULT_INDEXES, DEFAULT_STOCKS};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "marketdash", about = "Market watch-list dashboard generator")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch market data and write the dashboard report
    Report {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated symbols replacing the configured lists
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        format: Option<OutputFormat>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved watch list
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "marketdash=debug" } else { "marketdash=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Report {
            config,
            output,
            symbols,
            format,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(config.as_deref(), output, symbols.as_deref(), format)
            } else {
                run_report(config.as_deref(), output, symbols.as_deref(), format)
            }
        }
        Command::ListSymbols { config } => run_list_symbols(config.as_deref()),
    }
}

fn fail(err: MarketdashError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        fail(MarketdashError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}

/// Without a path every setting takes its default.
fn load_optional_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// `--symbols` replaces both configured lists; tickers starting with `^` are
/// indexes. Otherwise each configured list falls back to its built-in default.
pub fn resolve_watch_list(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<WatchList, MarketdashError> {
    let invalid = |key: &str, reason: String| MarketdashError::ConfigInvalid {
        section: "symbols".to_string(),
        key: key.to_string(),
        reason,
    };

    let (stocks, indexes): (Vec<String>, Vec<String>) = match symbols_override {
        Some(raw) => {
            let parsed = parse_symbols(raw).map_err(|e| invalid("--symbols", e.to_string()))?;
            parsed.into_iter().partition(|s| !s.starts_with('^'))
        }
        None => {
            let defaults = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
            let stocks = read_symbol_list(config, "stocks")?.unwrap_or_else(|| defaults(DEFAULT_STOCKS));
            let indexes =
                read_symbol_list(config, "indexes")?.unwrap_or_else(|| defaults(DEFAULT_INDEXES));
            (stocks, indexes)
        }
    };

    let watch_list = WatchList::new(&stocks, &indexes).map_err(|e| invalid("stocks", e.to_string()))?;
    if watch_list.is_empty() {
        return Err(invalid("stocks", "no symbols to report on".to_string()));
    }
    Ok(watch_list)
}

/// Output path: CLI flag, then `[report] output`, then the default for `format`.
/// An extension that disagrees with `format` is replaced.
pub fn resolve_output(
    output_override: Option<PathBuf>,
    config: &dyn ConfigPort,
    format: OutputFormat,
) -> PathBuf {
    let path = output_override
        .or_else(|| {
            config
                .get_string("report", "output")
                .filter(|s| !s.trim().is_empty())
                .map(|s| PathBuf::from(s.trim()))
        })
        .unwrap_or_else(|| default_output(format));

    let wanted = format.to_string();
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(&wanted));
    if matches {
        return path;
    }
    let fixed = path.with_extension(&wanted);
    warn!(
        requested = %path.display(),
        output = %fixed.display(),
        "output extension does not match report format"
    );
    fixed
}

pub fn build_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, MarketdashError> {
    let defaults = ProviderSettings::default();

    let provider = ProviderSettings {
        kind: parse_setting::<ProviderKind>(config, "provider", "kind")?.unwrap_or_default(),
        base_url: config
            .get_string("provider", "base_url")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.base_url),
        range: config
            .get_string("provider", "range")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.range),
        timeout_secs: parse_setting::<u64>(config, "provider", "timeout_secs")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        data_dir: config
            .get_string("provider", "data_dir")
            .filter(|s| !s.trim().is_empty())
            .map(|s| PathBuf::from(s.trim())),
    };

    let pipeline = PipelineConfig {
        min_sessions: parse_setting::<usize>(config, "provider", "min_sessions")?
            .unwrap_or(DEFAULT_MIN_SESSIONS),
        market_cap_unit: parse_setting::<MarketCapUnit>(config, "report", "market_cap_unit")?
            .unwrap_or_default(),
        ..PipelineConfig::default()
    };

    let format = parse_setting::<OutputFormat>(config, "report", "format")?.unwrap_or_default();

    Ok(RunSettings {
        watch_list: resolve_watch_list(None, config)?,
        provider,
        pipeline,
        output: resolve_output(None, config, format),
        format,
    })
}

pub fn build_data_port(
    provider: &ProviderSettings,
) -> Result<Box<dyn MarketDataPort>, MarketdashError> {
    match provider.kind {
        ProviderKind::Yahoo => Ok(Box::new(YahooAdapter::new(provider)?)),
        ProviderKind::Csv => {
            let dir = provider
                .data_dir
                .clone()
                .ok_or_else(|| MarketdashError::ConfigMissing {
                    section: "provider".to_string(),
                    key: "data_dir".to_string(),
                })?;
            Ok(Box::new(CsvAdapter::new(dir)))
        }
    }
}

pub fn build_report_port(format: OutputFormat) -> Box<dyn ReportPort> {
    match format {
        OutputFormat::Xlsx => Box::new(XlsxReportAdapter::new()),
        OutputFormat::Csv => Box::new(CsvReportAdapter::new()),
    }
}

/// Load, validate, and apply CLI overrides.
pub fn prepare_settings(
    config_path: Option<&Path>,
    output_override: Option<PathBuf>,
    symbols_override: Option<&str>,
    format_override: Option<OutputFormat>,
) -> Result<RunSettings, ExitCode> {
    let config = load_optional_config(config_path)?;
    validate_dashboard_config(&config).map_err(fail)?;

    let mut settings = build_run_settings(&config).map_err(fail)?;
    if let Some(format) = format_override {
        settings.format = format;
    }
    settings.output = resolve_output(output_override, &config, settings.format);
    if symbols_override.is_some() {
        settings.watch_list = resolve_watch_list(symbols_override, &config).map_err(fail)?;
    }
    Ok(settings)
}

fn run_report(
    config_path: Option<&Path>,
    output_override: Option<PathBuf>,
    symbols_override: Option<&str>,
    format_override: Option<OutputFormat>,
) -> ExitCode {
    let settings =
        match prepare_settings(config_path, output_override, symbols_override, format_override) {
            Ok(s) => s,
            Err(code) => return code,
        };

    let data_port = match build_data_port(&settings.provider) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let report_port = build_report_port(settings.format);

    run_report_pipeline(data_port.as_ref(), report_port.as_ref(), &settings)
}

pub fn run_report_pipeline(
    data_port: &dyn MarketDataPort,
    report_port: &dyn ReportPort,
    settings: &RunSettings,
) -> ExitCode {
    eprintln!(
        "Fetching {} symbols ({} stocks, {} indexes)",
        settings.watch_list.count(),
        settings.watch_list.stocks.len(),
        settings.watch_list.indexes.len(),
    );

    let summary = collect_rows(data_port, &settings.watch_list, &settings.pipeline);
    print_summary(&summary);

    let report = Report::new(summary.rows, settings.market_cap_unit());
    match report_port.write(&report, &settings.output) {
        Ok(()) => {
            eprintln!(
                "\nReport ({}) written to: {}",
                report_port.extension(),
                settings.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Console summary block, one entry per line.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        "=== Summary ===".to_string(),
        format!("Successfully fetched: {}/{}", summary.succeeded(), summary.total()),
    ];
    if !summary.skipped.is_empty() {
        lines.push(format!("Failed fetches: {}/{}", summary.failed(), summary.total()));
        lines.extend(
            summary
                .skipped
                .iter()
                .map(|s| format!("  {}: {}", s.symbol, s.reason)),
        );
    }
    lines
}

fn print_summary(summary: &RunSummary) {
    eprintln!();
    for line in summary_lines(summary) {
        eprintln!("{line}");
    }
}

pub fn run_dry_run(
    config_path: Option<&Path>,
    output_override: Option<PathBuf>,
    symbols_override: Option<&str>,
    format_override: Option<OutputFormat>,
) -> ExitCode {
    let settings =
        match prepare_settings(config_path, output_override, symbols_override, format_override) {
            Ok(s) => s,
            Err(code) => return code,
        };
    eprintln!("Config validated successfully");

    let tickers = |symbols: &[Symbol]| {
        symbols
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    eprintln!("\nWatch list:");
    eprintln!("  stocks:  {}", tickers(&settings.watch_list.stocks));
    eprintln!("  indexes: {}", tickers(&settings.watch_list.indexes));

    eprintln!("\nProvider:");
    match settings.provider.kind {
        ProviderKind::Yahoo => eprintln!("  yahoo: {}", settings.provider.base_url),
        ProviderKind::Csv => eprintln!(
            "  csv: {}",
            settings
                .provider
                .data_dir
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ),
    }
    eprintln!("  range: {}", settings.provider.range);
    eprintln!("  min sessions: {}", settings.pipeline.min_sessions);

    eprintln!("\nReport:");
    eprintln!("  output: {}", settings.output.display());
    eprintln!("  format: {}", settings.format);
    eprintln!("  market cap unit: {}", settings.market_cap_unit());

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: Option<&Path>) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let watch_list = match resolve_watch_list(None, &config) {
        Ok(w) => w,
        Err(e) => return fail(e),
    };

    for symbol in watch_list.all() {
        println!("{}", symbol);
    }
    eprintln!(
        "{} symbols ({} stocks, {} indexes)",
        watch_list.count(),
        watch_list.stocks.len(),
        watch_list.indexes.len()
    );
    ExitCode::SUCCESS
}
