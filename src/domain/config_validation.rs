//! Configuration validation.
//!
//! Validates every config field before any symbol is fetched.

use crate::domain::error::MarketdashError;
use crate::domain::metrics::MarketCapUnit;
use crate::domain::settings::{OutputFormat, ProviderKind};
use crate::domain::symbol::{parse_symbols, DEFAULT_INDEXES, DEFAULT_STOCKS};
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

/// History ranges that cover at least one year of sessions.
pub const VALID_RANGES: &[&str] = &["1y", "2y", "5y", "10y", "max"];

pub fn validate_dashboard_config(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    validate_symbols(config)?;
    validate_provider(config)?;
    validate_range(config)?;
    validate_timeout(config)?;
    validate_min_sessions(config)?;
    validate_report_format(config)?;
    validate_market_cap_unit(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> MarketdashError {
    MarketdashError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parsed value of `[section] key`, or `None` when the key is absent.
pub fn parse_setting<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, MarketdashError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    config
        .get_string(section, key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| invalid(section, key, e.to_string()))
        })
        .transpose()
}

/// Parsed `[symbols] <key>` list, or `None` when the key is absent.
/// A blank value is an explicitly empty list.
pub fn read_symbol_list(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<Vec<String>>, MarketdashError> {
    match config.get_string("symbols", key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(Some(Vec::new())),
        Some(raw) => parse_symbols(&raw)
            .map(Some)
            .map_err(|e| invalid("symbols", key, e.to_string())),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    let stocks = read_symbol_list(config, "stocks")?
        .map_or(DEFAULT_STOCKS.len(), |list| list.len());
    let indexes = read_symbol_list(config, "indexes")?
        .map_or(DEFAULT_INDEXES.len(), |list| list.len());
    if stocks + indexes == 0 {
        return Err(invalid(
            "symbols",
            "stocks",
            "at least one stock or index symbol is required",
        ));
    }
    Ok(())
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    let kind = parse_setting::<ProviderKind>(config, "provider", "kind")?.unwrap_or_default();

    match kind {
        ProviderKind::Csv => match config.get_string("provider", "data_dir") {
            Some(dir) if !dir.trim().is_empty() => Ok(()),
            _ => Err(MarketdashError::ConfigMissing {
                section: "provider".to_string(),
                key: "data_dir".to_string(),
            }),
        },
        ProviderKind::Yahoo => match config.get_string("provider", "base_url") {
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => Err(
                invalid("provider", "base_url", "base_url must be an http(s) URL"),
            ),
            _ => Ok(()),
        },
    }
}

fn validate_range(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    match config.get_string("provider", "range") {
        Some(range) if !VALID_RANGES.contains(&range.trim()) => Err(invalid(
            "provider",
            "range",
            format!("range must be one of {}", VALID_RANGES.join(", ")),
        )),
        _ => Ok(()),
    }
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    if parse_setting::<u64>(config, "provider", "timeout_secs")? == Some(0) {
        return Err(invalid(
            "provider",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    Ok(())
}

fn validate_min_sessions(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    if parse_setting::<usize>(config, "provider", "min_sessions")?.is_some_and(|n| n < 2) {
        return Err(invalid(
            "provider",
            "min_sessions",
            "min_sessions must be at least 2",
        ));
    }
    Ok(())
}

fn validate_report_format(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    parse_setting::<OutputFormat>(config, "report", "format").map(|_| ())
}

fn validate_market_cap_unit(config: &dyn ConfigPort) -> Result<(), MarketdashError> {
    parse_setting::<MarketCapUnit>(config, "report", "market_cap_unit").map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_dashboard_config(&config("")).is_ok());
    }

    #[test]
    fn full_config_is_valid() {
        let ini = r#"
[symbols]
stocks = HDFCBANK.NS, BEL.NS
indexes = ^NSEI

[provider]
kind = yahoo
base_url = http://127.0.0.1:8080
range = 2y
timeout_secs = 10
min_sessions = 30

[report]
output = out/dashboard.xlsx
format = xlsx
market_cap_unit = crore
"#;
        assert!(validate_dashboard_config(&config(ini)).is_ok());
    }

    #[test]
    fn duplicate_symbol_rejected() {
        let err = validate_dashboard_config(&config("[symbols]\nstocks = BEL.NS,BEL.NS\n"))
            .unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "stocks"));
    }

    #[test]
    fn both_lists_empty_rejected() {
        let err =
            validate_dashboard_config(&config("[symbols]\nstocks =\nindexes =\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "stocks"));
    }

    #[test]
    fn blank_list_is_explicitly_empty() {
        let cfg = config("[symbols]\nstocks = BEL.NS\nindexes =\n");
        assert_eq!(read_symbol_list(&cfg, "indexes").unwrap(), Some(vec![]));
        assert_eq!(
            read_symbol_list(&cfg, "stocks").unwrap(),
            Some(vec!["BEL.NS".to_string()])
        );
        assert_eq!(read_symbol_list(&cfg, "missing").unwrap(), None);
    }

    #[test]
    fn trailing_comma_rejected() {
        let cfg = config("[symbols]\nstocks = BEL.NS,\n");
        assert!(read_symbol_list(&cfg, "stocks").is_err());
    }

    #[test]
    fn unknown_provider_rejected() {
        let err = validate_dashboard_config(&config("[provider]\nkind = bloomberg\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn csv_provider_requires_data_dir() {
        let err = validate_dashboard_config(&config("[provider]\nkind = csv\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigMissing { key, .. } if key == "data_dir"));
        assert!(
            validate_dashboard_config(&config("[provider]\nkind = csv\ndata_dir = ./data\n"))
                .is_ok()
        );
    }

    #[test]
    fn non_http_base_url_rejected() {
        let err =
            validate_dashboard_config(&config("[provider]\nbase_url = ftp://x\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "base_url"));
    }

    #[test]
    fn short_range_rejected() {
        let err = validate_dashboard_config(&config("[provider]\nrange = 1mo\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "range"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err =
            validate_dashboard_config(&config("[provider]\ntimeout_secs = 0\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        let err =
            validate_dashboard_config(&config("[provider]\ntimeout_secs = soon\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn negative_min_sessions_rejected() {
        let err =
            validate_dashboard_config(&config("[provider]\nmin_sessions = -5\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "min_sessions"));
    }

    #[test]
    fn parse_setting_reads_numbers() {
        let cfg = config("[provider]\ntimeout_secs = 15\n");
        assert_eq!(parse_setting::<u64>(&cfg, "provider", "timeout_secs").unwrap(), Some(15));
        assert_eq!(parse_setting::<u64>(&cfg, "provider", "missing").unwrap(), None);
    }

    #[test]
    fn min_sessions_below_two_rejected() {
        let err =
            validate_dashboard_config(&config("[provider]\nmin_sessions = 1\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "min_sessions"));
    }

    #[test]
    fn unknown_format_rejected() {
        let err = validate_dashboard_config(&config("[report]\nformat = ods\n")).unwrap_err();
        assert!(matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "format"));
    }

    #[test]
    fn unknown_market_cap_unit_rejected() {
        let err =
            validate_dashboard_config(&config("[report]\nmarket_cap_unit = lakh\n")).unwrap_err();
        assert!(
            matches!(err, MarketdashError::ConfigInvalid { key, .. } if key == "market_cap_unit")
        );
    }
}
