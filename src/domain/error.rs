//! Domain error types.

/// Top-level error type for marketdash.
#[derive(Debug, thiserror::Error)]
pub enum MarketdashError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no usable data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient history for {symbol}: have {sessions} sessions, need {minimum}")]
    InsufficientData {
        symbol: String,
        sessions: usize,
        minimum: usize,
    },

    #[error("failed to write report {path}: {reason}")]
    WriteFailure { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MarketdashError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        MarketdashError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn write_failure(path: &str, reason: impl std::fmt::Display) -> Self {
        MarketdashError::WriteFailure {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&MarketdashError> for std::process::ExitCode {
    fn from(err: &MarketdashError) -> Self {
        let code: u8 = match err {
            MarketdashError::Io(_) => 1,
            MarketdashError::ConfigParse { .. }
            | MarketdashError::ConfigMissing { .. }
            | MarketdashError::ConfigInvalid { .. } => 2,
            MarketdashError::WriteFailure { .. } => 3,
            MarketdashError::DataUnavailable { .. } | MarketdashError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
