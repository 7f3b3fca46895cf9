//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pivotscan.
#[derive(Debug, thiserror::Error)]
pub enum PivotError {
    #[error("insufficient data for {symbol}: have {points} points, need {minimum}")]
    InsufficientData {
        symbol: String,
        points: usize,
        minimum: usize,
    },

    #[error("invalid price for {symbol} on {date}: close {close} cannot be used as a denominator")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        close: f64,
    },

    #[error("invalid configuration {key}: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    #[error("analysis of {symbol} failed: {reason}")]
    SymbolComputeFailure { symbol: String, reason: String },

    #[error("invalid price series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PivotError {
    pub fn invalid_config(key: &str, reason: impl Into<String>) -> Self {
        PivotError::InvalidConfiguration {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn exit_status(&self) -> u8 {
        match self {
            PivotError::Io(_) => 1,
            PivotError::InvalidConfiguration { .. }
            | PivotError::ConfigParse { .. }
            | PivotError::ConfigMissing { .. } => 2,
            PivotError::DataSource { .. } | PivotError::InvalidSeries { .. } => 3,
            PivotError::SymbolComputeFailure { .. } | PivotError::InvalidPrice { .. } => 4,
            PivotError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&PivotError> for std::process::ExitCode {
    fn from(err: &PivotError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
