//! Analysis configuration.
//!
//! One immutable value is built up front, validated once, and passed by
//! reference into every entry point of the core.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::PivotError;

pub const DEFAULT_THRESHOLD: f64 = 0.25;
pub const DEFAULT_BUFFER_DAYS: usize = 2;
pub const DEFAULT_MAX_SYMBOL_LENGTH: usize = 5;

/// Built-in patterns for leveraged, inverse, volatility and crypto-tracking
/// products that the strategy is not meant for.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "ETF", "ETN", "FUTURES", "VIX", "VOLATILITY", "BITCOIN", "ETHER", "LEVERAGED", "INVERSE",
    "2X", "3X",
];

/// How per-trade returns combine into a symbol's total return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnAggregation {
    /// Sum of trade returns.
    #[default]
    Additive,
    /// Product of `(1 + r)` minus one.
    Compounded,
}

impl fmt::Display for ReturnAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnAggregation::Additive => f.write_str("additive"),
            ReturnAggregation::Compounded => f.write_str("compounded"),
        }
    }
}

impl FromStr for ReturnAggregation {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "additive" | "sum" => Ok(ReturnAggregation::Additive),
            "compounded" | "compound" => Ok(ReturnAggregation::Compounded),
            other => Err(PivotError::invalid_config(
                "aggregation",
                format!("unknown aggregation '{other}' (expected additive or compounded)"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub threshold: f64,
    pub filtering_enabled: bool,
    pub buffer_days: usize,
    pub max_symbol_length: usize,
    pub denylist_patterns: Vec<String>,
    pub aggregation: ReturnAggregation,
    pub max_hold_days: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            threshold: DEFAULT_THRESHOLD,
            filtering_enabled: true,
            buffer_days: DEFAULT_BUFFER_DAYS,
            max_symbol_length: DEFAULT_MAX_SYMBOL_LENGTH,
            denylist_patterns: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            aggregation: ReturnAggregation::default(),
            max_hold_days: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), PivotError> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(PivotError::invalid_config(
                "threshold",
                format!("threshold must be a positive number, got {}", self.threshold),
            ));
        }
        if self.max_symbol_length == 0 {
            return Err(PivotError::invalid_config(
                "max_symbol_length",
                "max_symbol_length must be at least 1",
            ));
        }
        if self.max_hold_days == Some(0) {
            return Err(PivotError::invalid_config(
                "max_hold_days",
                "max_hold_days must be at least 1 when set",
            ));
        }
        if self.denylist_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(PivotError::invalid_config(
                "denylist",
                "denylist patterns must not be empty",
            ));
        }
        Ok(())
    }
}
