//! Symbol universe filter.
//!
//! Reduces a raw symbol catalog to plain equities suitable for the strategy.
//! Rules apply in order: length limit, denylist, then de-duplication. Input
//! order is preserved and the first occurrence of a symbol wins.

use serde::Serialize;
use std::collections::HashSet;

/// One row of a raw symbol catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub symbol: String,
    pub label: String,
}

impl CatalogEntry {
    pub fn new(symbol: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    Empty,
    TooLong { length: usize },
    Denylisted { pattern: String },
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSymbol {
    pub symbol: String,
    #[serde(flatten)]
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UniverseSelection {
    pub symbols: Vec<String>,
    pub rejected: Vec<RejectedSymbol>,
}

/// Filter `catalog`, returning only the eligible symbols.
pub fn filter_universe(catalog: &[CatalogEntry], denylist: &[String], max_length: usize) -> Vec<String> {
    select_universe(catalog, denylist, max_length).symbols
}

/// Filter `catalog`, also reporting why each rejected symbol was dropped.
pub fn select_universe(
    catalog: &[CatalogEntry],
    denylist: &[String],
    max_length: usize,
) -> UniverseSelection {
    let patterns: Vec<String> = denylist.iter().map(|p| p.trim().to_uppercase()).collect();
    let mut selection = UniverseSelection::default();
    let mut seen = HashSet::new();

    for entry in catalog {
        let symbol = entry.symbol.trim();
        let reject = |reason| RejectedSymbol {
            symbol: symbol.to_string(),
            reason,
        };

        if symbol.is_empty() {
            selection.rejected.push(reject(RejectReason::Empty));
            continue;
        }

        let length = symbol.chars().count();
        if length > max_length {
            selection.rejected.push(reject(RejectReason::TooLong { length }));
            continue;
        }

        if let Some(pattern) = patterns.iter().find(|p| matches_pattern(symbol, &entry.label, p)) {
            selection.rejected.push(reject(RejectReason::Denylisted {
                pattern: pattern.clone(),
            }));
            continue;
        }

        if !seen.insert(symbol.to_string()) {
            selection.rejected.push(reject(RejectReason::Duplicate));
            continue;
        }

        selection.symbols.push(symbol.to_string());
    }

    selection
}

/// A pattern matches when it equals the symbol or starts any word of the label.
/// Word matching keeps "ETF" from hitting "NETFLIX".
fn matches_pattern(symbol: &str, label: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if symbol.eq_ignore_ascii_case(pattern) {
        return true;
    }
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| word.to_uppercase().starts_with(pattern))
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse an explicit comma-separated symbol list, upper-casing each symbol.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
