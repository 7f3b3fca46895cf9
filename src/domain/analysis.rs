//! Per-symbol pipeline and the parallel batch runner.
//!
//! Each symbol runs classify -> detect extreme events -> backtest in sequence.
//! Symbols are independent, so a batch fans them out with rayon and hands the
//! finished results to the ranking step.

use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::backtest::backtest;
use super::config::AnalysisConfig;
use super::error::PivotError;
use super::extreme::{ExtremeEventReport, detect_extreme_events};
use super::metrics::ProfitabilityResult;
use super::ohlcv::PriceSeries;
use super::ranking::{Ranking, rank};
use super::signal::{Signal, WINDOW_LEN, classify};

/// Everything computed for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolAnalysis {
    pub signals: Vec<Signal>,
    pub extremes: ExtremeEventReport,
    pub result: ProfitabilityResult,
}

/// A symbol handed to the batch, with its series or the reason it could not
/// be fetched.
#[derive(Debug)]
pub struct SymbolInput {
    pub symbol: String,
    pub series: Result<PriceSeries, PivotError>,
}

impl SymbolInput {
    pub fn new(symbol: impl Into<String>, series: Result<PriceSeries, PivotError>) -> Self {
        Self {
            symbol: symbol.into(),
            series,
        }
    }
}

pub fn analyze_series(series: &PriceSeries, config: &AnalysisConfig) -> SymbolAnalysis {
    if series.len() < WINDOW_LEN {
        let note = PivotError::InsufficientData {
            symbol: series.symbol().to_string(),
            points: series.len(),
            minimum: WINDOW_LEN,
        };
        tracing::debug!("{note}");
    }

    let signals: Vec<Signal> = classify(series).collect();
    let extremes = detect_extreme_events(series, config);
    let result = backtest(series, &signals, &extremes.excluded, config);

    SymbolAnalysis {
        signals,
        extremes,
        result,
    }
}

/// Analyze one symbol, turning any fault into an error-tagged result.
pub fn analyze_symbol(series: &PriceSeries, config: &AnalysisConfig) -> ProfitabilityResult {
    isolate(series.symbol(), || analyze_series(series, config).result)
}

/// Run `compute` for `symbol`, converting a panic into a `SymbolComputeFailure` result.
fn isolate<F>(symbol: &str, compute: F) -> ProfitabilityResult
where
    F: FnOnce() -> ProfitabilityResult,
{
    match panic::catch_unwind(AssertUnwindSafe(compute)) {
        Ok(result) => result,
        Err(payload) => {
            let err = PivotError::SymbolComputeFailure {
                symbol: symbol.to_string(),
                reason: panic_message(payload.as_ref()),
            };
            tracing::warn!(symbol, "{err}");
            ProfitabilityResult::failed(symbol, &err)
        }
    }
}

/// Validate `config`, analyze every input in parallel and rank the results.
///
/// Configuration errors are returned before any symbol is touched; per-symbol
/// failures end up in [`Ranking::errors`].
pub fn analyze_batch(inputs: Vec<SymbolInput>, config: &AnalysisConfig) -> Result<Ranking, PivotError> {
    config.validate()?;

    let results: Vec<ProfitabilityResult> = inputs
        .into_par_iter()
        .map(|input| match input.series {
            Ok(series) => analyze_symbol(&series, config),
            Err(err) => {
                tracing::warn!(symbol = %input.symbol, "{err}");
                ProfitabilityResult::failed(&input.symbol, &err)
            }
        })
        .collect();

    let ranking = rank(results);
    tracing::info!(
        analyzed = ranking.ranked.len(),
        failed = ranking.errors.len(),
        "batch complete"
    );
    Ok(ranking)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
