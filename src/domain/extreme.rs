//! Extreme-event filter.
//!
//! A day whose close-to-close change exceeds the threshold in magnitude is an
//! extreme event. Every trading day within `buffer_days` positions of an event
//! (inclusive on both sides) is excluded from backtest evaluation.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use super::config::AnalysisConfig;
use super::error::PivotError;
use super::ohlcv::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeEvent {
    pub date: NaiveDate,
    pub percent_change: f64,
}

/// A day whose previous close could not be used as a denominator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidPrice {
    pub date: NaiveDate,
    pub previous_close: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtremeEventReport {
    pub events: Vec<ExtremeEvent>,
    pub excluded: BTreeSet<NaiveDate>,
    pub invalid_prices: Vec<InvalidPrice>,
}

impl ExtremeEventReport {
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded.contains(&date)
    }
}

/// Detect extreme events and derive the exclusion window.
///
/// `config` is expected to have passed [`AnalysisConfig::validate`]. With
/// filtering disabled the events are still reported but nothing is excluded.
pub fn detect_extreme_events(series: &PriceSeries, config: &AnalysisConfig) -> ExtremeEventReport {
    let points = series.points();
    let mut report = ExtremeEventReport::default();
    let mut event_indices = Vec::new();

    for (t, pair) in points.windows(2).enumerate().map(|(i, w)| (i + 1, w)) {
        let previous_close = pair[0].close;
        if !(previous_close > 0.0 && previous_close.is_finite()) {
            let err = PivotError::InvalidPrice {
                symbol: series.symbol().to_string(),
                date: pair[0].date,
                close: previous_close,
            };
            tracing::warn!(skipped = %pair[1].date, "{err}");
            report.invalid_prices.push(InvalidPrice {
                date: pair[1].date,
                previous_close,
            });
            continue;
        }

        let percent_change = (pair[1].close - previous_close) / previous_close;
        if percent_change.abs() > config.threshold {
            report.events.push(ExtremeEvent {
                date: pair[1].date,
                percent_change,
            });
            event_indices.push(t);
        }
    }

    if config.filtering_enabled {
        report.excluded = exclusion_window(series, &event_indices, config.buffer_days);
    }

    if !report.events.is_empty() {
        tracing::debug!(
            symbol = %series.symbol(),
            events = report.events.len(),
            excluded = report.excluded.len(),
            "extreme events detected"
        );
    }

    report
}

/// Dates of `series` within `buffer` positions of any index in `centers`.
fn exclusion_window(series: &PriceSeries, centers: &[usize], buffer: usize) -> BTreeSet<NaiveDate> {
    let points = series.points();
    let mut excluded = BTreeSet::new();
    for &center in centers {
        let start = center.saturating_sub(buffer);
        let end = center.saturating_add(buffer).min(points.len() - 1);
        excluded.extend(points[start..=end].iter().map(|p| p.date));
    }
    excluded
}
