//! Three-day local extrema classifier.
//!
//! For every position `t >= 2` the window `(two_ago, yesterday, today)` =
//! `(t-2, t-1, t)` is inspected, and each of the four checks below may emit a
//! signal dated `yesterday`:
//!
//! - `ExtremeHigh`: `yesterday.high > max(today.high, two_ago.high)`
//! - `CloseHigh`: `yesterday.close > max(today.close, two_ago.close)`
//! - `ExtremeLow`: `yesterday.low < min(today.low, two_ago.low)`
//! - `CloseLow`: `yesterday.close < min(today.close, two_ago.close)`
//!
//! Comparisons are strict, so ties never signal.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::ohlcv::{PricePoint, PriceSeries};

/// Points needed before the first window can be evaluated.
pub const WINDOW_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ExtremeHigh,
    CloseHigh,
    ExtremeLow,
    CloseLow,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::ExtremeHigh,
        SignalKind::CloseHigh,
        SignalKind::ExtremeLow,
        SignalKind::CloseLow,
    ];

    pub fn is_high(self) -> bool {
        matches!(self, SignalKind::ExtremeHigh | SignalKind::CloseHigh)
    }

    pub fn is_low(self) -> bool {
        !self.is_high()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::ExtremeHigh => "local_extreme_high",
            SignalKind::CloseHigh => "local_close_high",
            SignalKind::ExtremeLow => "local_extreme_low",
            SignalKind::CloseLow => "local_close_low",
        }
    }

    /// Evaluate this check on one window, returning the triggering value.
    fn evaluate(self, two_ago: &PricePoint, yesterday: &PricePoint, today: &PricePoint) -> Option<f64> {
        let (value, fired) = match self {
            SignalKind::ExtremeHigh => (
                yesterday.high,
                yesterday.high > today.high.max(two_ago.high),
            ),
            SignalKind::CloseHigh => (
                yesterday.close,
                yesterday.close > today.close.max(two_ago.close),
            ),
            SignalKind::ExtremeLow => (
                yesterday.low,
                yesterday.low < today.low.min(two_ago.low),
            ),
            SignalKind::CloseLow => (
                yesterday.close,
                yesterday.close < today.close.min(two_ago.close),
            ),
        };
        fired.then_some(value)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub symbol: String,
    pub date: NaiveDate,
    pub kind: SignalKind,
    /// The high, low or close of the signal day that triggered the check.
    pub reference_value: f64,
}

/// Lazily classify every window of `series`.
///
/// The iterator borrows the series and keeps no other state, so calling
/// `classify` again (or cloning the iterator) restarts the sequence.
pub fn classify(series: &PriceSeries) -> Signals<'_> {
    Signals {
        series,
        today: WINDOW_LEN - 1,
        check: 0,
    }
}

/// Signals of the most recent window only: the last point is "today" and the
/// signals are dated the point before it.
pub fn classify_latest(series: &PriceSeries) -> Vec<Signal> {
    if series.len() < WINDOW_LEN {
        return Vec::new();
    }
    Signals {
        series,
        today: series.len() - 1,
        check: 0,
    }
    .collect()
}

#[derive(Debug, Clone)]
pub struct Signals<'a> {
    series: &'a PriceSeries,
    today: usize,
    check: usize,
}

impl Iterator for Signals<'_> {
    type Item = Signal;

    fn next(&mut self) -> Option<Signal> {
        let points = self.series.points();
        while self.today < points.len() {
            if self.check == SignalKind::ALL.len() {
                self.today += 1;
                self.check = 0;
                continue;
            }
            let kind = SignalKind::ALL[self.check];
            self.check += 1;

            let window = &points[self.today - 2..=self.today];
            if let Some(reference_value) = kind.evaluate(&window[0], &window[1], &window[2]) {
                return Some(Signal {
                    symbol: self.series.symbol().to_string(),
                    date: window[1].date,
                    kind,
                    reference_value,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let windows_left = self.series.len().saturating_sub(self.today);
        (0, Some(windows_left * SignalKind::ALL.len()))
    }
}
