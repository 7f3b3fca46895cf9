//! Trade simulator.
//!
//! Signals dated on an excluded day are ignored. An eligible low signal on day
//! `d` opens a long position at the close of the next trading day after `d`;
//! an eligible high signal closes the open position at the close of the next
//! trading day after its date. At most one position is open at a time, and a
//! position still open when the series ends is discarded.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use super::config::AnalysisConfig;
use super::metrics::ProfitabilityResult;
use super::ohlcv::PriceSeries;
use super::position::{ExitReason, OpenPosition, Trade};
use super::signal::{Signal, WINDOW_LEN};

/// Closed trades plus whatever position was still open at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLog {
    pub trades: Vec<Trade>,
    pub open_position: Option<OpenPosition>,
}

#[derive(Debug, Clone, Copy, Default)]
struct DaySignals {
    high: bool,
    low: bool,
}

pub fn simulate_trades(
    series: &PriceSeries,
    signals: &[Signal],
    excluded: &BTreeSet<NaiveDate>,
    max_hold_days: Option<usize>,
) -> TradeLog {
    let points = series.points();
    let mut log = TradeLog::default();
    if points.len() < WINDOW_LEN {
        return log;
    }

    let mut days = vec![DaySignals::default(); points.len()];
    for signal in signals.iter().filter(|s| !excluded.contains(&s.date)) {
        if let Some(i) = series.index_of(signal.date) {
            if signal.kind.is_high() {
                days[i].high = true;
            } else {
                days[i].low = true;
            }
        }
    }

    let symbol = series.symbol();
    let mut open: Option<OpenPosition> = None;

    for (i, day) in days.iter().enumerate().take(points.len() - 1) {
        let exec_index = i + 1;
        let exec = &points[exec_index];

        if let Some(limit) = max_hold_days {
            if let Some(pos) = open.take_if(|p| p.days_held(exec_index) >= limit) {
                log.trades
                    .push(pos.close(symbol, exec.date, exec.close, ExitReason::MaxHold));
            }
        }

        open = match open.take() {
            Some(pos) if day.high => {
                log.trades
                    .push(pos.close(symbol, exec.date, exec.close, ExitReason::Signal));
                None
            }
            Some(pos) => Some(pos),
            None if day.low => {
                if exec.close > 0.0 {
                    Some(OpenPosition {
                        entry_index: exec_index,
                        entry_date: exec.date,
                        entry_price: exec.close,
                    })
                } else {
                    tracing::warn!(
                        symbol = %symbol,
                        date = %exec.date,
                        close = exec.close,
                        "skipping entry at non-positive close"
                    );
                    None
                }
            }
            None => None,
        };
    }

    if let Some(pos) = &open {
        tracing::debug!(
            symbol = %symbol,
            entry_date = %pos.entry_date,
            "discarding position still open at end of series"
        );
    }
    log.open_position = open;
    log
}

/// Simulate the strategy for one symbol and aggregate its metrics.
pub fn backtest(
    series: &PriceSeries,
    signals: &[Signal],
    excluded: &BTreeSet<NaiveDate>,
    config: &AnalysisConfig,
) -> ProfitabilityResult {
    let filtered_day_count = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => excluded.range(first..=last).count(),
        _ => 0,
    };
    let analysis_days = series.len().saturating_sub(filtered_day_count);

    let log = simulate_trades(series, signals, excluded, config.max_hold_days);
    ProfitabilityResult::from_trades(
        series.symbol(),
        &log.trades,
        config.aggregation,
        filtered_day_count,
        analysis_days,
    )
}
