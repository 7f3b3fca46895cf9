#![allow(dead_code)]

use chrono::NaiveDate;
use pivotscan::domain::error::PivotError;
use pivotscan::domain::ohlcv::{PricePoint, PriceSeries};
use pivotscan::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PivotError> {
        self.requests.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PivotError::DataSource {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(symbol)
            .ok_or_else(|| PivotError::DataSource {
                reason: format!("no data for {symbol}"),
            })?
            .iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .cloned()
            .collect();
        PriceSeries::from_unsorted(symbol, points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, PivotError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A point whose high and low sit one unit either side of the close.
pub fn make_point(date: NaiveDate, close: f64) -> PricePoint {
    PricePoint::new(date, close, close + 1.0, close - 1.0, close)
}

/// Consecutive calendar days starting at `start`.
pub fn points_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_point(start + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, points_from_closes(date(2024, 1, 1), closes)).unwrap()
}

/// Points built from lows: high = low + 2, close = low + 1.
pub fn points_from_lows(start: NaiveDate, lows: &[f64]) -> Vec<PricePoint> {
    lows.iter()
        .enumerate()
        .map(|(i, &low)| {
            PricePoint::new(
                start + chrono::Duration::days(i as i64),
                low + 1.0,
                low + 2.0,
                low,
                low + 1.0,
            )
        })
        .collect()
}
