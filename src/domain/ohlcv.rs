//! Daily price points and per-symbol price series.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::PivotError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Check that every price is finite and positive and that `high >= low`.
    pub fn validate(&self) -> Result<(), String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        if let Some((name, value)) = prices.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(format!("{name} price {value} is not a positive number"));
        }
        if self.high < self.low {
            return Err(format!("high {} is below low {}", self.high, self.low));
        }
        Ok(())
    }
}

/// Ordered daily points for one symbol.
///
/// Dates are strictly increasing. Gaps are allowed; non-trading days are
/// simply absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points already in ascending date order.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, PivotError> {
        let symbol = symbol.into();
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            let reason = if pair[0].date == pair[1].date {
                format!("duplicate date {}", pair[1].date)
            } else {
                format!("{} follows {}", pair[1].date, pair[0].date)
            };
            return Err(PivotError::InvalidSeries { symbol, reason });
        }
        Ok(Self { symbol, points })
    }

    /// Sort points by date, then validate. Duplicate dates are still rejected.
    pub fn from_unsorted(
        symbol: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Result<Self, PivotError> {
        points.sort_by_key(|p| p.date);
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    /// Position of `date` in the series, if it is a trading day of this series.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |p| p.date).ok()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
        )
    }

    #[test]
    fn new_accepts_ascending_dates_with_gaps() {
        let series = PriceSeries::new("AAPL", vec![point(2, 10.0), point(3, 11.0), point(8, 12.0)])
            .unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 8));
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let err = PriceSeries::new("AAPL", vec![point(2, 10.0), point(2, 11.0)]).unwrap_err();
        assert!(
            matches!(err, PivotError::InvalidSeries { reason, .. } if reason.contains("duplicate"))
        );
    }

    #[test]
    fn new_rejects_descending_dates() {
        let result = PriceSeries::new("AAPL", vec![point(3, 10.0), point(2, 11.0)]);
        assert!(matches!(result, Err(PivotError::InvalidSeries { .. })));
    }

    #[test]
    fn from_unsorted_orders_points() {
        let series =
            PriceSeries::from_unsorted("MSFT", vec![point(5, 12.0), point(1, 10.0), point(3, 11.0)])
                .unwrap();
        let closes: Vec<f64> = series.points().iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn index_of_finds_trading_days_only() {
        let series = PriceSeries::new("AAPL", vec![point(2, 10.0), point(3, 11.0), point(8, 12.0)])
            .unwrap();
        assert_eq!(series.index_of(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()), Some(2));
        assert_eq!(series.index_of(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()), None);
    }

    #[test]
    fn empty_series_is_valid() {
        let series = PriceSeries::new("AAPL", vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn validate_accepts_ordinary_bar() {
        assert!(point(2, 10.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_and_non_positive_prices() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for bad in [f64::NAN, f64::INFINITY, 0.0, -3.0] {
            let p = PricePoint::new(date, 10.0, 11.0, 9.0, bad);
            let reason = p.validate().unwrap_err();
            assert!(reason.starts_with("close price"), "{reason}");
        }
    }

    #[test]
    fn validate_rejects_high_below_low() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let reason = PricePoint::new(date, 10.0, 9.0, 11.0, 10.0).validate().unwrap_err();
        assert!(reason.contains("below low"));
    }

    #[test]
    fn volume_is_optional() {
        let p = point(2, 10.0);
        assert_eq!(p.volume, None);
        assert_eq!(p.with_volume(1_000).volume, Some(1_000));
    }
}
