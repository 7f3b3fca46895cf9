//! Price data access port.

use crate::domain::error::PivotError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch the daily series for `symbol` between the two dates, inclusive.
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PivotError>;

    fn list_symbols(&self) -> Result<Vec<String>, PivotError>;
}
