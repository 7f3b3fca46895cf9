//! CSV file price adapter. One `<SYMBOL>.csv` per symbol under a base
//! directory, columns `date,open,high,low,close[,volume]`.

use crate::domain::error::PivotError;
use crate::domain::ohlcv::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn price_column(record: &StringRecord, index: usize, name: &str) -> Result<f64, PivotError> {
        record
            .get(index)
            .ok_or_else(|| PivotError::DataSource {
                reason: format!("missing {} column", name),
            })?
            .trim()
            .parse()
            .map_err(|e| PivotError::DataSource {
                reason: format!("invalid {} value: {}", name, e),
            })
    }

    fn parse_record(record: &StringRecord) -> Result<PricePoint, PivotError> {
        let date_str = record.get(0).ok_or_else(|| PivotError::DataSource {
            reason: "missing date column".into(),
        })?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
            PivotError::DataSource {
                reason: format!("invalid date format: {}", e),
            }
        })?;

        let open = Self::price_column(record, 1, "open")?;
        let high = Self::price_column(record, 2, "high")?;
        let low = Self::price_column(record, 3, "low")?;
        let close = Self::price_column(record, 4, "close")?;
        let point = PricePoint::new(date, open, high, low, close);
        point.validate().map_err(|reason| PivotError::DataSource {
            reason: format!("bad row for {}: {}", date, reason),
        })?;

        match record.get(5).map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => {
                let volume: u64 = raw.parse().map_err(|e| PivotError::DataSource {
                    reason: format!("invalid volume value: {}", e),
                })?;
                Ok(point.with_volume(volume))
            }
            None => Ok(point),
        }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PivotError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PivotError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PivotError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let point = Self::parse_record(&record)?;
            if point.date < start_date || point.date > end_date {
                continue;
            }
            points.push(point);
        }

        tracing::debug!(symbol, points = points.len(), "loaded price history");
        PriceSeries::from_unsorted(symbol, points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, PivotError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PivotError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PivotError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
