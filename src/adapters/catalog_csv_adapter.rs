//! Symbol catalog CSV adapter.
//!
//! The first row is always a header. `Stock Symbol,Company Name` and
//! `symbol,name` headers select their columns by name; any other header falls
//! back to the first and second columns.

use crate::domain::error::PivotError;
use crate::domain::universe::CatalogEntry;
use crate::ports::catalog_port::CatalogPort;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

const SYMBOL_HEADERS: [&str; 3] = ["stock symbol", "symbol", "ticker"];
const LABEL_HEADERS: [&str; 3] = ["company name", "name", "security name"];

pub struct CatalogCsvAdapter {
    path: PathBuf,
}

impl CatalogCsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn parse(content: &str) -> Result<Vec<CatalogEntry>, PivotError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| PivotError::DataSource {
                reason: format!("catalog header error: {}", e),
            })?
            .clone();
        let symbol_col = find_column(&headers, &SYMBOL_HEADERS).unwrap_or(0);
        let label_col = find_column(&headers, &LABEL_HEADERS).unwrap_or(1);

        let mut entries = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PivotError::DataSource {
                reason: format!("catalog parse error: {}", e),
            })?;
            let symbol = record.get(symbol_col).unwrap_or("").to_uppercase();
            if symbol.is_empty() {
                continue;
            }
            let label = record.get(label_col).unwrap_or("");
            entries.push(CatalogEntry::new(symbol, label));
        }

        Ok(entries)
    }
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

impl CatalogPort for CatalogCsvAdapter {
    fn load_catalog(&self) -> Result<Vec<CatalogEntry>, PivotError> {
        let content = fs::read_to_string(&self.path).map_err(|e| PivotError::DataSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let entries = Self::parse(&content)?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "loaded catalog");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn symbols(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    #[test]
    fn parses_stock_symbol_headers() {
        let content = "Stock Symbol,Company Name\n\
            AAPL,Apple Inc.\n\
            SPY,SPDR S&P 500 ETF Trust\n";
        let entries = CatalogCsvAdapter::parse(content).unwrap();
        assert_eq!(
            entries,
            vec![
                CatalogEntry::new("AAPL", "Apple Inc."),
                CatalogEntry::new("SPY", "SPDR S&P 500 ETF Trust"),
            ]
        );
    }

    #[test]
    fn locates_columns_by_name() {
        let content = "name,exchange,symbol\nMicrosoft,NASDAQ,msft\n";
        let entries = CatalogCsvAdapter::parse(content).unwrap();
        assert_eq!(entries, vec![CatalogEntry::new("MSFT", "Microsoft")]);
    }

    #[test]
    fn unknown_headers_fall_back_to_leading_columns() {
        let content = "code,description\nJPM,JPMorgan Chase\n";
        let entries = CatalogCsvAdapter::parse(content).unwrap();
        assert_eq!(entries, vec![CatalogEntry::new("JPM", "JPMorgan Chase")]);
    }

    #[test]
    fn skips_blank_and_comment_rows() {
        let content = "symbol,name\n\
            # exported nightly\n\
            \n\
            aapl , Apple Inc.\n\
            ,Nameless\n\
            KO,Coca-Cola\n";
        let entries = CatalogCsvAdapter::parse(content).unwrap();
        assert_eq!(symbols(&entries), vec!["AAPL", "KO"]);
        assert_eq!(entries[0].label, "Apple Inc.");
    }

    #[test]
    fn missing_label_column_is_empty() {
        let entries = CatalogCsvAdapter::parse("symbol\nIBM\n").unwrap();
        assert_eq!(entries, vec![CatalogEntry::new("IBM", "")]);
    }

    #[test]
    fn load_catalog_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.csv");
        fs::write(&path, "symbol,name\nAAPL,Apple\nMSFT,Microsoft\n").unwrap();

        let entries = CatalogCsvAdapter::new(path).load_catalog().unwrap();
        assert_eq!(symbols(&entries), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn load_catalog_missing_file_is_data_source_error() {
        let dir = TempDir::new().unwrap();
        let err = CatalogCsvAdapter::new(dir.path().join("absent.csv"))
            .load_catalog()
            .unwrap_err();
        assert!(matches!(err, PivotError::DataSource { .. }));
    }
}
