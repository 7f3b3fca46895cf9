//! JSON report adapter.

use serde::Serialize;
use std::io::Write;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::PivotError;
use crate::domain::metrics::ProfitabilityResult;
use crate::domain::ranking::Ranking;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    best: Option<&'a str>,
    worst: Option<&'a str>,
    profitable_count: usize,
    total_count: usize,
    average_return_pct: f64,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    config: &'a AnalysisConfig,
    results: &'a [ProfitabilityResult],
    errors: &'a [ProfitabilityResult],
    summary: SummaryDocument<'a>,
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        ranking: &Ranking,
        config: &AnalysisConfig,
        out: &mut dyn Write,
    ) -> Result<(), PivotError> {
        let summary = ranking.summary();
        let document = ReportDocument {
            config,
            results: &ranking.ranked,
            errors: &ranking.errors,
            summary: SummaryDocument {
                best: summary.best.map(|r| r.symbol.as_str()),
                worst: summary.worst.map(|r| r.symbol.as_str()),
                profitable_count: summary.profitable_count,
                total_count: summary.total_count,
                average_return_pct: summary.average_return_pct,
            },
        };

        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &document)
        } else {
            serde_json::to_writer(&mut *out, &document)
        };
        written.map_err(|e| PivotError::Io(e.into()))?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ranking::rank;

    fn result(symbol: &str, total: f64) -> ProfitabilityResult {
        ProfitabilityResult {
            total_return_pct: total,
            trade_count: 2,
            profitable_trades: 1,
            win_rate: 0.5,
            ..ProfitabilityResult::empty(symbol, 0, 20)
        }
    }

    fn render(ranking: &Ranking) -> serde_json::Value {
        let mut buf = Vec::new();
        JsonReportAdapter::new()
            .write(ranking, &AnalysisConfig::default(), &mut buf)
            .unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn results_are_in_ranked_order() {
        let ranking = rank(vec![result("LOW", -0.1), result("HIGH", 0.3)]);
        let doc = render(&ranking);

        let results = doc["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["symbol"], "HIGH");
        assert_eq!(results[1]["symbol"], "LOW");
        assert_eq!(results[0]["trade_count"], 2);
        assert!(results[0].get("error").is_none());
        assert_eq!(doc["summary"]["best"], "HIGH");
        assert_eq!(doc["summary"]["worst"], "LOW");
    }

    #[test]
    fn errors_carry_their_message() {
        let failed = ProfitabilityResult::failed(
            "BAD",
            &PivotError::DataSource {
                reason: "no such file".into(),
            },
        );
        let doc = render(&rank(vec![failed]));

        assert!(doc["results"].as_array().unwrap().is_empty());
        assert_eq!(doc["errors"][0]["symbol"], "BAD");
        assert!(doc["errors"][0]["error"].as_str().unwrap().contains("no such file"));
        assert!(doc["summary"]["best"].is_null());
    }

    #[test]
    fn config_is_echoed() {
        let doc = render(&Ranking::default());
        assert_eq!(doc["config"]["threshold"], 0.25);
        assert_eq!(doc["config"]["aggregation"], "additive");
        assert!(doc["config"]["max_hold_days"].is_null());
    }
}
