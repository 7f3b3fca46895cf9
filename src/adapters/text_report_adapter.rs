//! Plain-text console report adapter.

use std::io::Write;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::PivotError;
use crate::domain::ranking::Ranking;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct TextReportAdapter;

fn format_pct(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        ranking: &Ranking,
        config: &AnalysisConfig,
        out: &mut dyn Write,
    ) -> Result<(), PivotError> {
        writeln!(
            out,
            "Local extrema backtest (threshold {}, filtering {}, buffer {} days, {} returns)",
            format_pct(config.threshold),
            if config.filtering_enabled { "on" } else { "off" },
            config.buffer_days,
            config.aggregation,
        )?;
        writeln!(out)?;

        if ranking.ranked.is_empty() {
            writeln!(out, "No symbols analyzed.")?;
        } else {
            writeln!(
                out,
                "{:>4}  {:<8} {:>10} {:>8} {:>6} {:>10} {:>7} {:>9} {:>8}",
                "Rank", "Symbol", "Total", "Win", "Trades", "Avg/Trade", "Sharpe", "MaxDD", "Filtered"
            )?;
            for (i, r) in ranking.ranked.iter().enumerate() {
                writeln!(
                    out,
                    "{:>4}  {:<8} {:>10} {:>7.1}% {:>6} {:>10} {:>7.2} {:>9} {:>8}",
                    i + 1,
                    r.symbol,
                    format_pct(r.total_return_pct),
                    r.win_rate * 100.0,
                    r.trade_count,
                    format_pct(r.avg_return_per_trade),
                    r.sharpe_ratio,
                    format_pct(-r.max_drawdown),
                    r.filtered_day_count,
                )?;
            }
        }

        if !ranking.errors.is_empty() {
            writeln!(out)?;
            writeln!(out, "Errors ({}):", ranking.errors.len())?;
            for r in &ranking.errors {
                writeln!(out, "  {}: {}", r.symbol, r.error.as_deref().unwrap_or("unknown"))?;
            }
        }

        let summary = ranking.summary();
        writeln!(out)?;
        writeln!(
            out,
            "Profitable: {}/{}  Average return: {}",
            summary.profitable_count,
            summary.total_count,
            format_pct(summary.average_return_pct)
        )?;
        if let Some(best) = summary.best {
            writeln!(out, "Best:  {} ({})", best.symbol, format_pct(best.total_return_pct))?;
        }
        if let Some(worst) = summary.worst {
            writeln!(out, "Worst: {} ({})", worst.symbol, format_pct(worst.total_return_pct))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::ProfitabilityResult;
    use crate::domain::ranking::rank;

    fn render(ranking: &Ranking) -> String {
        let mut buf = Vec::new();
        TextReportAdapter
            .write(ranking, &AnalysisConfig::default(), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn result(symbol: &str, total: f64) -> ProfitabilityResult {
        ProfitabilityResult {
            total_return_pct: total,
            trade_count: 1,
            ..ProfitabilityResult::empty(symbol, 0, 10)
        }
    }

    #[test]
    fn format_pct_is_signed() {
        assert_eq!(format_pct(0.1234), "+12.34%");
        assert_eq!(format_pct(-0.05), "-5.00%");
        assert_eq!(format_pct(0.0), "+0.00%");
    }

    #[test]
    fn table_lists_symbols_in_rank_order() {
        let text = render(&rank(vec![result("BBB", 0.02), result("AAA", 0.10)]));
        let aaa = text.find("AAA").unwrap();
        let bbb = text.find("BBB").unwrap();
        assert!(aaa < bbb);
        assert!(text.contains("+10.00%"));
        assert!(text.contains("Best:  AAA (+10.00%)"));
        assert!(text.contains("Worst: BBB (+2.00%)"));
        assert!(text.contains("Profitable: 2/2"));
    }

    #[test]
    fn errors_are_listed_separately() {
        let failed = ProfitabilityResult::failed(
            "ZZZ",
            &PivotError::DataSource {
                reason: "timeout".into(),
            },
        );
        let text = render(&rank(vec![failed]));
        assert!(text.contains("No symbols analyzed."));
        assert!(text.contains("Errors (1):"));
        assert!(text.contains("ZZZ: data source error: timeout"));
    }
}
