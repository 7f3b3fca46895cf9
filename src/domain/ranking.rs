//! Cross-symbol ranking of profitability results.

use serde::Serialize;
use std::cmp::Ordering;

use super::metrics::ProfitabilityResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Successful results, best total return first.
    pub ranked: Vec<ProfitabilityResult>,
    /// Error-tagged results in input order.
    pub errors: Vec<ProfitabilityResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingSummary<'a> {
    pub best: Option<&'a ProfitabilityResult>,
    pub worst: Option<&'a ProfitabilityResult>,
    pub profitable_count: usize,
    pub total_count: usize,
    pub average_return_pct: f64,
}

/// Order results by descending total return, ties by ascending symbol.
pub fn rank(results: Vec<ProfitabilityResult>) -> Ranking {
    let (errors, mut ranked): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_error());
    ranked.sort_by(compare_results);
    Ranking { ranked, errors }
}

fn compare_results(a: &ProfitabilityResult, b: &ProfitabilityResult) -> Ordering {
    b.total_return_pct
        .total_cmp(&a.total_return_pct)
        .then_with(|| a.symbol.cmp(&b.symbol))
}

impl Ranking {
    pub fn summary(&self) -> RankingSummary<'_> {
        let total_count = self.ranked.len();
        let profitable_count = self.ranked.iter().filter(|r| r.total_return_pct > 0.0).count();
        let average_return_pct = if total_count > 0 {
            self.ranked.iter().map(|r| r.total_return_pct).sum::<f64>() / total_count as f64
        } else {
            0.0
        };

        RankingSummary {
            best: self.ranked.first(),
            worst: if total_count > 1 { self.ranked.last() } else { None },
            profitable_count,
            total_count,
            average_return_pct,
        }
    }
}
