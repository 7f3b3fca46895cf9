//! Per-symbol profitability metrics.

use serde::Serialize;

use super::config::ReturnAggregation;
use super::error::PivotError;
use super::position::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitabilityResult {
    pub symbol: String,
    pub total_return_pct: f64,
    /// Fraction of trades with a positive return; 0 when there are no trades.
    pub win_rate: f64,
    pub trade_count: usize,
    pub profitable_trades: usize,
    pub avg_return_per_trade: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub filtered_day_count: usize,
    pub analysis_days: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfitabilityResult {
    /// A result with no trades.
    pub fn empty(symbol: &str, filtered_day_count: usize, analysis_days: usize) -> Self {
        ProfitabilityResult {
            symbol: symbol.to_string(),
            total_return_pct: 0.0,
            win_rate: 0.0,
            trade_count: 0,
            profitable_trades: 0,
            avg_return_per_trade: 0.0,
            max_drawdown: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            filtered_day_count,
            analysis_days,
            error: None,
        }
    }

    /// An error-tagged result for a symbol that could not be processed.
    pub fn failed(symbol: &str, error: &PivotError) -> Self {
        ProfitabilityResult {
            error: Some(error.to_string()),
            ..Self::empty(symbol, 0, 0)
        }
    }

    pub fn from_trades(
        symbol: &str,
        trades: &[Trade],
        aggregation: ReturnAggregation,
        filtered_day_count: usize,
        analysis_days: usize,
    ) -> Self {
        if trades.is_empty() {
            return Self::empty(symbol, filtered_day_count, analysis_days);
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let n = returns.len() as f64;

        let total_return_pct = match aggregation {
            ReturnAggregation::Additive => returns.iter().sum(),
            ReturnAggregation::Compounded => returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0,
        };

        let profitable_trades = trades.iter().filter(|t| t.is_win()).count();
        let win_rate = profitable_trades as f64 / n;
        let avg_return_per_trade = returns.iter().sum::<f64>() / n;

        let variance = returns
            .iter()
            .map(|r| (r - avg_return_per_trade).powi(2))
            .sum::<f64>()
            / n;
        let volatility = variance.sqrt();
        let sharpe_ratio = if volatility > 0.0 {
            avg_return_per_trade / volatility
        } else {
            0.0
        };

        ProfitabilityResult {
            symbol: symbol.to_string(),
            total_return_pct,
            win_rate,
            trade_count: trades.len(),
            profitable_trades,
            avg_return_per_trade,
            max_drawdown: compute_drawdown(&returns),
            volatility,
            sharpe_ratio,
            filtered_day_count,
            analysis_days,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Largest peak-to-trough decline of the equity curve obtained by compounding
/// trade returns from a starting value of 1.0.
fn compute_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = equity;
    let mut max_dd = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
