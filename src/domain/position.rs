//! Open positions and closed trades.

use chrono::NaiveDate;
use serde::Serialize;

/// A long position waiting for its exit.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl OpenPosition {
    /// Trading days held as of the point at `index`.
    pub fn days_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    pub fn close(self, symbol: &str, exit_date: NaiveDate, exit_price: f64, reason: ExitReason) -> Trade {
        Trade {
            symbol: symbol.to_string(),
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date,
            exit_price,
            return_pct: (exit_price - self.entry_price) / self.entry_price,
            exit_reason: reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    MaxHold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.return_pct > 0.0
    }
}
