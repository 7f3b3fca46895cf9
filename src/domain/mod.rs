//! Core domain types and logic. Nothing in here performs I/O.

pub mod ohlcv;
pub mod signal;
pub mod extreme;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod universe;
pub mod ranking;
pub mod config;
pub mod analysis;
pub mod error;
