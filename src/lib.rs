//! pivotscan: local price extrema detection and backtesting.
//!
//! Hexagonal architecture: the pure detection and backtesting core lives in
//! [`domain`], I/O seams are traits in [`ports`], concrete implementations in
//! [`adapters`], and [`cli`] wires them together.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
