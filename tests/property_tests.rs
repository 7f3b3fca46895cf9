//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Result bounds: win rate in [0, 1], zero trades means zero return
//! 2. Idempotence of classification and extreme-event detection
//! 3. Short series produce no signals and no trades
//! 4. Universe filter purity and the length limit
//! 5. A single extreme event excludes exactly the clipped buffer window

mod common;

use common::*;
use pivotscan::domain::analysis::analyze_series;
use pivotscan::domain::config::{AnalysisConfig, DEFAULT_DENYLIST};
use pivotscan::domain::extreme::detect_extreme_events;
use pivotscan::domain::signal::{Signal, classify};
use pivotscan::domain::universe::{CatalogEntry, filter_universe, select_universe};
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────────

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 0..max_len)
}

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-Z0-9]{0,8}"
}

fn arb_catalog() -> impl Strategy<Value = Vec<CatalogEntry>> {
    prop::collection::vec(
        (arb_symbol(), "[A-Za-z ]{0,20}").prop_map(|(s, l)| CatalogEntry::new(s, l)),
        0..30,
    )
}

fn denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect()
}

// ── 1. Result bounds ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn win_rate_is_a_fraction(closes in arb_closes(80), threshold in 0.01..1.0_f64) {
        let series = series_from_closes("PROP", &closes);
        let config = AnalysisConfig { threshold, ..AnalysisConfig::default() };
        let result = analyze_series(&series, &config).result;

        prop_assert!((0.0..=1.0).contains(&result.win_rate));
        prop_assert!(result.profitable_trades <= result.trade_count);
        prop_assert!(result.filtered_day_count <= series.len());
        prop_assert_eq!(result.analysis_days + result.filtered_day_count, series.len());
        if result.trade_count == 0 {
            prop_assert_eq!(result.total_return_pct, 0.0);
            prop_assert_eq!(result.win_rate, 0.0);
        }
    }
}

// ── 2. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn classify_and_detect_are_repeatable(closes in arb_closes(60)) {
        let series = series_from_closes("PROP", &closes);
        let first: Vec<Signal> = classify(&series).collect();
        let second: Vec<Signal> = classify(&series).collect();
        prop_assert_eq!(first, second);

        let config = AnalysisConfig::default();
        prop_assert_eq!(detect_extreme_events(&series, &config), detect_extreme_events(&series, &config));
    }
}

// ── 3. Short series ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_series_never_trade(closes in arb_closes(3)) {
        let series = series_from_closes("TINY", &closes);
        prop_assert_eq!(classify(&series).count(), 0);
        let result = analyze_series(&series, &AnalysisConfig::default()).result;
        prop_assert_eq!(result.trade_count, 0);
        prop_assert_eq!(result.total_return_pct, 0.0);
    }
}

// ── 4. Universe filter ───────────────────────────────────────────────

proptest! {
    #[test]
    fn six_character_symbols_are_always_rejected(symbol in "[A-Z]{6}", label in "[A-Za-z ]{0,20}") {
        let catalog = vec![CatalogEntry::new(symbol, label)];
        prop_assert!(filter_universe(&catalog, &[], 5).is_empty());
    }

    #[test]
    fn denylisted_symbols_are_rejected_at_any_length(pattern in "[A-Z]{1,5}") {
        let catalog = vec![CatalogEntry::new(pattern.clone(), "")];
        prop_assert!(filter_universe(&catalog, &[pattern], 5).is_empty());
    }

    #[test]
    fn universe_filter_is_pure(catalog in arb_catalog()) {
        let list = denylist();
        let first = select_universe(&catalog, &list, 5);
        let second = select_universe(&catalog, &list, 5);
        prop_assert_eq!(&first, &second);

        // Every output is short, unique and comes from the input in order.
        let mut seen = std::collections::HashSet::new();
        let mut cursor = 0;
        for symbol in &first.symbols {
            prop_assert!(symbol.chars().count() <= 5);
            prop_assert!(seen.insert(symbol.clone()));
            let pos = catalog[cursor..].iter().position(|e| e.symbol.trim() == symbol);
            prop_assert!(pos.is_some());
            cursor += pos.unwrap_or(0) + 1;
        }
        prop_assert_eq!(first.symbols.len() + first.rejected.len(), catalog.len());
    }
}

// ── 5. Exclusion window ──────────────────────────────────────────────

proptest! {
    #[test]
    fn single_event_excludes_clipped_window(len in 2usize..40, jump_seed in 0usize..1000, buffer in 0usize..5) {
        // Flat at 100, doubling to 200 at index k: exactly one event, at k.
        let k = 1 + jump_seed % (len - 1);
        let closes: Vec<f64> = (0..len).map(|i| if i < k { 100.0 } else { 200.0 }).collect();
        let series = series_from_closes("JUMP", &closes);
        let config = AnalysisConfig { buffer_days: buffer, ..AnalysisConfig::default() };

        let report = detect_extreme_events(&series, &config);
        prop_assert_eq!(report.events.len(), 1);

        let lo = k.saturating_sub(buffer);
        let hi = (k + buffer).min(len - 1);
        let expected: std::collections::BTreeSet<_> =
            series.points()[lo..=hi].iter().map(|p| p.date).collect();
        prop_assert_eq!(report.excluded, expected);
    }
}
