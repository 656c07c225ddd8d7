//! End-to-end pipeline tests against a mock data port.

mod common;

use approx::assert_relative_eq;
use common::*;
use marketdash::domain::error::MarketdashError;
use marketdash::domain::metrics::{MarketCapUnit, Period};
use marketdash::domain::pipeline::{collect_rows, process_symbol, PipelineConfig, SymbolOutcome};
use marketdash::domain::report::{news_columns, Report};
use marketdash::domain::symbol::{Symbol, WatchList};

fn watch_list(stocks: &[&str], indexes: &[&str]) -> WatchList {
    let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    WatchList::new(&owned(stocks), &owned(indexes)).unwrap()
}

fn config(min_sessions: usize) -> PipelineConfig {
    PipelineConfig {
        min_sessions,
        market_cap_unit: MarketCapUnit::HundredMillion,
        as_of: date("2024-03-26"),
    }
}

#[test]
fn changes_match_lookback_ratio_with_full_history() {
    let closes = rising_closes(300);
    let port = MockDataPort::new()
        .with_closes("HDFCBANK.NS", &closes)
        .with_fundamentals("HDFCBANK.NS", stock_fundamentals());

    let summary = collect_rows(&port, &watch_list(&["HDFCBANK.NS"], &[]), &config(30));
    assert_eq!(summary.succeeded(), 1);
    let row = &summary.rows[0];

    let latest = closes[299];
    for period in [Period::Daily, Period::Weekly, Period::Monthly, Period::Yearly] {
        let n = period.sessions().unwrap();
        let expected = latest / closes[299 - n] - 1.0;
        assert_relative_eq!(row.changes.get(period).unwrap(), expected, epsilon = 1e-12);
    }
}

#[test]
fn ytd_uses_first_session_of_latest_year() {
    // 2023-06-01 plus 214 days is 2024-01-01.
    let closes = rising_closes(300);
    let port = MockDataPort::new().with_closes("BEL.NS", &closes);

    let summary = collect_rows(&port, &watch_list(&["BEL.NS"], &[]), &config(30));
    let ytd = summary.rows[0].changes.ytd.unwrap();
    assert_relative_eq!(ytd, closes[299] / closes[214] - 1.0, epsilon = 1e-12);
}

#[test]
fn ytd_missing_when_run_year_has_no_session() {
    let port = MockDataPort::new().with_closes("BEL.NS", &rising_closes(300));
    let next_year = PipelineConfig {
        as_of: date("2025-01-01"),
        ..config(30)
    };

    let summary = collect_rows(&port, &watch_list(&["BEL.NS"], &[]), &next_year);
    let changes = &summary.rows[0].changes;
    assert!(changes.ytd.is_none());
    assert!(changes.daily.is_some());
}

#[test]
fn short_history_leaves_yearly_missing() {
    let port = MockDataPort::new().with_closes("HAL.NS", &rising_closes(252));

    let summary = collect_rows(&port, &watch_list(&["HAL.NS"], &[]), &config(30));
    let row = &summary.rows[0];
    assert!(row.changes.yearly.is_none());
    assert!(row.changes.monthly.is_some());
    assert!(row.changes.daily.is_some());
}

#[test]
fn four_point_series_daily_change() {
    let port = MockDataPort::new().with_closes("RELIANCE.NS", &[100.0, 105.0, 98.0, 110.0]);

    let summary = collect_rows(&port, &watch_list(&["RELIANCE.NS"], &[]), &config(2));
    let changes = &summary.rows[0].changes;
    assert_relative_eq!(changes.daily.unwrap(), 110.0 / 98.0 - 1.0, epsilon = 1e-12);
    assert_relative_eq!(changes.daily.unwrap(), 0.1224, epsilon = 1e-4);
    assert!(changes.weekly.is_none());
    assert!(changes.monthly.is_none());
    assert!(changes.yearly.is_none());
}

#[test]
fn etf_without_pe_keeps_other_fields() {
    let port = MockDataPort::new()
        .with_closes("GOLDBEES.NS", &rising_closes(60))
        .with_fundamentals("GOLDBEES.NS", etf_fundamentals());

    let summary = collect_rows(&port, &watch_list(&["GOLDBEES.NS"], &[]), &config(30));
    let row = &summary.rows[0];
    assert!(row.pe_ratio.is_none());
    assert!(row.industry_pe.is_none());
    assert_relative_eq!(row.market_cap.unwrap(), 1_100.0);
    assert_eq!(row.beta, Some(0.12));
    assert!(row.changes.daily.is_some());
}

#[test]
fn market_cap_uses_configured_unit() {
    let port = MockDataPort::new()
        .with_closes("HDFCBANK.NS", &rising_closes(40))
        .with_fundamentals("HDFCBANK.NS", stock_fundamentals());
    let crore = PipelineConfig {
        min_sessions: 30,
        market_cap_unit: MarketCapUnit::Crore,
        as_of: date("2024-03-26"),
    };

    let summary = collect_rows(&port, &watch_list(&["HDFCBANK.NS"], &[]), &crore);
    assert_relative_eq!(summary.rows[0].market_cap.unwrap(), 1_250_000.0);
}

#[test]
fn failed_symbols_are_skipped_and_order_is_kept() {
    let port = MockDataPort::new()
        .with_closes("HDFCBANK.NS", &rising_closes(40))
        .with_error("RELIANCE.NS", "connection reset")
        .with_closes("BEL.NS", &rising_closes(40))
        .with_closes("^NSEI", &rising_closes(40));

    let list = watch_list(&["HDFCBANK.NS", "RELIANCE.NS", "BEL.NS"], &["^NSEI"]);
    let summary = collect_rows(&port, &list, &config(30));

    let symbols: Vec<&str> = summary.rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["HDFCBANK.NS", "BEL.NS", "^NSEI"]);
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.skipped[0].symbol, "RELIANCE.NS");
    assert!(summary.skipped[0].reason.to_string().contains("connection reset"));
    assert_eq!(
        *port.requests.borrow(),
        vec!["HDFCBANK.NS", "RELIANCE.NS", "BEL.NS", "^NSEI"]
    );
}

#[test]
fn empty_history_is_unavailable() {
    let port = MockDataPort::new();
    let outcome = process_symbol(&port, &Symbol::stock("TATAMOTORS.NS"), &config(30));
    match outcome {
        SymbolOutcome::Skipped { symbol, reason } => {
            assert_eq!(symbol, "TATAMOTORS.NS");
            assert!(matches!(reason, MarketdashError::DataUnavailable { .. }));
        }
        SymbolOutcome::Reported(_) => panic!("expected skip"),
    }
}

#[test]
fn too_few_sessions_is_insufficient() {
    let port = MockDataPort::new().with_closes("BHARTIARTL.NS", &rising_closes(10));
    let outcome = process_symbol(&port, &Symbol::stock("BHARTIARTL.NS"), &config(30));
    match outcome {
        SymbolOutcome::Skipped { reason, .. } => assert!(matches!(
            reason,
            MarketdashError::InsufficientData {
                sessions: 10,
                minimum: 30,
                ..
            }
        )),
        SymbolOutcome::Reported(_) => panic!("expected skip"),
    }
}

#[test]
fn fundamentals_failure_still_reports_changes() {
    let port = MockDataPort::new()
        .with_closes("^BSESN", &rising_closes(40))
        .with_fundamentals_error("^BSESN");

    let outcome = process_symbol(&port, &Symbol::index("^BSESN"), &config(30));
    match outcome {
        SymbolOutcome::Reported(row) => {
            assert!(row.changes.daily.is_some());
            assert!(row.pe_ratio.is_none());
            assert!(row.market_cap.is_none());
        }
        SymbolOutcome::Skipped { reason, .. } => panic!("unexpected skip: {reason}"),
    }
}

#[test]
fn all_failures_give_empty_summary() {
    let port = MockDataPort::new()
        .with_error("HDFCBANK.NS", "timeout")
        .with_error("^NSEI", "timeout");

    let summary = collect_rows(&port, &watch_list(&["HDFCBANK.NS"], &["^NSEI"]), &config(30));
    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.failed(), 2);

    let report = Report::new(summary.rows, MarketCapUnit::default());
    assert_eq!(report.dashboard_rows().count(), 0);
    assert_eq!(report.news_rows().count(), 2);
}

#[test]
fn placeholder_news_is_identical_across_runs() {
    let ok = MockDataPort::new()
        .with_closes("HDFCBANK.NS", &rising_closes(40))
        .with_closes("RELIANCE.NS", &rising_closes(40));
    let failing = MockDataPort::new().with_error("HDFCBANK.NS", "down");
    let list = watch_list(&["HDFCBANK.NS", "RELIANCE.NS"], &[]);

    let first = Report::new(collect_rows(&ok, &list, &config(30)).rows, MarketCapUnit::default());
    let second = Report::new(
        collect_rows(&failing, &list, &config(30)).rows,
        MarketCapUnit::default(),
    );

    assert_eq!(first.news, second.news);
    let first_rows: Vec<_> = first.news_rows().collect();
    let second_rows: Vec<_> = second.news_rows().collect();
    assert_eq!(first_rows, second_rows);
    assert!(first_rows.iter().all(|r| r.len() == news_columns().len()));
}
