//! End-to-end tests for the probe engine with stubbed probe functions.
//!
//! These cover the full dispatcher → registry → display → reporter path
//! without touching the network.

use chrono::NaiveDate;
use std::time::Duration;

use certsweep::display::StatusDisplay;
use certsweep::pool::Dispatcher;
use certsweep::report::{classify, render_report, HealthBucket, Summary, Verdict};
use certsweep::ProbeResult;

fn domains(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn valid_result(domain: &str, days: i64) -> ProbeResult {
    let expiry = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    ProbeResult::ok(domain, expiry, days)
}

#[test]
fn test_all_valid_run_is_healthy() {
    let display = StatusDisplay::new(Vec::new());
    let dispatcher = Dispatcher::new(443, 10).with_tick(Duration::from_millis(5));

    let results = dispatcher.run_with(
        &domains(&["a.example", "b.example"]),
        &display,
        |domain, _| valid_result(domain, 100),
    );

    assert_eq!(results.len(), 2);
    let summary = Summary::from_results(&results, 15);
    assert_eq!(summary.valid, 2);
    assert_eq!(summary.expiring_soon, 0);
    assert_eq!(summary.expired, 0);
    assert_eq!(summary.connection_errors, 0);
    assert_eq!(summary.verdict(), Verdict::AllHealthy);

    let report = render_report(&results, 15);
    assert!(report.contains("a.example"));
    assert!(report.contains("b.example"));
    assert!(report.contains("ALL CERTIFICATES HEALTHY"));
}

#[test]
fn test_unreachable_domain_needs_attention() {
    let display = StatusDisplay::new(Vec::new());
    let dispatcher = Dispatcher::new(443, 10).with_tick(Duration::from_millis(5));

    let results = dispatcher.run_with(
        &domains(&["up.example", "down.example"]),
        &display,
        |domain, _| {
            if domain == "down.example" {
                ProbeResult::failed(domain, "connection refused")
            } else {
                valid_result(domain, 100)
            }
        },
    );

    let down = results
        .iter()
        .find(|r| r.domain == "down.example")
        .unwrap();
    assert!(down.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(down.expiry_date.is_none());
    assert_eq!(classify(down, 15), HealthBucket::ConnectionError);

    let summary = Summary::from_results(&results, 15);
    assert_eq!(summary.verdict(), Verdict::AttentionRequired);

    // The failed domain shows as an error cell in the live display.
    let out = String::from_utf8(display.into_inner()).unwrap();
    assert!(out.contains("error"));
    assert!(out.contains("Progress: 2/2 domains completed - All done!"));
}

#[test]
fn test_display_block_cleared_after_run() {
    let display = StatusDisplay::new(Vec::new());
    let dispatcher = Dispatcher::new(443, 2).with_tick(Duration::from_millis(5));

    dispatcher.run_with(
        &domains(&["a.example", "b.example", "c.example", "d.example"]),
        &display,
        |domain, _| valid_result(domain, 100),
    );

    // The dispatcher joined the ticker, so this clear cannot race a render.
    let lines = display.lines_printed();
    display.clear();
    assert_eq!(display.lines_printed(), 0);

    let out = String::from_utf8(display.into_inner()).unwrap();
    let clears = out.matches("\x1b[1A\x1b[2K").count();
    assert_eq!(clears, lines);
}

#[test]
fn test_mixed_run_buckets_everything_once() {
    let display = StatusDisplay::new(Vec::new());
    let dispatcher = Dispatcher::new(443, 4).with_tick(Duration::from_millis(5));

    let results = dispatcher.run_with(
        &domains(&[
            "valid.example",
            "soon.example",
            "expired.example",
            "down.example",
        ]),
        &display,
        |domain, _| match domain {
            "valid.example" => valid_result(domain, 90),
            "soon.example" => valid_result(domain, 7),
            "expired.example" => valid_result(domain, -3),
            _ => ProbeResult::failed(domain, "connection refused"),
        },
    );

    let summary = Summary::from_results(&results, 15);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.valid, 1);
    assert_eq!(summary.expiring_soon, 1);
    assert_eq!(summary.expired, 1);
    assert_eq!(summary.connection_errors, 1);
    assert_eq!(summary.verdict(), Verdict::AttentionRequired);
    assert_eq!(summary.percentage(summary.valid), 25.0);
}
