//! Result classification and final reporting.
//!
//! Once the pool has produced one `ProbeResult` per domain, this module
//! sorts them (errors last, soonest expiry first), buckets them into health
//! categories against the configured threshold, and renders the final table,
//! the per-bucket summary bars, the overall verdict, and the structured log
//! lines for an external log sink.

use chrono::Local;
use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use std::fmt::Write as _;
use strum_macros::Display;

use crate::ProbeResult;

/// Width of the per-bucket summary bars.
const BAR_WIDTH: usize = 40;

/// Error messages are truncated to this many columns in the report.
const ERROR_WIDTH: usize = 50;

/// Health category of one completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HealthBucket {
    #[strum(serialize = "VALID")]
    Valid,
    #[strum(serialize = "EXPIRING SOON")]
    ExpiringSoon,
    #[strum(serialize = "EXPIRED")]
    Expired,
    #[strum(serialize = "CONNECTION ERROR")]
    ConnectionError,
}

/// Overall health verdict for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Verdict {
    #[strum(serialize = "ALL CERTIFICATES HEALTHY")]
    AllHealthy,
    #[strum(serialize = "MONITORING NEEDED")]
    MonitoringNeeded,
    #[strum(serialize = "ATTENTION REQUIRED")]
    AttentionRequired,
}

/// Buckets one result against the expiring-soon threshold.
pub fn classify(result: &ProbeResult, threshold: i64) -> HealthBucket {
    if result.is_error() {
        return HealthBucket::ConnectionError;
    }
    match result.days_remaining {
        Some(days) if days <= 0 => HealthBucket::Expired,
        Some(days) if days <= threshold => HealthBucket::ExpiringSoon,
        Some(_) => HealthBucket::Valid,
        // Should not happen outside the error case; treat as long expired.
        None => HealthBucket::Expired,
    }
}

/// Sorts for display: errored results last; among the rest, ascending days
/// remaining, with a missing value sorting as far in the past.
pub fn sort_results(results: &mut [ProbeResult]) {
    results.sort_by_key(|r| (r.is_error(), r.days_remaining.unwrap_or(i64::MIN)));
}

/// Aggregate counts per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub connection_errors: usize,
}

impl Summary {
    pub fn from_results(results: &[ProbeResult], threshold: i64) -> Self {
        let mut summary = Summary {
            total: results.len(),
            valid: 0,
            expiring_soon: 0,
            expired: 0,
            connection_errors: 0,
        };
        for result in results {
            match classify(result, threshold) {
                HealthBucket::Valid => summary.valid += 1,
                HealthBucket::ExpiringSoon => summary.expiring_soon += 1,
                HealthBucket::Expired => summary.expired += 1,
                HealthBucket::ConnectionError => summary.connection_errors += 1,
            }
        }
        summary
    }

    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.expired > 0 || self.connection_errors > 0 {
            Verdict::AttentionRequired
        } else if self.expiring_soon > 0 {
            Verdict::MonitoringNeeded
        } else {
            Verdict::AllHealthy
        }
    }
}

/// Renders the full post-run report: per-domain table, bucket summary with
/// bars, and the overall verdict. Sorts a copy of the results itself.
pub fn render_report(results: &[ProbeResult], threshold: i64) -> String {
    let mut results = results.to_vec();
    sort_results(&mut results);
    let summary = Summary::from_results(&results, threshold);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Domain", "Status", "Expires", "Days left"]);

    for result in &results {
        let bucket = classify(result, threshold);
        let status = Cell::new(bucket.to_string()).fg(bucket_color(bucket));
        match (&result.expiry_date, result.days_remaining, &result.error) {
            (Some(expiry), Some(days), _) => {
                table.add_row(vec![
                    Cell::new(&result.domain),
                    status,
                    Cell::new(expiry.format("%Y-%m-%d").to_string()),
                    Cell::new(days.to_string()),
                ]);
            }
            (_, _, error) => {
                let message = error.as_deref().unwrap_or("unknown error");
                let message: String = message.chars().take(ERROR_WIDTH).collect();
                table.add_row(vec![
                    Cell::new(&result.domain),
                    status,
                    Cell::new(message),
                    Cell::new("-"),
                ]);
            }
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "RESULTS".bold().blue());
    let _ = writeln!(out, "{}", table);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "CERTIFICATE HEALTH SUMMARY".bold().cyan());

    let rows = [
        (summary.valid, HealthBucket::Valid),
        (summary.expiring_soon, HealthBucket::ExpiringSoon),
        (summary.expired, HealthBucket::Expired),
        (summary.connection_errors, HealthBucket::ConnectionError),
    ];
    for (count, bucket) in rows {
        if count == 0 {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<20} {:>3} / {:<3} ({:5.1}%)",
            bucket,
            count,
            summary.total,
            summary.percentage(count)
        );
        let _ = writeln!(out, "   {}", status_bar(count, summary.total));
    }

    let verdict = summary.verdict();
    let verdict_text = match verdict {
        Verdict::AllHealthy => verdict.to_string().green(),
        Verdict::MonitoringNeeded => verdict.to_string().yellow(),
        Verdict::AttentionRequired => verdict.to_string().red(),
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "OVERALL STATUS: {}", verdict_text.bold());
    out
}

/// One log line per final domain disposition, for an external log sink.
///
/// Severity mapping: expired → CRITICAL, unreachable → ERROR, expiring soon
/// → WARNING, valid → INFO.
pub fn log_lines(results: &[ProbeResult], threshold: i64) -> Vec<String> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    results
        .iter()
        .map(|result| {
            let bucket = classify(result, threshold);
            let message = match (&result.expiry_date, result.days_remaining, &result.error) {
                (Some(expiry), Some(days), _) => format!(
                    "{} certificate expires {} ({} days remaining)",
                    result.domain,
                    expiry.format("%Y-%m-%d"),
                    days
                ),
                (_, _, error) => format!(
                    "{} unreachable: {}",
                    result.domain,
                    error.as_deref().unwrap_or("unknown error")
                ),
            };
            format!("{} [{}] {}", timestamp, severity(bucket), message)
        })
        .collect()
}

fn severity(bucket: HealthBucket) -> &'static str {
    match bucket {
        HealthBucket::Expired => "CRITICAL",
        HealthBucket::ConnectionError => "ERROR",
        HealthBucket::ExpiringSoon => "WARNING",
        HealthBucket::Valid => "INFO",
    }
}

fn bucket_color(bucket: HealthBucket) -> Color {
    match bucket {
        HealthBucket::Valid => Color::Green,
        HealthBucket::ExpiringSoon => Color::Yellow,
        HealthBucket::Expired | HealthBucket::ConnectionError => Color::Red,
    }
}

fn status_bar(count: usize, total: usize) -> String {
    if total == 0 {
        return String::new();
    }
    let filled = BAR_WIDTH * count / total;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
