use lazy_static::lazy_static;
use prometheus::{labels, register_gauge, Gauge};

use crate::report::classify;
use crate::ProbeResult;

lazy_static! {
    static ref CERTSWEEP_DAYS_BEFORE_EXPIRY: Gauge = register_gauge!(
        "certsweep_days_before_expiry",
        "days before certificate expiry"
    )
    .unwrap();
}

/// Function to push metrics to prometheus
/// # Arguments
/// * `results` - Slice of finished probe results
/// * `threshold` - Expiring-soon threshold in days, used for the status label
/// * `prometheus_address` - String of prometheus push gateway address
pub fn prometheus_metrics(results: &[ProbeResult], threshold: i64, prometheus_address: &str) {
    for result in results.iter() {
        // Unreachable hosts have no expiry to report.
        let days = match result.days_remaining {
            Some(days) => days,
            None => continue,
        };
        CERTSWEEP_DAYS_BEFORE_EXPIRY.set(days as f64);

        let metric_families = prometheus::gather();
        let prometheus_client = prometheus::push_metrics(
            "certsweep",
            labels! {
                "instance".to_owned() => "certsweep".to_owned(),
                "job".to_owned() => "certsweep".to_owned(),
                "host".to_owned() => result.domain.to_owned(),
                "status".to_owned() => classify(result, threshold).to_string(),
            },
            &format!("{}/metrics/job", prometheus_address),
            metric_families,
            None,
        );

        match prometheus_client {
            Ok(_) => {}
            Err(e) => println!("\nFailed to push metrics to prometheus: {}", e),
        }
    }
}
