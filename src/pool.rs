//! Bounded worker pool and animation ticker.
//!
//! The dispatcher owns the whole lifetime of a run: it builds the status
//! board, spawns the ticker and a fixed number of worker threads, feeds
//! domains through a channel, and collects one result per domain in
//! completion order. Everything runs on scoped threads, so by the time `run`
//! returns the ticker has provably stopped rendering — the caller can clear
//! the display without racing a late tick.

use std::collections::HashSet;
use std::io::Write;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::display::StatusDisplay;
use crate::registry::StatusBoard;
use crate::ProbeResult;

/// Cadence of the spinner animation.
const TICK: Duration = Duration::from_millis(100);

/// Runs probes for a batch of domains with bounded concurrency.
pub struct Dispatcher {
    port: u16,
    workers: usize,
    tick: Duration,
}

impl Dispatcher {
    pub fn new(port: u16, workers: usize) -> Self {
        Dispatcher {
            port,
            workers,
            tick: TICK,
        }
    }

    /// Overrides the animation cadence. Tests shorten it.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Probes every domain and returns one result per unique domain.
    pub fn run<W>(&self, domains: &[String], display: &StatusDisplay<W>) -> Vec<ProbeResult>
    where
        W: Write + Send,
    {
        self.run_with(domains, display, |domain, port| crate::probe(domain, port))
    }

    /// Like [`Dispatcher::run`], but with the probe function supplied by the
    /// caller. This is the seam the concurrency tests instrument.
    ///
    /// Duplicate domains collapse to their first occurrence before the board
    /// is built, so the display and the result list carry one entry each per
    /// unique domain. At most `workers` probes are in flight at any instant;
    /// a probe failure affects only its own domain. Results arrive in
    /// completion order, which is fine because the reporter re-sorts.
    pub fn run_with<W, F>(
        &self,
        domains: &[String],
        display: &StatusDisplay<W>,
        probe_fn: F,
    ) -> Vec<ProbeResult>
    where
        W: Write + Send,
        F: Fn(&str, u16) -> ProbeResult + Sync,
    {
        let domains = dedupe(domains);
        if domains.is_empty() {
            return Vec::new();
        }

        let board = StatusBoard::new(&domains);
        display.render(&board.snapshot());

        let worker_count = self.workers.max(1).min(domains.len());
        let (job_tx, job_rx) = mpsc::channel::<String>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, result_rx) = mpsc::channel::<ProbeResult>();

        thread::scope(|scope| {
            let board = &board;
            let probe_fn = &probe_fn;
            let tick = self.tick;
            let port = self.port;

            // The ticker owns its exit condition: it watches the board and
            // stops once nothing is pending. The scope join below is what
            // guarantees it has stopped before the caller's final clear.
            scope.spawn(move || {
                while board.pending_count() > 0 {
                    board.advance_animation();
                    display.render(&board.snapshot());
                    thread::sleep(tick);
                }
            });

            for _ in 0..worker_count {
                let job_rx = Arc::clone(&job_rx);
                let result_tx = result_tx.clone();
                scope.spawn(move || loop {
                    let job = job_rx.lock().unwrap().recv();
                    let Ok(domain) = job else { break };

                    let result = probe_fn(&domain, port);
                    if result.is_error() {
                        board.set_failed(&domain);
                    } else {
                        board.set_completed(&domain);
                    }
                    display.render(&board.snapshot());
                    let _ = result_tx.send(result);
                });
            }
            drop(result_tx);

            for domain in &domains {
                let _ = job_tx.send(domain.clone());
            }
            drop(job_tx);

            result_rx.iter().collect()
        })
    }
}

/// First occurrence wins; the registry, display and report are all keyed by
/// domain name, so duplicates in the input would otherwise collapse silently.
fn dedupe(domains: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(domains.len());
    for domain in domains {
        if seen.insert(domain.clone()) {
            unique.push(domain.clone());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn domains(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn quiet_display() -> StatusDisplay<Vec<u8>> {
        StatusDisplay::new(Vec::new())
    }

    fn valid_result(domain: &str) -> ProbeResult {
        let expiry = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        ProbeResult::ok(domain, expiry, 100)
    }

    #[test]
    fn test_one_result_per_domain() {
        let display = quiet_display();
        let dispatcher = Dispatcher::new(443, 4).with_tick(Duration::from_millis(5));
        let results = dispatcher.run_with(
            &domains(&["a.example", "b.example", "c.example"]),
            &display,
            |domain, _| valid_result(domain),
        );
        assert_eq!(results.len(), 3);

        let mut seen: Vec<&str> = results.iter().map(|r| r.domain.as_str()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a.example", "b.example", "c.example"]);
    }

    #[test]
    fn test_in_flight_probes_never_exceed_worker_count() {
        let display = quiet_display();
        let in_flight = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        let dispatcher = Dispatcher::new(443, 2).with_tick(Duration::from_millis(5));
        let results = dispatcher.run_with(
            &domains(&[
                "a.example",
                "b.example",
                "c.example",
                "d.example",
                "e.example",
                "f.example",
            ]),
            &display,
            |domain, _| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                in_flight.fetch_sub(1, Ordering::SeqCst);
                valid_result(domain)
            },
        );

        assert_eq!(results.len(), 6);
        assert!(max_seen.load(Ordering::SeqCst) <= 2);
        assert!(max_seen.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_results_arrive_in_completion_order() {
        let display = quiet_display();
        let dispatcher = Dispatcher::new(443, 2).with_tick(Duration::from_millis(5));
        let results = dispatcher.run_with(
            &domains(&["slow.example", "fast.example"]),
            &display,
            |domain, _| {
                if domain.starts_with("slow") {
                    thread::sleep(Duration::from_millis(80));
                }
                valid_result(domain)
            },
        );
        assert_eq!(results[0].domain, "fast.example");
        assert_eq!(results[1].domain, "slow.example");
    }

    #[test]
    fn test_failure_is_isolated() {
        let display = quiet_display();
        let dispatcher = Dispatcher::new(443, 3).with_tick(Duration::from_millis(5));
        let results = dispatcher.run_with(
            &domains(&["bad.example", "good.example"]),
            &display,
            |domain, _| {
                if domain.starts_with("bad") {
                    ProbeResult::failed(domain, "connection refused")
                } else {
                    valid_result(domain)
                }
            },
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_error()).count(), 1);
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let display = quiet_display();
        let dispatcher = Dispatcher::new(443, 2).with_tick(Duration::from_millis(5));
        let results = dispatcher.run_with(
            &domains(&["a.example", "a.example", "b.example"]),
            &display,
            |domain, _| valid_result(domain),
        );
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_input_returns_empty() {
        let display = quiet_display();
        let dispatcher = Dispatcher::new(443, 2);
        let results = dispatcher.run_with(&[], &display, |domain, _| valid_result(domain));
        assert!(results.is_empty());
        assert_eq!(display.lines_printed(), 0);
    }

    #[test]
    fn test_display_settles_on_all_done() {
        let display = quiet_display();
        let dispatcher = Dispatcher::new(443, 2).with_tick(Duration::from_millis(5));
        dispatcher.run_with(&domains(&["a.example", "b.example"]), &display, |d, _| {
            valid_result(d)
        });
        let out = String::from_utf8(display.into_inner()).unwrap();
        assert!(out.contains("Progress: 2/2 domains completed - All done!"));
    }
}
