//! Shared domain status registry.
//!
//! One coarse lock guards the whole table. Worker threads flip their own
//! domain from pending to a terminal state, the animation ticker bumps the
//! spinner offset of everything still pending, and the renderer takes a
//! consistent snapshot — all through the same mutex. Contention is fine at
//! the tens-to-low-hundreds of domains this tool is built for.

use std::collections::HashMap;
use std::sync::Mutex;

/// Spinner frames cycled by pending entries.
pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Lifecycle state of one domain's probe.
///
/// Every entry starts `Pending` and transitions exactly once, to `Completed`
/// or `Failed`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Pending,
    Completed,
    Failed,
}

/// Per-domain registry entry.
#[derive(Debug, Clone)]
pub struct DomainStatus {
    pub state: ProbeState,
    /// Monotonically increasing; wrapped modulo the frame count at render time.
    pub spinner_pos: usize,
}

/// Snapshot of the registry, in input order, consistent at the instant taken.
pub type BoardSnapshot = Vec<(String, DomainStatus)>;

struct BoardInner {
    /// Input order, preserved so the display layout is stable across renders.
    order: Vec<String>,
    entries: HashMap<String, DomainStatus>,
}

/// Mutex-guarded mapping from domain to probe state and animation offset.
pub struct StatusBoard {
    inner: Mutex<BoardInner>,
}

impl StatusBoard {
    /// Creates a board with every domain `Pending`.
    ///
    /// Domains are expected to be unique already; the dispatcher dedupes its
    /// input before building the board.
    pub fn new(domains: &[String]) -> Self {
        let entries = domains
            .iter()
            .map(|d| {
                (
                    d.clone(),
                    DomainStatus {
                        state: ProbeState::Pending,
                        spinner_pos: 0,
                    },
                )
            })
            .collect();
        StatusBoard {
            inner: Mutex::new(BoardInner {
                order: domains.to_vec(),
                entries,
            }),
        }
    }

    pub fn set_completed(&self, domain: &str) {
        self.set_state(domain, ProbeState::Completed);
    }

    pub fn set_failed(&self, domain: &str) {
        self.set_state(domain, ProbeState::Failed);
    }

    fn set_state(&self, domain: &str, state: ProbeState) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(status) = inner.entries.get_mut(domain) {
            status.state = state;
        }
    }

    /// Advances the spinner of every entry still pending.
    pub fn advance_animation(&self) {
        let mut inner = self.inner.lock().unwrap();
        for status in inner.entries.values_mut() {
            if status.state == ProbeState::Pending {
                status.spinner_pos = status.spinner_pos.wrapping_add(1);
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .values()
            .filter(|s| s.state == ProbeState::Pending)
            .count()
    }

    /// Count of entries that reached a terminal state. Monotone over a run.
    pub fn completed_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .values()
            .filter(|s| s.state != ProbeState::Pending)
            .count()
    }

    /// Consistent copy of all entries in input order, taken under the lock.
    pub fn snapshot(&self) -> BoardSnapshot {
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .map(|d| (d.clone(), inner.entries[d].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_starts_all_pending() {
        let board = StatusBoard::new(&domains(&["a.example", "b.example"]));
        assert_eq!(board.pending_count(), 2);
        assert_eq!(board.completed_count(), 0);
    }

    #[test]
    fn test_transitions_are_terminal() {
        let board = StatusBoard::new(&domains(&["a.example", "b.example", "c.example"]));
        board.set_completed("a.example");
        board.set_failed("b.example");
        assert_eq!(board.pending_count(), 1);
        assert_eq!(board.completed_count(), 2);

        board.set_completed("c.example");
        assert_eq!(board.pending_count(), 0);
        assert_eq!(board.completed_count(), 3);
    }

    #[test]
    fn test_advance_animation_only_touches_pending() {
        let board = StatusBoard::new(&domains(&["a.example", "b.example"]));
        board.set_completed("a.example");
        board.advance_animation();
        board.advance_animation();

        let snapshot = board.snapshot();
        assert_eq!(snapshot[0].1.spinner_pos, 0);
        assert_eq!(snapshot[1].1.spinner_pos, 2);
    }

    #[test]
    fn test_snapshot_preserves_input_order() {
        let names = domains(&["z.example", "a.example", "m.example"]);
        let board = StatusBoard::new(&names);
        let snapshot = board.snapshot();
        let seen: Vec<&str> = snapshot.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(seen, vec!["z.example", "a.example", "m.example"]);
    }

    #[test]
    fn test_unknown_domain_is_ignored() {
        let board = StatusBoard::new(&domains(&["a.example"]));
        board.set_failed("ghost.example");
        assert_eq!(board.pending_count(), 1);
    }
}
