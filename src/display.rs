//! Live terminal status display.
//!
//! Redraws a fixed-height block in place: one cell per domain, three cells
//! per line, plus a progress summary line. The display owns its sink and the
//! "lines printed last time" counter behind a mutex, so concurrent callers
//! (worker completions and the animation ticker) can never interleave their
//! output. The sink is generic so tests can render into a byte buffer
//! instead of a terminal.

use colored::Colorize;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::registry::{BoardSnapshot, ProbeState, SPINNER_FRAMES};

/// Domain cells laid out per display line.
const CELLS_PER_LINE: usize = 3;

/// Domain names are truncated/padded to this many columns.
const DOMAIN_WIDTH: usize = 20;

struct DisplayInner<W> {
    sink: W,
    lines_printed: usize,
}

/// Serialized, in-place redrawing status display.
pub struct StatusDisplay<W: Write> {
    inner: Mutex<DisplayInner<W>>,
}

impl StatusDisplay<io::Stdout> {
    /// A display writing to the real terminal.
    pub fn stdout() -> Self {
        StatusDisplay::new(io::stdout())
    }
}

impl<W: Write> StatusDisplay<W> {
    pub fn new(sink: W) -> Self {
        StatusDisplay {
            inner: Mutex::new(DisplayInner {
                sink,
                lines_printed: 0,
            }),
        }
    }

    /// Redraws the status block from a registry snapshot.
    ///
    /// If a previous render happened, the cursor is first moved up by the
    /// number of lines written last time so the block is overwritten in
    /// place. Returns the number of lines just written.
    pub fn render(&self, snapshot: &BoardSnapshot) -> usize {
        let mut inner = self.inner.lock().unwrap();

        let mut frame = String::new();
        if inner.lines_printed > 0 {
            let _ = write!(frame, "\x1b[{}A", inner.lines_printed);
        }
        frame.push('\r');

        let mut lines = 0;
        for chunk in snapshot.chunks(CELLS_PER_LINE) {
            for (domain, status) in chunk {
                frame.push_str(&cell(domain, status));
                frame.push_str("  ");
            }
            frame.push_str("\x1b[K\n");
            lines += 1;
        }

        let total = snapshot.len();
        let completed = snapshot
            .iter()
            .filter(|(_, s)| s.state != ProbeState::Pending)
            .count();
        let remaining = total - completed;

        let mut progress = format!("Progress: {}/{} domains completed", completed, total);
        if remaining > 0 {
            let _ = write!(progress, ", {} checking...", remaining);
        } else {
            progress.push_str(" - All done!");
        }
        let _ = write!(frame, "{}\x1b[K\n", progress.cyan());
        lines += 1;

        let _ = inner.sink.write_all(frame.as_bytes());
        let _ = inner.sink.flush();
        inner.lines_printed = lines;
        lines
    }

    /// Erases exactly the lines written by the last render.
    ///
    /// Called once after the run finishes, so no animation artifacts are left
    /// above the final report. The ticker must already have stopped by then;
    /// the dispatcher joins it before returning.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        let mut seq = String::new();
        for _ in 0..inner.lines_printed {
            seq.push_str("\x1b[1A\x1b[2K");
        }
        let _ = inner.sink.write_all(seq.as_bytes());
        let _ = inner.sink.flush();
        inner.lines_printed = 0;
    }

    /// Lines written by the most recent render.
    pub fn lines_printed(&self) -> usize {
        self.inner.lock().unwrap().lines_printed
    }

    /// Consumes the display, returning its sink. Used by tests to inspect
    /// what was written.
    pub fn into_inner(self) -> W {
        self.inner.into_inner().unwrap().sink
    }
}

fn cell(domain: &str, status: &crate::registry::DomainStatus) -> String {
    let name: String = domain.chars().take(DOMAIN_WIDTH).collect();
    match status.state {
        ProbeState::Pending => {
            let spinner = SPINNER_FRAMES[status.spinner_pos % SPINNER_FRAMES.len()];
            format!(
                "{} {:<width$} {:<11}",
                spinner.to_string().yellow(),
                name,
                "checking...",
                width = DOMAIN_WIDTH
            )
        }
        ProbeState::Completed => format!(
            "{} {:<width$} {:<11}",
            "✓".green(),
            name,
            "done",
            width = DOMAIN_WIDTH
        ),
        ProbeState::Failed => format!(
            "{} {:<width$} {:<11}",
            "✗".red(),
            name,
            "error",
            width = DOMAIN_WIDTH
        ),
    }
}
