//! Output helpers for the `bzauth` CLI: JSON, aligned tables and the
//! console observer that reports store activity to the user.

use std::io::{self, Write};

use serde::Serialize;

use bzauth_core::{AuthEvent, Observer, TracingObserver};

/// Print `value` as pretty JSON on stdout.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            // Broken pipes (e.g. `| head`) are not errors.
            let _ = writeln!(io::stdout().lock(), "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print an aligned table. Nothing is printed for an empty `rows`.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let _ = write!(io::stdout().lock(), "{}", render_table(headers, rows));
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    for line in std::iter::once(&header).chain(std::iter::once(&rule)).chain(rows) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Forwards events to `tracing` and tells the user where an API key went.
pub struct ConsoleObserver {
    silent: bool,
    tracing: TracingObserver,
}

impl ConsoleObserver {
    /// `silent` suppresses the stdout confirmation (for `--quiet`/`--json`).
    pub fn new(silent: bool) -> Self {
        Self {
            silent,
            tracing: TracingObserver,
        }
    }
}

impl Observer for ConsoleObserver {
    fn on_event(&self, event: &AuthEvent) {
        self.tracing.on_event(event);
        if let AuthEvent::ApiKeyWritten { path } = event {
            if !self.silent {
                println!("API key written to {}", path.display());
            }
        }
    }
}
