use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::solvers::{Completion, SolverKind};

/// `1234` -> `"1.234s"`
pub fn format_time(millis: u128) -> String {
    format!("{}.{:03}s", millis / 1000, millis % 1000)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub algorithm: SolverKind,
    pub elapsed_ms: u128,
    pub found: bool,
    pub timestamp: DateTime<Local>,
}

impl SessionResult {
    pub fn from_completion(completion: &Completion) -> Self {
        Self {
            algorithm: completion.solver,
            elapsed_ms: completion.elapsed_ms(),
            found: completion.found,
            timestamp: Local::now(),
        }
    }
}

/// Append-only log of finished runs for the current session.
#[derive(Debug, Default)]
pub struct RecordsTable {
    results: Vec<SessionResult>,
}

impl RecordsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, completion: &Completion) -> &SessionResult {
        self.results.push(SessionResult::from_completion(completion));
        &self.results[self.results.len() - 1]
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn render(&self) -> String {
        if self.results.is_empty() {
            return String::from("No records yet. Run some algorithms!\n");
        }

        let mut out = String::new();
        let _ = writeln!(out, "{:<10} {:>10} {:<8} {}", "Algorithm", "Time", "Result", "Timestamp");
        for result in &self.results {
            let _ = writeln!(
                out,
                "{:<10} {:>10} {:<8} {}",
                result.algorithm.label(),
                format_time(result.elapsed_ms),
                if result.found { "found" } else { "no path" },
                result.timestamp.format("%H:%M:%S"),
            );
        }
        let _ = writeln!(out, "Total Runs: {}", self.results.len());

        out
    }
}
