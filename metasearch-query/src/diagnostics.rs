//! Diagnostics sink
//!
//! Problems met while compiling a search never abort compilation. They are
//! reported as a `Problem` to a `DiagnosticSink` and the offending node
//! contributes either an always-false clause or nothing at all.

use std::fmt;
use std::sync::Mutex;

/// One reported compilation problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// Compiler component reporting the problem
    pub component: &'static str,
    /// Operation that was running
    pub method: &'static str,
    /// Diagnostic code from `metasearch_vocab::diagnostics`
    pub code: &'static str,
    /// Human-readable details
    pub details: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} [{}] {}",
            self.component, self.method, self.code, self.details
        )
    }
}

/// Receiver of compilation problems
///
/// Implementations must not fail or panic.
pub trait DiagnosticSink: Send + Sync {
    fn log_problem(&self, problem: Problem);
}

/// Sink that emits every problem as a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log_problem(&self, problem: Problem) {
        tracing::warn!(
            component = problem.component,
            method = problem.method,
            code = problem.code,
            category = metasearch_vocab::diagnostics::diagnostic_category(problem.code).unwrap_or_default(),
            details = %problem.details,
            "search compilation problem"
        );
    }
}

/// Sink used when the caller supplies none
pub static DEFAULT_SINK: TracingSink = TracingSink;

/// Sink that retains problems for the caller to inspect
#[derive(Debug, Default)]
pub struct CollectingSink {
    problems: Mutex<Vec<Problem>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the problems reported so far
    pub fn problems(&self) -> Vec<Problem> {
        self.problems
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Diagnostic codes reported so far, in order
    pub fn codes(&self) -> Vec<&'static str> {
        self.problems
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|p| p.code)
            .collect()
    }

    /// Check if nothing was reported
    pub fn is_empty(&self) -> bool {
        self.problems
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn log_problem(&self, problem: Problem) {
        self.problems
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(problem);
    }
}
