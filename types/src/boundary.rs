//! Boundary state and the faults it records.
//!
//! `BoundaryState` is the whole of the recovery state machine:
//!
//! ```text
//! Healthy --catch--> Faulted --retry--> Healthy --catch--> Faulted | Exhausted
//!    ^                  |                                        |
//!    +------reset-------+-------------------reset----------------+
//! ```
//!
//! Transitions are methods on the state itself, so the invariants below hold
//! for every caller:
//!
//! - `Healthy` carries no fault (the retry count may carry prior cycles).
//! - `Faulted` carries a fault and `retry_count < max_retries`.
//! - `Exhausted` carries a fault and `retry_count >= max_retries`.
//! - `retry_count` only grows through `retry` and only drops through `reset`.

use std::fmt::Write;

use thiserror::Error;

/// Attempt budget used when the host does not configure one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryStatus {
    /// The wrapped subtree is rendered.
    #[default]
    Healthy,
    /// A fault was caught and the retry budget still has room.
    Faulted,
    /// A fault was caught after the retry budget was consumed. Terminal until reset.
    Exhausted,
}

impl BoundaryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Faulted => "faulted",
            Self::Exhausted => "exhausted",
        }
    }

    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Where in the component tree a fault was raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    /// Frames from outermost (the boundary) to innermost (the failing component).
    component_stack: Vec<String>,
    /// Error chain below the top-level message, outermost first.
    causes: Vec<String>,
}

impl DiagnosticContext {
    #[must_use]
    pub fn new(component_stack: Vec<String>) -> Self {
        Self {
            component_stack,
            causes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_causes(mut self, causes: Vec<String>) -> Self {
        self.causes = causes;
        self
    }

    #[must_use]
    pub fn component_stack(&self) -> &[String] {
        &self.component_stack
    }

    #[must_use]
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// The innermost frame, i.e. the component that raised the fault.
    #[must_use]
    pub fn failing_frame(&self) -> Option<&str> {
        self.component_stack.last().map(String::as_str)
    }

    /// Structural trace, innermost frame first, followed by the error chain.
    #[must_use]
    pub fn trace(&self) -> String {
        let mut out = String::new();
        for frame in self.component_stack.iter().rev() {
            let _ = writeln!(out, "    at {frame}");
        }
        for cause in &self.causes {
            let _ = writeln!(out, "caused by: {cause}");
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out
    }
}

/// A contained fault: the human-readable message plus the raw diagnostic text.
///
/// `diagnostic` is the message followed by the structural trace and is only
/// ever shown when the diagnostics policy allows it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Fault {
    message: String,
    diagnostic: String,
}

impl Fault {
    #[must_use]
    pub fn new(message: impl Into<String>, context: &DiagnosticContext) -> Self {
        let message = message.into();
        let trace = context.trace();
        let diagnostic = if trace.is_empty() {
            message.clone()
        } else {
            format!("{message}\n{trace}")
        };
        Self {
            message,
            diagnostic,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryState {
    status: BoundaryStatus,
    fault: Option<Fault>,
    retry_count: u32,
    max_retries: u32,
}

impl Default for BoundaryState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl BoundaryState {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            status: BoundaryStatus::Healthy,
            fault: None,
            retry_count: 0,
            max_retries,
        }
    }

    #[must_use]
    pub fn status(&self) -> BoundaryStatus {
        self.status
    }

    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn remaining_retries(&self) -> u32 {
        self.max_retries.saturating_sub(self.retry_count)
    }

    /// Whether the retry control is enabled.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.status == BoundaryStatus::Faulted
    }

    /// Records a caught fault and returns the resulting status.
    ///
    /// The budget guard is re-evaluated on every catch, so a fault raised right
    /// after the last permitted retry lands directly in `Exhausted`.
    pub fn record_fault(&mut self, fault: Fault) -> BoundaryStatus {
        self.status = if self.retry_count < self.max_retries {
            BoundaryStatus::Faulted
        } else {
            BoundaryStatus::Exhausted
        };
        self.fault = Some(fault);
        self.status
    }

    /// Spends one attempt and returns to `Healthy`.
    ///
    /// Returns `false` without touching the state unless the status is `Faulted`.
    pub fn retry(&mut self) -> bool {
        if self.status != BoundaryStatus::Faulted {
            return false;
        }
        self.retry_count = self.retry_count.saturating_add(1);
        self.fault = None;
        self.status = BoundaryStatus::Healthy;
        true
    }

    /// Fresh start: clears the fault and the attempt count.
    pub fn reset(&mut self) {
        self.fault = None;
        self.status = BoundaryStatus::Healthy;
        self.retry_count = 0;
    }
}
