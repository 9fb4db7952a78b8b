//! Core domain types for Tableside's fault boundary.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The boundary state machine's transitions live here so that every layer
//! (core orchestration, tui rendering, tests) agrees on the same invariants.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod boundary;
mod fallback;
mod policy;
mod sanitize;
pub mod ui;

pub use boundary::{BoundaryState, BoundaryStatus, DEFAULT_MAX_RETRIES, DiagnosticContext, Fault};
pub use fallback::{
    EXHAUSTED_NOTICE, FallbackControl, FallbackModel, HEADING, RELOAD_LABEL, RESET_LABEL,
    RETRY_LABEL,
};
pub use policy::DiagnosticsPolicy;
pub use sanitize::sanitize_fault_text;
