//! Fault isolation for Tableside.
//!
//! A [`FaultBoundary`] supervises one subtree of the UI. Subtree code runs
//! through [`contain`], which turns both panics and `Err` returns into a
//! [`CaughtFault`] value instead of letting them unwind through the frame loop.
//! The boundary records the fault, notifies its [`FaultObserver`], and exposes
//! the recovery actions (retry, reset, reload).
//!
//! Nothing here touches the terminal; rendering lives in `tableside-tui`.

mod boundary;
mod contain;
mod observer;
mod panic_hook;

pub use boundary::FaultBoundary;
pub use contain::{CaughtFault, ComponentStack, contain, panic_payload_to_string};
pub use observer::{FaultObserver, Reload};
pub use panic_hook::install_panic_hook;

pub use tableside_types::{
    BoundaryState, BoundaryStatus, DEFAULT_MAX_RETRIES, DiagnosticContext, DiagnosticsPolicy,
    Fault, FallbackControl, FallbackModel,
};
