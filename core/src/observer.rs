//! Capabilities handed to a boundary at construction.

use tableside_types::{DiagnosticContext, Fault};

/// External sink notified once per caught fault.
///
/// Observers are trusted: a panic inside `on_fault` is not contained by the
/// boundary that invoked it.
pub trait FaultObserver {
    fn on_fault(&mut self, fault: &Fault, context: &DiagnosticContext);
}

impl<F> FaultObserver for F
where
    F: FnMut(&Fault, &DiagnosticContext),
{
    fn on_fault(&mut self, fault: &Fault, context: &DiagnosticContext) {
        self(fault, context);
    }
}

/// Full restart of the hosting context. Fire-and-forget.
pub trait Reload {
    fn reload(&mut self);
}

impl<F> Reload for F
where
    F: FnMut(),
{
    fn reload(&mut self) {
        self();
    }
}
