//! Explicit boundary points for subtree code.
//!
//! The host has no runtime that reports faults to the nearest boundary, so the
//! boundary runs each mount/render step through [`contain`] itself. A step
//! faults by returning `Err` or by panicking; either way the caller gets a
//! [`CaughtFault`] carrying the component stack as it stood at the failure.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tableside_types::{DiagnosticContext, Fault};

use crate::panic_hook::{clear_last_panic_location, take_last_panic_location};

/// Frames of the component tree currently being constructed or rendered,
/// outermost first.
#[derive(Debug, Clone, Default)]
pub struct ComponentStack {
    frames: Vec<String>,
    /// Stack snapshot taken where an `Err` was first returned.
    captured: Option<Captured>,
}

#[derive(Debug, Clone)]
struct Captured {
    frames: Vec<String>,
    /// Root cause text of the error the snapshot belongs to.
    root: String,
}

impl Captured {
    fn belongs_to(&self, err: &anyhow::Error) -> bool {
        self.root == err.root_cause().to_string()
    }
}

impl ComponentStack {
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            frames: vec![root.into()],
            captured: None,
        }
    }

    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Runs `f` with `frame` pushed on the stack.
    ///
    /// A panic inside `f` leaves the frame in place, which is what `contain`
    /// reads after unwinding. An `Err` snapshots the stack before the frame is
    /// popped so the innermost failing frame is not lost on the way out. A
    /// snapshot left by an inner error that `f` handled is dropped when `f`
    /// succeeds, and replaced when `f` fails with a different error.
    pub fn enter<T>(
        &mut self,
        frame: impl Into<String>,
        f: impl FnOnce(&mut Self) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        self.captured = None;
        self.frames.push(frame.into());
        let result = f(self);
        match &result {
            Ok(_) => self.captured = None,
            Err(err) => {
                if !self.captured.as_ref().is_some_and(|c| c.belongs_to(err)) {
                    self.captured = Some(Captured {
                        frames: self.frames.clone(),
                        root: err.root_cause().to_string(),
                    });
                }
            }
        }
        self.frames.pop();
        result
    }

    fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }
}

/// A fault intercepted at a boundary point, with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaughtFault {
    pub fault: Fault,
    pub context: DiagnosticContext,
}

impl CaughtFault {
    fn from_error(err: &anyhow::Error, frames: Vec<String>) -> Self {
        let causes = err.chain().skip(1).map(ToString::to_string).collect();
        let context = DiagnosticContext::new(frames).with_causes(causes);
        Self {
            fault: Fault::new(err.to_string(), &context),
            context,
        }
    }

    fn from_panic(payload: &(dyn Any + Send), frames: Vec<String>) -> Self {
        let causes = take_last_panic_location()
            .map(|location| vec![format!("panicked at {location}")])
            .unwrap_or_default();
        let context = DiagnosticContext::new(frames).with_causes(causes);
        Self {
            fault: Fault::new(panic_payload_to_string(payload), &context),
            context,
        }
    }
}

/// Runs one subtree step, converting panics and errors into a [`CaughtFault`].
///
/// The stack is restored to its entry depth before returning, whatever happened.
pub fn contain<T>(
    stack: &mut ComponentStack,
    f: impl FnOnce(&mut ComponentStack) -> anyhow::Result<T>,
) -> Result<T, CaughtFault> {
    let depth = stack.depth();
    stack.captured = None;
    clear_last_panic_location();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *stack)));
    let result = match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            let frames = match stack.captured.take() {
                Some(captured) if captured.belongs_to(&err) => captured.frames,
                _ => stack.frames.clone(),
            };
            Err(CaughtFault::from_error(&err, frames))
        }
        Err(payload) => Err(CaughtFault::from_panic(&*payload, stack.frames.clone())),
    };

    stack.captured = None;
    stack.truncate(depth);
    result
}

#[must_use]
pub fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
