//! Render model for the default fallback.
//!
//! `FallbackModel` is derived from `(status, fault, remaining retries, policy)`
//! and nothing else, so two renders of the same state produce the same text.
//! The tui layer paints it; tests can assert on it directly.

use std::borrow::Cow;

use crate::boundary::{BoundaryState, BoundaryStatus};
use crate::policy::DiagnosticsPolicy;
use crate::sanitize::sanitize_fault_text;

pub const HEADING: &str = "Something went wrong";
pub const RETRY_LABEL: &str = "Try again";
pub const RESET_LABEL: &str = "Reset";
pub const RELOAD_LABEL: &str = "Refresh Page";
pub const EXHAUSTED_NOTICE: &str = "Max retries reached";

/// Recovery controls, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackControl {
    Retry,
    Reset,
    Reload,
}

impl FallbackControl {
    pub const ALL: [Self; 3] = [Self::Retry, Self::Reset, Self::Reload];

    fn index(self) -> usize {
        match self {
            Self::Retry => 0,
            Self::Reset => 1,
            Self::Reload => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackModel {
    status: BoundaryStatus,
    message: String,
    remaining_retries: u32,
    diagnostic: Option<String>,
}

impl FallbackModel {
    /// Returns `None` while the boundary is healthy (the subtree renders instead).
    #[must_use]
    pub fn from_state(state: &BoundaryState, policy: DiagnosticsPolicy) -> Option<Self> {
        if state.status().is_healthy() {
            return None;
        }
        let fault = state.fault()?;
        let diagnostic = policy
            .exposes_diagnostics()
            .then(|| sanitize_fault_text(fault.diagnostic()).into_owned());
        Some(Self {
            status: state.status(),
            message: sanitize_fault_text(fault.message()).into_owned(),
            remaining_retries: state.remaining_retries(),
            diagnostic,
        })
    }

    #[must_use]
    pub fn heading(&self) -> &'static str {
        HEADING
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn status(&self) -> BoundaryStatus {
        self.status
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.status == BoundaryStatus::Exhausted
    }

    #[must_use]
    pub fn notice(&self) -> Option<String> {
        self.is_exhausted()
            .then(|| format!("{EXHAUSTED_NOTICE}. Reset or refresh the page to continue."))
    }

    /// Raw diagnostic text (message plus trace). `None` under a production policy.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    #[must_use]
    pub fn is_enabled(&self, control: FallbackControl) -> bool {
        match control {
            FallbackControl::Retry => self.status == BoundaryStatus::Faulted,
            FallbackControl::Reset | FallbackControl::Reload => true,
        }
    }

    #[must_use]
    pub fn label(&self, control: FallbackControl) -> Cow<'static, str> {
        match control {
            FallbackControl::Retry if self.is_enabled(FallbackControl::Retry) => {
                Cow::Owned(format!("{RETRY_LABEL} ({} left)", self.remaining_retries))
            }
            FallbackControl::Retry => Cow::Borrowed(RETRY_LABEL),
            FallbackControl::Reset => Cow::Borrowed(RESET_LABEL),
            FallbackControl::Reload => Cow::Borrowed(RELOAD_LABEL),
        }
    }

    /// The control that receives focus when the fallback first appears.
    #[must_use]
    pub fn initial_focus(&self) -> FallbackControl {
        if self.is_enabled(FallbackControl::Retry) {
            FallbackControl::Retry
        } else {
            FallbackControl::Reset
        }
    }

    /// Moves focus one position, wrapping and skipping disabled controls.
    #[must_use]
    pub fn step_focus(&self, from: FallbackControl, forward: bool) -> FallbackControl {
        let len = FallbackControl::ALL.len();
        let mut idx = from.index();
        for _ in 0..len {
            idx = if forward {
                (idx + 1) % len
            } else {
                (idx + len - 1) % len
            };
            let candidate = FallbackControl::ALL[idx];
            if self.is_enabled(candidate) {
                return candidate;
            }
        }
        from
    }

    /// Plain-text rendition of everything the default fallback shows.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(HEADING);
        out.push_str("\n\n");
        out.push_str(&self.message);
        if let Some(notice) = self.notice() {
            out.push_str("\n\n");
            out.push_str(&notice);
        }
        out.push_str("\n\n");
        let controls: Vec<String> = FallbackControl::ALL
            .iter()
            .map(|control| {
                let label = self.label(*control);
                if self.is_enabled(*control) {
                    format!("[{label}]")
                } else {
                    format!("({label})")
                }
            })
            .collect();
        out.push_str(&controls.join(" "));
        if let Some(diagnostic) = &self.diagnostic {
            out.push_str("\n\n");
            out.push_str(diagnostic);
        }
        out
    }
}
