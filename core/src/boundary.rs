//! The fault boundary: recovery state machine plus its side effects.
//!
//! `BoundaryState` (in `tableside-types`) owns the transitions. This type adds
//! what surrounds them: running subtree steps under [`contain`], logging,
//! notifying the observer, and delegating reloads.

use std::fmt;

use tableside_types::{
    BoundaryState, BoundaryStatus, DEFAULT_MAX_RETRIES, DiagnosticContext, DiagnosticsPolicy,
    Fault, FallbackModel,
};

use crate::contain::{CaughtFault, ComponentStack, contain};
use crate::observer::{FaultObserver, Reload};

pub struct FaultBoundary {
    name: String,
    state: BoundaryState,
    policy: DiagnosticsPolicy,
    observer: Option<Box<dyn FaultObserver>>,
    reload: Option<Box<dyn Reload>>,
    stack: ComponentStack,
    /// Bumped whenever the subtree must be constructed again (retry or reset).
    epoch: u64,
}

impl fmt::Debug for FaultBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultBoundary")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("has_observer", &self.observer.is_some())
            .field("has_reload", &self.reload.is_some())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl FaultBoundary {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stack: ComponentStack::new(name.clone()),
            name,
            state: BoundaryState::new(DEFAULT_MAX_RETRIES),
            policy: DiagnosticsPolicy::default(),
            observer: None,
            reload: None,
            epoch: 0,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.state = BoundaryState::new(max_retries);
        self
    }

    pub fn with_policy(mut self, policy: DiagnosticsPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: impl FaultObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_reload(mut self, reload: impl Reload + 'static) -> Self {
        self.reload = Some(Box::new(reload));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> BoundaryStatus {
        self.state.status()
    }

    #[must_use]
    pub fn policy(&self) -> DiagnosticsPolicy {
        self.policy
    }

    #[must_use]
    pub fn remaining_retries(&self) -> u32 {
        self.state.remaining_retries()
    }

    /// Construction generation of the subtree. Changes after every retry or reset.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// What the fallback shows for the current state, or `None` while healthy.
    #[must_use]
    pub fn fallback_model(&self) -> Option<FallbackModel> {
        FallbackModel::from_state(&self.state, self.policy)
    }

    /// Runs one subtree step (mount or render) under this boundary.
    ///
    /// Returns `None` without running `f` unless the boundary is healthy. A
    /// fault raised by `f` is caught here and never reaches the caller.
    pub fn guard<T>(
        &mut self,
        f: impl FnOnce(&mut ComponentStack) -> anyhow::Result<T>,
    ) -> Option<T> {
        if !self.state.status().is_healthy() {
            return None;
        }
        match contain(&mut self.stack, f) {
            Ok(value) => Some(value),
            Err(CaughtFault { fault, context }) => {
                self.catch(fault, &context);
                None
            }
        }
    }

    /// Records a caught fault and notifies the observer exactly once.
    ///
    /// This is the only transition out of `Healthy`.
    pub fn catch(&mut self, fault: Fault, context: &DiagnosticContext) -> BoundaryStatus {
        let status = self.state.record_fault(fault);
        tracing::error!(
            boundary = %self.name,
            status = status.as_str(),
            retry_count = self.state.retry_count(),
            max_retries = self.state.max_retries(),
            frame = context.failing_frame().unwrap_or("unknown"),
            "Contained fault: {}",
            self.state.fault().map_or("", Fault::message)
        );
        tracing::debug!(boundary = %self.name, trace = %context.trace(), "Fault trace");

        if let Some(observer) = self.observer.as_mut()
            && let Some(fault) = self.state.fault()
        {
            observer.on_fault(fault, context);
        }
        status
    }

    /// Spends one attempt and reconstructs the subtree. No-op unless `Faulted`.
    pub fn retry(&mut self) -> bool {
        if !self.state.retry() {
            tracing::debug!(
                boundary = %self.name,
                status = self.state.status().as_str(),
                "Retry ignored"
            );
            return false;
        }
        self.epoch = self.epoch.wrapping_add(1);
        tracing::info!(
            boundary = %self.name,
            retry_count = self.state.retry_count(),
            remaining = self.state.remaining_retries(),
            "Retrying subtree"
        );
        true
    }

    /// Fresh start: healthy, attempt count back to zero, subtree reconstructed.
    pub fn reset(&mut self) {
        self.state.reset();
        self.epoch = self.epoch.wrapping_add(1);
        tracing::info!(boundary = %self.name, "Boundary reset");
    }

    /// Hands off to the reload capability. Does not touch boundary state.
    pub fn reload(&mut self) {
        match self.reload.as_mut() {
            Some(reload) => {
                tracing::info!(boundary = %self.name, "Reload requested");
                reload.reload();
            }
            None => {
                tracing::warn!(boundary = %self.name, "Reload requested but no reload capability is configured");
            }
        }
    }
}
