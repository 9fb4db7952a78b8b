//! `BoundaryPanel`: a [`FaultBoundary`] wired to a ratatui subtree.
//!
//! While healthy the subtree renders into a scratch buffer that is merged
//! into the frame only if the whole render succeeds, so a fault halfway
//! through never leaves partial output on screen. Otherwise the fallback
//! (custom or default) owns the area and the recovery keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use tableside_core::{FallbackControl, FallbackModel, FaultBoundary};
use tableside_types::ui::UiOptions;

use crate::fallback::DefaultFallback;
use crate::subtree::{Fallback, RenderCx, Subtree};
use crate::theme::{glyphs, palette};

/// What a key press on the fallback asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Retry,
    Reset,
    Reload,
    Focus(FallbackControl),
}

/// Maps a key press on the fallback to an action.
///
/// `r` retries, `x` resets, `F5` reloads, arrows and Tab move focus, Enter
/// activates the focused control. Disabled controls map to nothing.
#[must_use]
pub fn fallback_action(
    key: KeyEvent,
    focus: FallbackControl,
    model: &FallbackModel,
) -> Option<PanelAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('r') if key.modifiers.is_empty() => model
            .is_enabled(FallbackControl::Retry)
            .then_some(PanelAction::Retry),
        KeyCode::Char('x') if key.modifiers.is_empty() => Some(PanelAction::Reset),
        KeyCode::F(5) => Some(PanelAction::Reload),
        KeyCode::Left | KeyCode::BackTab => Some(PanelAction::Focus(model.step_focus(focus, false))),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(PanelAction::Focus(model.step_focus(focus, false)))
        }
        KeyCode::Right | KeyCode::Tab => Some(PanelAction::Focus(model.step_focus(focus, true))),
        KeyCode::Enter if model.is_enabled(focus) => Some(match focus {
            FallbackControl::Retry => PanelAction::Retry,
            FallbackControl::Reset => PanelAction::Reset,
            FallbackControl::Reload => PanelAction::Reload,
        }),
        _ => None,
    }
}

pub struct BoundaryPanel<S> {
    boundary: FaultBoundary,
    subtree: S,
    fallback: Option<Box<dyn Fallback>>,
    /// Epoch the subtree was last constructed for.
    mounted_epoch: Option<u64>,
    /// Focused fallback control. `None` until the fallback first paints.
    focus: Option<FallbackControl>,
    options: UiOptions,
}

impl<S: Subtree> BoundaryPanel<S> {
    pub fn new(boundary: FaultBoundary, subtree: S) -> Self {
        Self {
            boundary,
            subtree,
            fallback: None,
            mounted_epoch: None,
            focus: None,
            options: UiOptions::default(),
        }
    }

    /// Replaces the default fallback UI.
    pub fn with_fallback(mut self, fallback: impl Fallback + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn with_ui_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn boundary(&self) -> &FaultBoundary {
        &self.boundary
    }

    pub fn boundary_mut(&mut self) -> &mut FaultBoundary {
        &mut self.boundary
    }

    #[must_use]
    pub fn subtree(&self) -> &S {
        &self.subtree
    }

    /// Focused fallback control, if the fallback is showing.
    #[must_use]
    pub fn focus(&self) -> Option<FallbackControl> {
        if self.boundary.status().is_healthy() {
            None
        } else {
            self.focus
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.ensure_mounted();

        if self.boundary.status().is_healthy() {
            self.focus = None;
            let mut scratch = Buffer::empty(area);
            let name = self.subtree.name().to_string();
            let subtree = &mut self.subtree;
            let rendered = self.boundary.guard(|stack| {
                stack.enter(name, |stack| {
                    let mut cx = RenderCx::new(area, &mut scratch, stack);
                    subtree.render(&mut cx)
                })
            });
            if rendered.is_some() {
                buf.merge(&scratch);
                return;
            }
        }

        self.render_fallback(area, buf);
    }

    /// Routes a key to the subtree while healthy, or to the fallback controls.
    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        if self.boundary.status().is_healthy() {
            self.ensure_mounted();
            // The mount faulted, so the key never reached the subtree.
            if !self.boundary.status().is_healthy() {
                return false;
            }
            let name = self.subtree.name().to_string();
            let subtree = &mut self.subtree;
            // A fault while handling input switches to the fallback, which
            // counts as consuming the key.
            return self
                .boundary
                .guard(|stack| stack.enter(name, |_| subtree.handle_key(key)))
                .unwrap_or(true);
        }

        let Some(model) = self.boundary.fallback_model() else {
            return false;
        };
        let focus = self.current_focus(&model);
        match fallback_action(key, focus, &model) {
            Some(action) => {
                self.apply(action);
                true
            }
            None => false,
        }
    }

    /// Performs a fallback action directly, as if its control were activated.
    pub fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::Retry => {
                if self.boundary.retry() {
                    self.focus = None;
                }
            }
            PanelAction::Reset => {
                self.boundary.reset();
                self.focus = None;
            }
            PanelAction::Reload => self.boundary.reload(),
            PanelAction::Focus(control) => self.focus = Some(control),
        }
    }

    /// Constructs the subtree once per epoch. A failing mount faults the boundary.
    fn ensure_mounted(&mut self) {
        let epoch = self.boundary.epoch();
        if self.mounted_epoch == Some(epoch) || !self.boundary.status().is_healthy() {
            return;
        }
        self.mounted_epoch = Some(epoch);
        let name = self.subtree.name().to_string();
        let subtree = &mut self.subtree;
        if self
            .boundary
            .guard(|stack| stack.enter(name, |_| subtree.mount()))
            .is_some()
        {
            tracing::debug!(boundary = %self.boundary.name(), epoch, "Subtree mounted");
        }
    }

    fn current_focus(&mut self, model: &FallbackModel) -> FallbackControl {
        let focus = match self.focus {
            Some(focus) if model.is_enabled(focus) => focus,
            _ => model.initial_focus(),
        };
        self.focus = Some(focus);
        focus
    }

    fn render_fallback(&mut self, area: Rect, buf: &mut Buffer) {
        if let Some(fallback) = &self.fallback {
            Fallback::render(fallback.as_ref(), area, buf);
            return;
        }
        let Some(model) = self.boundary.fallback_model() else {
            return;
        };
        let focus = self.current_focus(&model);
        let palette = palette(self.options);
        let glyphs = glyphs(self.options);
        DefaultFallback::new(&model, focus, &palette, &glyphs).render(area, buf);
    }
}
