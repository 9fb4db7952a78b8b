//! Fault boundaries for ratatui screens.
//!
//! A [`BoundaryPanel`] wraps one [`Subtree`]. Faults raised while mounting,
//! rendering, or handling keys are contained at the panel: the rest of the
//! frame keeps drawing and the panel shows a fallback with recovery controls.

mod fallback;
mod panel;
mod subtree;
mod theme;

pub use fallback::{DefaultFallback, fallback_lines};
pub use panel::{BoundaryPanel, PanelAction, fallback_action};
pub use subtree::{Fallback, RenderCx, Subtree};
pub use theme::{Glyphs, Palette, glyphs, palette, styles};
