//! Rendering details of the default fallback on a vt100 virtual terminal.


use anyhow::{Result, bail};
use ratatui::Terminal;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Paragraph, Widget};

use tableside_core::{
    BoundaryState, DiagnosticContext, DiagnosticsPolicy, Fault, FallbackControl, FallbackModel,
    FaultBoundary,
};
use tableside_tui::{BoundaryPanel, DefaultFallback, RenderCx, Subtree, glyphs, palette};
use tableside_types::ui::UiOptions;

use vt100_backend::VT100Backend;

/// Paints a banner, then fails with a message carrying terminal escapes.
struct HostileReceipt;

impl Subtree for HostileReceipt {
    fn name(&self) -> &str {
        "Receipt"
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Result<()> {
        let area = cx.area();
        cx.render_widget(Paragraph::new("PARTIAL RECEIPT"), area);
        bail!("\x1b[2Jprinter \x1b]0;pwned\x07jammed")
    }
}

fn render_model(
    model: &FallbackModel,
    focus: FallbackControl,
    width: u16,
    height: u16,
) -> Terminal<VT100Backend> {
    let options = UiOptions::default();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let mut terminal = Terminal::new(VT100Backend::new(width, height)).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            DefaultFallback::new(model, focus, &palette, &glyphs).render(area, frame.buffer_mut());
        })
        .unwrap();
    terminal
}

fn faulted_model(max_retries: u32, message: &str) -> FallbackModel {
    let mut state = BoundaryState::new(max_retries);
    let context = DiagnosticContext::new(vec!["orders".into(), "Receipt".into()]);
    state.record_fault(Fault::new(message, &context));
    FallbackModel::from_state(&state, DiagnosticsPolicy::Production).unwrap()
}

#[test]
fn partial_output_and_escape_sequences_never_reach_the_screen() {
    let mut panel = BoundaryPanel::new(FaultBoundary::new("orders"), HostileReceipt);
    let mut terminal = Terminal::new(VT100Backend::new(80, 24)).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            panel.render(area, frame.buffer_mut());
        })
        .unwrap();

    let backend = terminal.backend();
    let shown = backend.contents();
    assert!(!shown.contains("PARTIAL RECEIPT"));
    assert!(shown.contains("printer jammed"));
    assert!(!shown.contains("pwned"));
    assert!(!shown.contains("[2J"));
}

#[test]
fn fallback_box_is_centered() {
    let model = faulted_model(3, "menu sync failed");
    let terminal = render_model(&model, FallbackControl::Retry, 80, 24);
    let backend = terminal.backend();

    let heading_row = backend.find_row("Something went wrong").unwrap();
    assert!(heading_row > 0 && heading_row < 12, "row {heading_row}");
    let line = backend.row(heading_row);
    let indent = line.len() - line.trim_start().len();
    assert!(indent > 2, "heading should not hug the left edge: {line:?}");
}

#[test]
fn focused_control_is_marked_and_bold() {
    let model = faulted_model(3, "menu sync failed");
    let terminal = render_model(&model, FallbackControl::Reset, 80, 24);
    let backend = terminal.backend();

    let row = backend.find_row("Refresh Page").unwrap();
    let line = backend.row(row);
    assert!(line.contains("▸ Reset"));
    assert!(!line.contains("▸ Try again"));

    let col = line.chars().take_while(|c| *c != '▸').count() as u16;
    assert!(backend.is_bold_at(col + 2, row));
}

#[test]
fn narrow_terminal_wraps_long_messages() {
    let message =
        "the kitchen printer on the pass rejected ticket 8812 because its paper roll is empty";
    let model = faulted_model(3, message);
    let terminal = render_model(&model, FallbackControl::Retry, 40, 30);
    let shown = terminal.backend().contents();

    assert!(shown.contains("Something went wrong"));
    assert!(shown.contains("8812"));
    assert!(!shown.lines().any(|l| l.contains(message)));
}

#[test]
fn tiny_area_does_not_panic() {
    let model = faulted_model(0, "menu sync failed");
    let options = UiOptions::default();
    let mut buf = Buffer::empty(Rect::new(0, 0, 3, 2));
    DefaultFallback::new(&model, FallbackControl::Reset, &palette(options), &glyphs(options))
        .render(buf.area, &mut buf);
    let mut empty = Buffer::empty(Rect::new(0, 0, 0, 0));
    DefaultFallback::new(&model, FallbackControl::Reset, &palette(options), &glyphs(options))
        .render(empty.area, &mut empty);
}
