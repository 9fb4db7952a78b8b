//! End-to-end boundary behavior through `BoundaryPanel` and a virtual terminal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crossterm::event::KeyCode;
use ratatui::Terminal;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;

use tableside_core::{
    BoundaryStatus, DiagnosticContext, DiagnosticsPolicy, Fault, FallbackControl, FaultBoundary,
};
use tableside_tui::{BoundaryPanel, PanelAction};

use crate::common::{Failure, Kitchen, draw, key, screen};
use crate::vt100_backend::VT100Backend;

fn kitchen(failure: Failure) -> BoundaryPanel<Kitchen> {
    BoundaryPanel::new(FaultBoundary::new("kitchen"), Kitchen::new(failure))
}

#[test]
fn faulting_subtree_shows_default_fallback() {
    let mut panel = kitchen(Failure::Always);
    let shown = screen(&mut panel);

    assert!(shown.contains("Something went wrong"));
    assert!(shown.contains("ticket 17 references a deleted menu item"));
    assert!(shown.contains("Try again (3 left)"));
    assert!(shown.contains("Reset"));
    assert!(shown.contains("Refresh Page"));
    assert!(!shown.contains("3 tickets firing"));
    assert!(!shown.contains("Max retries reached"));
}

#[test]
fn healthy_subtree_renders_normally() {
    let mut panel = kitchen(Failure::Never);
    let shown = screen(&mut panel);
    assert!(shown.contains("3 tickets firing"));
    assert!(!shown.contains("Something went wrong"));
}

#[test]
fn custom_fallback_output_is_exactly_its_own() {
    let mut panel = kitchen(Failure::Always).with_fallback(|area: Rect, buf: &mut Buffer| {
        buf.set_string(area.x, area.y, "Kitchen display offline", Style::default());
    });
    let terminal = draw(&mut panel, 60, 10);
    let backend = terminal.backend();

    assert_eq!(backend.row(0), "Kitchen display offline");
    for y in 1..10 {
        assert_eq!(backend.row(y), "", "row {y} should be blank");
    }
    assert!(!backend.contents().contains("Something went wrong"));
    assert!(!backend.contents().contains("Try again"));
}

#[test]
fn two_retries_exhaust_a_budget_of_two() {
    let mut panel = BoundaryPanel::new(
        FaultBoundary::new("kitchen").with_max_retries(2),
        Kitchen::new(Failure::Always),
    );
    assert!(screen(&mut panel).contains("Try again (2 left)"));

    assert!(panel.handle_key(key(KeyCode::Char('r'))));
    assert!(screen(&mut panel).contains("Try again (1 left)"));

    assert!(panel.handle_key(key(KeyCode::Char('r'))));
    let shown = screen(&mut panel);
    assert!(shown.contains("Max retries reached"));
    assert!(!shown.contains("left)"));
    assert_eq!(panel.boundary().status(), BoundaryStatus::Exhausted);
    assert_eq!(panel.boundary().state().retry_count(), 2);

    // Retry is disabled: neither the key nor the control does anything.
    assert!(!panel.handle_key(key(KeyCode::Char('r'))));
    assert_eq!(panel.focus(), Some(FallbackControl::Reset));
    panel.apply(PanelAction::Retry);
    assert_eq!(panel.boundary().status(), BoundaryStatus::Exhausted);
    assert_eq!(panel.boundary().state().retry_count(), 2);
}

#[test]
fn zero_budget_exhausts_on_first_fault() {
    let mut panel = BoundaryPanel::new(
        FaultBoundary::new("kitchen").with_max_retries(0),
        Kitchen::new(Failure::Always),
    );
    assert!(screen(&mut panel).contains("Max retries reached"));
    assert_eq!(panel.boundary().status(), BoundaryStatus::Exhausted);
}

#[test]
fn observer_is_called_once_with_fault_and_context() {
    let seen: Rc<RefCell<Vec<(String, Vec<String>)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let boundary = FaultBoundary::new("kitchen").with_observer(
        move |fault: &Fault, context: &DiagnosticContext| {
            sink.borrow_mut().push((
                fault.message().to_string(),
                context.component_stack().to_vec(),
            ));
        },
    );
    let mut panel = BoundaryPanel::new(boundary, Kitchen::new(Failure::Always));

    for _ in 0..3 {
        screen(&mut panel);
    }

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "ticket 17 references a deleted menu item");
    assert_eq!(seen[0].1, ["kitchen", "Kitchen", "TicketRail"]);
}

#[test]
fn development_output_adds_only_the_trace() {
    let mut dev = BoundaryPanel::new(
        FaultBoundary::new("kitchen").with_policy(DiagnosticsPolicy::Development),
        Kitchen::new(Failure::Always),
    );
    let mut prod = BoundaryPanel::new(
        FaultBoundary::new("kitchen").with_policy(DiagnosticsPolicy::Production),
        Kitchen::new(Failure::Always),
    );
    let dev_screen = screen(&mut dev);
    let prod_screen = screen(&mut prod);

    assert!(dev_screen.contains("at TicketRail"));
    assert!(dev_screen.contains("at Kitchen"));
    assert!(!prod_screen.contains("at TicketRail"));
    assert!(!prod_screen.contains("Diagnostics"));

    let dev_text = dev.boundary().fallback_model().unwrap().to_plain_text();
    let prod_text = prod.boundary().fallback_model().unwrap().to_plain_text();
    let trace = dev_text
        .strip_prefix(prod_text.as_str())
        .expect("development text starts with production text");
    assert_eq!(
        trace,
        "\n\nticket 17 references a deleted menu item\n    at TicketRail\n    at Kitchen\n    at kitchen"
    );
}

#[test]
fn panics_are_contained_like_errors() {
    let mut panel = BoundaryPanel::new(
        FaultBoundary::new("kitchen").with_policy(DiagnosticsPolicy::Development),
        Kitchen::new(Failure::Panic),
    );
    let shown = screen(&mut panel);
    assert!(shown.contains("ticket rail index out of range"));
    assert!(shown.contains("at TicketRail"));
    assert_eq!(panel.boundary().status(), BoundaryStatus::Faulted);
}

#[test]
fn refresh_invokes_reload_exactly_once() {
    let reloads = Rc::new(Cell::new(0));
    let counter = Rc::clone(&reloads);
    let boundary =
        FaultBoundary::new("kitchen").with_reload(move || counter.set(counter.get() + 1));
    let mut panel = BoundaryPanel::new(boundary, Kitchen::new(Failure::Always));
    screen(&mut panel);
    let before = panel.boundary().state().clone();

    assert!(panel.handle_key(key(KeyCode::F(5))));
    assert_eq!(reloads.get(), 1);
    assert_eq!(panel.boundary().state(), &before);

    // Same primitive through focus + Enter.
    panel.handle_key(key(KeyCode::Left));
    assert_eq!(panel.focus(), Some(FallbackControl::Reload));
    panel.handle_key(key(KeyCode::Enter));
    assert_eq!(reloads.get(), 2);
}

#[test]
fn reset_returns_to_healthy_with_fresh_budget() {
    let mut panel = BoundaryPanel::new(
        FaultBoundary::new("kitchen").with_max_retries(1),
        Kitchen::new(Failure::Always),
    );
    screen(&mut panel);
    panel.handle_key(key(KeyCode::Char('r')));
    screen(&mut panel);
    assert_eq!(panel.boundary().status(), BoundaryStatus::Exhausted);

    assert!(panel.handle_key(key(KeyCode::Char('x'))));
    assert_eq!(panel.boundary().status(), BoundaryStatus::Healthy);
    assert_eq!(panel.boundary().state().retry_count(), 0);

    // Still broken, so the next frame faults again with the full budget.
    assert!(screen(&mut panel).contains("Try again (1 left)"));

    // Reset is also accepted while healthy.
    let mut healthy = kitchen(Failure::Never);
    healthy.apply(PanelAction::Reset);
    assert_eq!(healthy.boundary().status(), BoundaryStatus::Healthy);
}

#[test]
fn retry_reconstructs_the_subtree() {
    let subtree = Kitchen::new(Failure::FirstMount);
    let mounts = subtree.mounts();
    let mut panel = BoundaryPanel::new(FaultBoundary::new("kitchen"), subtree);

    assert!(screen(&mut panel).contains("printer queue not ready"));
    assert!(panel.handle_key(key(KeyCode::Enter)));
    assert!(screen(&mut panel).contains("3 tickets firing"));
    assert_eq!(mounts.get(), 2);
    assert_eq!(panel.boundary().state().retry_count(), 1);
}

#[test]
fn same_state_renders_identically() {
    let mut panel = kitchen(Failure::Always);
    let first = screen(&mut panel);
    let second = screen(&mut panel);
    assert_eq!(first, second);
}

#[test]
fn faulted_sibling_does_not_affect_neighbor() {
    let mut broken = kitchen(Failure::Always);
    let mut healthy = BoundaryPanel::new(FaultBoundary::new("bar"), Kitchen::new(Failure::Never));

    let mut terminal = Terminal::new(VT100Backend::new(160, 24)).unwrap();
    terminal
        .draw(|frame| {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(frame.area());
            broken.render(left, frame.buffer_mut());
            healthy.render(right, frame.buffer_mut());
        })
        .unwrap();

    let shown = terminal.backend().contents();
    assert!(shown.contains("Something went wrong"));
    assert!(shown.contains("3 tickets firing"));
    assert_eq!(healthy.boundary().status(), BoundaryStatus::Healthy);
}
