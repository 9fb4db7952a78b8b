//! Config file values flowing into a boundary.

use std::io::Write;

use crossterm::event::KeyCode;

use tableside_config::TablesideConfig;
use tableside_core::{BoundaryStatus, DiagnosticsPolicy, FaultBoundary};
use tableside_tui::BoundaryPanel;

use crate::common::{Failure, Kitchen, key, screen};

fn boundary_from(config: &TablesideConfig) -> FaultBoundary {
    let policy = config
        .app
        .as_ref()
        .and_then(|app| app.environment.as_deref())
        .map(DiagnosticsPolicy::from_environment)
        .unwrap_or_default();
    FaultBoundary::new("kitchen")
        .with_max_retries(config.max_retries())
        .with_policy(policy)
}

#[test]
fn development_config_exposes_trace_and_sets_budget() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[app]\nenvironment = \"Development\"\n\n[boundary]\nmax_retries = 1"
    )
    .unwrap();
    let config = TablesideConfig::load_from(file.path()).unwrap().unwrap();

    let mut panel = BoundaryPanel::new(boundary_from(&config), Kitchen::new(Failure::Always))
        .with_ui_options(config.ui_options());
    let shown = screen(&mut panel);
    assert!(shown.contains("Try again (1 left)"));
    assert!(shown.contains("at TicketRail"));

    panel.handle_key(key(KeyCode::Char('r')));
    screen(&mut panel);
    assert_eq!(panel.boundary().status(), BoundaryStatus::Exhausted);
}

#[test]
fn unknown_environment_hides_trace() {
    let config = TablesideConfig::parse("[app]\nenvironment = \"staging\"").unwrap();
    let mut panel = BoundaryPanel::new(boundary_from(&config), Kitchen::new(Failure::Always));
    let shown = screen(&mut panel);
    assert!(shown.contains("ticket 17 references a deleted menu item"));
    assert!(!shown.contains("at TicketRail"));
}

#[test]
fn ascii_only_config_uses_ascii_glyphs() {
    let config = TablesideConfig::parse("[app]\nascii_only = true").unwrap();
    let mut panel = BoundaryPanel::new(boundary_from(&config), Kitchen::new(Failure::Always))
        .with_ui_options(config.ui_options());
    let shown = screen(&mut panel);
    assert!(shown.contains("X Something went wrong"));
    assert!(shown.contains("> Try again"));
    assert!(!shown.contains('✗'));
}
