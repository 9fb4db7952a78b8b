//! Application state: two bounded panes and the chrome around them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use tableside_config::TablesideConfig;
use tableside_core::{DiagnosticContext, DiagnosticsPolicy, Fault, FaultBoundary};
use tableside_tui::{BoundaryPanel, Glyphs, Palette, glyphs, palette, styles};
use tableside_types::{DEFAULT_MAX_RETRIES, sanitize_fault_text};
use tableside_types::ui::UiOptions;

use crate::screens::{Dashboard, FloorPlan};

/// Startup settings shared by every boundary.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub max_retries: u32,
    pub policy: DiagnosticsPolicy,
    pub ui: UiOptions,
}

impl Settings {
    pub fn from_config(config: Option<&TablesideConfig>) -> Self {
        match config {
            Some(config) => Self {
                max_retries: config.max_retries(),
                policy: config.diagnostics_policy(),
                ui: config.ui_options(),
            },
            None => Self {
                max_retries: DEFAULT_MAX_RETRIES,
                policy: TablesideConfig::default().diagnostics_policy(),
                ui: UiOptions::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Dashboard,
    Floor,
}

/// Latest fault report, shown in the status bar.
type Notice = Rc<RefCell<Option<String>>>;

pub struct App {
    dashboard: BoundaryPanel<Dashboard>,
    floor: BoundaryPanel<FloorPlan>,
    active: Pane,
    notice: Notice,
    reload_requested: Rc<Cell<bool>>,
    quit: bool,
    palette: Palette,
    glyphs: Glyphs,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let palette = palette(settings.ui);
        let notice: Notice = Rc::default();
        let reload_requested = Rc::new(Cell::new(false));

        let dashboard = BoundaryPanel::new(
            boundary("dashboard", settings, &notice, &reload_requested),
            Dashboard::new(palette),
        )
        .with_ui_options(settings.ui);
        let floor = BoundaryPanel::new(
            boundary("floor", settings, &notice, &reload_requested),
            FloorPlan::new(palette, Rc::new(Cell::new(false))),
        )
        .with_ui_options(settings.ui);

        Self {
            dashboard,
            floor,
            active: Pane::Floor,
            notice,
            reload_requested,
            quit: false,
            palette,
            glyphs: glyphs(settings.ui),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether a boundary asked for a full rebuild.
    pub fn reload_requested(&self) -> bool {
        self.reload_requested.get()
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Event::Key(key) = event {
            self.handle_key(*key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        let consumed = match self.active {
            Pane::Dashboard => self.dashboard.handle_key(key),
            Pane::Floor => self.floor.handle_key(key),
        };
        if consumed {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('1') => self.active = Pane::Dashboard,
            KeyCode::Char('2') => self.active = Pane::Floor,
            _ => {}
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let palette = self.palette;
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.bg_dark)),
            frame.area(),
        );

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .areas(body);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " Tableside",
                Style::default()
                    .fg(palette.primary)
                    .add_modifier(Modifier::BOLD),
            ))),
            header,
        );

        let inner = self.pane_frame(frame, left, "1 Dashboard", Pane::Dashboard);
        self.dashboard.render(inner, frame.buffer_mut());
        let inner = self.pane_frame(frame, right, "2 Floor", Pane::Floor);
        self.floor.render(inner, frame.buffer_mut());

        frame.render_widget(Paragraph::new(self.status_line()), footer);
    }

    fn pane_frame(&self, frame: &mut Frame, area: Rect, title: &str, pane: Pane) -> Rect {
        let border = if self.active == pane {
            self.palette.accent
        } else {
            self.palette.bg_border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {title} "));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        inner
    }

    fn status_line(&self) -> Line<'static> {
        let palette = &self.palette;
        let floor_healthy = self.floor.boundary().status().is_healthy();
        let mut hints: Vec<(&str, &str)> = vec![("1/2", "pane")];
        if self.active == Pane::Floor && floor_healthy {
            hints.extend([
                (self.glyphs.arrows, "table"),
                ("s", "seat"),
                ("f", "fault"),
                ("p", "panic"),
                ("b", "outage"),
            ]);
        }
        hints.push(("q", "quit"));

        let mut spans = vec![Span::raw(" ")];
        for (idx, (key, action)) in hints.into_iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(
                    format!(" {} ", self.glyphs.separator),
                    styles::key_hint(palette),
                ));
            }
            spans.push(Span::styled(key.to_string(), styles::key_highlight(palette)));
            spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
        }
        if let Some(notice) = self.notice.borrow().as_deref() {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                format!("{} {notice}", self.glyphs.notice),
                Style::default().fg(palette.warning),
            ));
        }
        Line::from(spans)
    }
}

fn boundary(
    name: &str,
    settings: Settings,
    notice: &Notice,
    reload_requested: &Rc<Cell<bool>>,
) -> FaultBoundary {
    let notice = Rc::clone(notice);
    let reload_requested = Rc::clone(reload_requested);
    let boundary_name = name.to_string();
    FaultBoundary::new(name)
        .with_max_retries(settings.max_retries)
        .with_policy(settings.policy)
        .with_observer(move |fault: &Fault, context: &DiagnosticContext| {
            tracing::warn!(
                boundary = %boundary_name,
                frame = context.failing_frame().unwrap_or("unknown"),
                depth = context.component_stack().len(),
                "Fault reported: {}",
                fault.message()
            );
            *notice.borrow_mut() = Some(format!(
                "{boundary_name}: {}",
                sanitize_fault_text(fault.message())
            ));
        })
        .with_reload(move || reload_requested.set(true))
}
