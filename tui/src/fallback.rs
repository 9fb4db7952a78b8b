//! Default fallback widget.
//!
//! Paints a [`FallbackModel`]: heading, fault message, exhaustion notice,
//! recovery controls, key hints, and (development only) the diagnostic text.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Widget, Wrap};

use tableside_types::{FallbackControl, FallbackModel};

use crate::theme::{Glyphs, Palette, styles};

const MAX_WIDTH: u16 = 76;
/// Borders plus horizontal padding.
const CHROME_WIDTH: u16 = 2 + 4;
const CHROME_HEIGHT: u16 = 2 + 2;

pub struct DefaultFallback<'a> {
    model: &'a FallbackModel,
    focus: FallbackControl,
    palette: &'a Palette,
    glyphs: &'a Glyphs,
}

impl<'a> DefaultFallback<'a> {
    #[must_use]
    pub fn new(
        model: &'a FallbackModel,
        focus: FallbackControl,
        palette: &'a Palette,
        glyphs: &'a Glyphs,
    ) -> Self {
        Self {
            model,
            focus,
            palette,
            glyphs,
        }
    }
}

impl Widget for DefaultFallback<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let lines = fallback_lines(self.model, self.focus, self.palette, self.glyphs);

        let widest = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
        let width = widest
            .saturating_add(CHROME_WIDTH)
            .min(MAX_WIDTH)
            .min(area.width);

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(self.palette.text_primary));
        let inner_width = width.saturating_sub(CHROME_WIDTH).max(1);
        let text_height = paragraph.line_count(inner_width) as u16;
        let height = text_height.saturating_add(CHROME_HEIGHT).min(area.height);

        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let boxed = Rect::new(x, y, width, height);

        Clear.render(area, buf);
        Block::default()
            .style(Style::default().bg(self.palette.bg_dark))
            .render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.palette.error))
            .padding(Padding::new(2, 2, 1, 1))
            .style(Style::default().bg(self.palette.bg_dark));
        paragraph.block(block).render(boxed, buf);
    }
}

/// Every line the default fallback shows, before wrapping.
#[must_use]
pub fn fallback_lines(
    model: &FallbackModel,
    focus: FallbackControl,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", glyphs.fault), styles::heading(palette)),
            Span::styled(model.heading(), styles::heading(palette)),
        ]),
        Line::from(""),
    ];

    for text in model.message().lines() {
        lines.push(Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(palette.text_primary),
        )));
    }

    if let Some(notice) = model.notice() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", glyphs.notice),
                Style::default().fg(palette.warning),
            ),
            Span::styled(
                notice,
                Style::default()
                    .fg(palette.warning)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(controls_line(model, focus, palette, glyphs));
    lines.push(key_hints_line(model, palette, glyphs));

    if let Some(diagnostic) = model.diagnostic() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Diagnostics",
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::BOLD),
        )));
        for text in diagnostic.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(palette.text_secondary),
            )));
        }
    }

    lines
}

fn controls_line(
    model: &FallbackModel,
    focus: FallbackControl,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, control) in FallbackControl::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let label = model.label(control);
        let enabled = model.is_enabled(control);
        let (text, style) = if !enabled {
            (format!("  {label} "), styles::control_disabled(palette))
        } else if control == focus {
            (
                format!("{} {label} ", glyphs.selected),
                styles::control_focused(palette),
            )
        } else {
            (format!("  {label} "), styles::control(palette))
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn key_hints_line(model: &FallbackModel, palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    let mut hints: Vec<(&'static str, &'static str)> = Vec::new();
    if model.is_enabled(FallbackControl::Retry) {
        hints.push(("r", "retry"));
    }
    hints.extend([
        ("x", "reset"),
        ("F5", "refresh"),
        (glyphs.arrows, "select"),
        ("Enter", "activate"),
    ]);

    let mut spans = Vec::new();
    for (idx, (key, action)) in hints.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(
                format!(" {} ", glyphs.separator),
                styles::key_hint(palette),
            ));
        }
        spans.push(Span::styled(key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }
    Line::from(spans)
}
