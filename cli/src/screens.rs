//! Demo screens hosted behind fault boundaries.
//!
//! `Dashboard` is static. `FloorPlan` can be told to fault on demand so the
//! boundary can be exercised from the keyboard.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use tableside_tui::{Palette, RenderCx, Subtree};

struct OpenOrder {
    ticket: u32,
    table: u16,
    items: &'static str,
    minutes: u32,
}

fn sample_orders() -> Vec<OpenOrder> {
    vec![
        OpenOrder {
            ticket: 101,
            table: 4,
            items: "2x margherita, caesar salad, sparkling water",
            minutes: 6,
        },
        OpenOrder {
            ticket: 102,
            table: 7,
            items: "ribeye (medium rare), fries",
            minutes: 14,
        },
        OpenOrder {
            ticket: 103,
            table: 2,
            items: "tomato soup, grilled cheese",
            minutes: 3,
        },
        OpenOrder {
            ticket: 104,
            table: 11,
            items: "tasting menu x4, wine pairing",
            minutes: 22,
        },
    ]
}

/// Truncates `text` to at most `width` display columns.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width >= 3 {
        out.push_str("...");
    }
    out
}

pub struct Dashboard {
    palette: Palette,
    orders: Vec<OpenOrder>,
}

impl Dashboard {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            orders: Vec::new(),
        }
    }
}

impl Subtree for Dashboard {
    fn name(&self) -> &str {
        "Dashboard"
    }

    fn mount(&mut self) -> Result<()> {
        self.orders = sample_orders();
        Ok(())
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Result<()> {
        let [summary, list] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(cx.area());
        let palette = self.palette;
        let orders = &self.orders;

        cx.child("Summary", summary, |cx| {
            let waiting = orders.iter().map(|o| o.minutes).max().unwrap_or(0);
            let lines = vec![
                Line::from(vec![
                    Span::styled("Open tickets ", Style::default().fg(palette.text_muted)),
                    Span::styled(
                        orders.len().to_string(),
                        Style::default()
                            .fg(palette.text_primary)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Longest wait ", Style::default().fg(palette.text_muted)),
                    Span::styled(
                        format!("{waiting} min"),
                        Style::default().fg(if waiting > 15 {
                            palette.warning
                        } else {
                            palette.success
                        }),
                    ),
                ]),
            ];
            let area = cx.area();
            cx.render_widget(Paragraph::new(lines), area);
            Ok(())
        })?;

        cx.child("OpenOrders", list, |cx| {
            let area = cx.area();
            let items_width = (area.width as usize).saturating_sub(16);
            let lines: Vec<Line> = orders
                .iter()
                .map(|order| {
                    Line::from(vec![
                        Span::styled(
                            format!("#{:<4}", order.ticket),
                            Style::default().fg(palette.accent),
                        ),
                        Span::styled(
                            format!("T{:<3} ", order.table),
                            Style::default().fg(palette.text_secondary),
                        ),
                        Span::styled(
                            format!("{:>3}m ", order.minutes),
                            Style::default().fg(palette.text_muted),
                        ),
                        Span::styled(
                            fit(order.items, items_width),
                            Style::default().fg(palette.text_primary),
                        ),
                    ])
                })
                .collect();
            cx.render_widget(Paragraph::new(lines), area);
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Open,
    Seated,
    Dirty,
}

impl TableState {
    fn label(self) -> &'static str {
        match self {
            TableState::Open => "open",
            TableState::Seated => "seated",
            TableState::Dirty => "needs bussing",
        }
    }

    fn next(self) -> Self {
        match self {
            TableState::Open => TableState::Seated,
            TableState::Seated => TableState::Dirty,
            TableState::Dirty => TableState::Open,
        }
    }
}

struct Table {
    number: u16,
    seats: u8,
    state: TableState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InjectedFault {
    Error,
    Panic,
}

const CELL_WIDTH: u16 = 16;
const CELL_HEIGHT: u16 = 4;

pub struct FloorPlan {
    palette: Palette,
    /// Simulated outage of the layout service. Lives outside the subtree, so
    /// only a full rebuild clears it.
    outage: Rc<Cell<bool>>,
    tables: Vec<Table>,
    selected: usize,
    pending: Option<InjectedFault>,
}

impl FloorPlan {
    pub fn new(palette: Palette, outage: Rc<Cell<bool>>) -> Self {
        Self {
            palette,
            outage,
            tables: Vec::new(),
            selected: 0,
            pending: None,
        }
    }
}

impl Subtree for FloorPlan {
    fn name(&self) -> &str {
        "FloorPlan"
    }

    fn mount(&mut self) -> Result<()> {
        if self.outage.get() {
            return Err(anyhow!("layout service unavailable"))
                .context("loading floor layout");
        }
        self.tables = [(1, 2), (2, 4), (3, 4), (4, 2), (5, 6), (6, 8), (7, 4), (8, 2)]
            .into_iter()
            .map(|(number, seats)| Table {
                number,
                seats,
                state: TableState::Open,
            })
            .collect();
        self.selected = 0;
        self.pending = None;
        Ok(())
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Result<()> {
        if self.outage.get() {
            return Err(anyhow!("layout service unavailable"))
                .context("refreshing floor layout");
        }
        let palette = self.palette;
        let selected = self.selected;
        let pending = self.pending;
        let tables = &self.tables;
        let area = cx.area();

        cx.child("TableGrid", area, |cx| {
            let columns = (area.width / CELL_WIDTH).max(1);
            for (idx, table) in tables.iter().enumerate() {
                let col = idx as u16 % columns;
                let row = idx as u16 / columns;
                let y = area.y + row * CELL_HEIGHT;
                if y + CELL_HEIGHT > area.bottom() {
                    break;
                }
                let cell = Rect::new(
                    area.x + col * CELL_WIDTH,
                    y,
                    CELL_WIDTH.min(area.width),
                    CELL_HEIGHT,
                );
                let is_selected = idx == selected;
                cx.child(format!("Table {}", table.number), cell, |cx| {
                    if is_selected {
                        match pending {
                            Some(InjectedFault::Error) => bail!("table {} has no section", table.number),
                            Some(InjectedFault::Panic) => {
                                panic!("seat count overflow at table {}", table.number)
                            }
                            None => {}
                        }
                    }
                    render_table(cx, table, is_selected, &palette);
                    Ok(())
                })?;
            }
            Ok(())
        })
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let len = self.tables.len();
        match key.code {
            KeyCode::Char('f') => self.pending = Some(InjectedFault::Error),
            KeyCode::Char('p') => self.pending = Some(InjectedFault::Panic),
            KeyCode::Char('b') => self.outage.set(true),
            KeyCode::Left if len > 0 => self.selected = (self.selected + len - 1) % len,
            KeyCode::Right if len > 0 => self.selected = (self.selected + 1) % len,
            KeyCode::Char('s') => {
                let table = self
                    .tables
                    .get_mut(self.selected)
                    .context("selected table is out of range")?;
                table.state = table.state.next();
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn render_table(cx: &mut RenderCx<'_>, table: &Table, selected: bool, palette: &Palette) {
    let border = if selected {
        palette.accent
    } else {
        palette.bg_border
    };
    let state_color = match table.state {
        TableState::Open => palette.success,
        TableState::Seated => palette.primary,
        TableState::Dirty => palette.warning,
    };
    let width = cx.area().width.saturating_sub(2) as usize;
    let lines = vec![
        Line::from(Span::styled(
            format!("{} seats", table.seats),
            Style::default().fg(palette.text_secondary),
        )),
        Line::from(Span::styled(
            fit(table.state.label(), width),
            Style::default().fg(state_color),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" T{} ", table.number));
    let area = cx.area();
    cx.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::fit;

    #[test]
    fn fit_keeps_short_text() {
        assert_eq!(fit("fries", 10), "fries");
    }

    #[test]
    fn fit_truncates_by_display_width() {
        assert_eq!(fit("ribeye (medium rare)", 10), "ribeye ...");
        assert_eq!(fit("寿司寿司寿司", 7), "寿司...");
    }

    #[test]
    fn fit_handles_tiny_widths() {
        assert_eq!(fit("margherita", 2), "");
    }
}
