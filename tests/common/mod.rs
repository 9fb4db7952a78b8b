//! Shared subtrees and helpers for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::widgets::Paragraph;

use tableside_tui::{BoundaryPanel, RenderCx, Subtree};

use crate::vt100_backend::VT100Backend;

/// How a [`Kitchen`] subtree misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Never,
    /// Every render returns an error from the `TicketRail` child.
    Always,
    /// Every render panics inside the `TicketRail` child.
    Panic,
    /// Only the first mount fails.
    FirstMount,
}

/// Kitchen display subtree with a `TicketRail` child.
pub struct Kitchen {
    failure: Failure,
    mounts: Rc<Cell<u32>>,
}

impl Kitchen {
    pub fn new(failure: Failure) -> Self {
        Self {
            failure,
            mounts: Rc::default(),
        }
    }

    /// Shared mount counter; it survives the subtree being moved into a panel.
    pub fn mounts(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.mounts)
    }
}

impl Subtree for Kitchen {
    fn name(&self) -> &str {
        "Kitchen"
    }

    fn mount(&mut self) -> Result<()> {
        self.mounts.set(self.mounts.get() + 1);
        if self.failure == Failure::FirstMount && self.mounts.get() == 1 {
            bail!("printer queue not ready");
        }
        Ok(())
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Result<()> {
        let area = cx.area();
        let failure = self.failure;
        cx.child("TicketRail", area, |cx| {
            match failure {
                Failure::Always => bail!("ticket 17 references a deleted menu item"),
                Failure::Panic => panic!("ticket rail index out of range"),
                Failure::Never | Failure::FirstMount => {}
            }
            cx.render_widget(Paragraph::new("3 tickets firing"), area);
            Ok(())
        })
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Draws one frame of `panel` on a fresh virtual terminal.
pub fn draw<S: Subtree>(
    panel: &mut BoundaryPanel<S>,
    width: u16,
    height: u16,
) -> Terminal<VT100Backend> {
    let mut terminal = Terminal::new(VT100Backend::new(width, height)).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            panel.render(area, frame.buffer_mut());
        })
        .unwrap();
    terminal
}

/// Screen text after one frame of `panel`.
pub fn screen<S: Subtree>(panel: &mut BoundaryPanel<S>) -> String {
    draw(panel, 80, 24).backend().contents()
}
