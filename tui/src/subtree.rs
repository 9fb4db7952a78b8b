//! What a boundary wraps, and what it shows instead.

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use tableside_core::ComponentStack;

/// Render context handed to subtree code.
///
/// Children entered through [`RenderCx::child`] show up as frames in the
/// diagnostic trace if they fault.
pub struct RenderCx<'a> {
    area: Rect,
    buf: &'a mut Buffer,
    stack: &'a mut ComponentStack,
}

impl<'a> RenderCx<'a> {
    pub(crate) fn new(area: Rect, buf: &'a mut Buffer, stack: &'a mut ComponentStack) -> Self {
        Self { area, buf, stack }
    }

    #[must_use]
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut *self.buf
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        widget.render(area, &mut *self.buf);
    }

    /// Renders a named child component into `area`.
    pub fn child(
        &mut self,
        name: impl Into<String>,
        area: Rect,
        f: impl FnOnce(&mut RenderCx<'_>) -> Result<()>,
    ) -> Result<()> {
        let buf = &mut *self.buf;
        self.stack.enter(name, |stack| {
            let mut cx = RenderCx::new(area, buf, stack);
            f(&mut cx)
        })
    }
}

/// A wrapped subtree. Any method may fault, by `Err` or by panic.
pub trait Subtree {
    /// Frame name in diagnostic traces.
    fn name(&self) -> &str;

    /// Construction. Runs before the first render and again after every
    /// retry or reset.
    fn mount(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Result<()>;

    /// Key input while healthy. Returns whether the key was consumed.
    fn handle_key(&mut self, _key: KeyEvent) -> Result<bool> {
        Ok(false)
    }
}

/// Custom fallback UI. Stateless: it gets the area to paint and nothing else.
///
/// Faults raised here are not contained by the boundary that shows it.
pub trait Fallback {
    fn render(&self, area: Rect, buf: &mut Buffer);
}

impl<F> Fallback for F
where
    F: Fn(Rect, &mut Buffer),
{
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self(area, buf);
    }
}
