//! Scrollable content pane state.
//!
//! The buffer survives navigation so the pane never goes blank between
//! actions; it is replaced only by an explicit `update` (or cleared by a
//! transition the navigation machine decides on). Volatile rows are patched
//! in place by key, leaving scroll position and every other row untouched.

use crate::width::ellipsize;

/// How many rows the pane retains before trimming from the top.
const CONTENT_MAX_LINES: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    Dim,
    Error,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub kind: LineKind,
    /// Rows tagged with a key are rewritten by `update_volatile`.
    pub volatile_key: Option<String>,
}

impl Line {
    pub fn normal(text: impl Into<String>) -> Line {
        Line {
            text: text.into(),
            kind: LineKind::Normal,
            volatile_key: None,
        }
    }

    pub fn dim(text: impl Into<String>) -> Line {
        Line {
            text: text.into(),
            kind: LineKind::Dim,
            volatile_key: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Line {
        Line {
            text: text.into(),
            kind: LineKind::Error,
            volatile_key: None,
        }
    }

    pub fn volatile(key: impl Into<String>, text: impl Into<String>) -> Line {
        Line {
            text: text.into(),
            kind: LineKind::Normal,
            volatile_key: Some(key.into()),
        }
    }
}

#[derive(Debug)]
pub struct ContentBuffer {
    title: String,
    title_is_error: bool,
    lines: Vec<Line>,
    scroll: usize,
    viewport: usize,
}

impl ContentBuffer {
    pub fn new() -> ContentBuffer {
        ContentBuffer {
            title: String::new(),
            title_is_error: false,
            lines: Vec::new(),
            scroll: 0,
            viewport: 0,
        }
    }

    /// Replace the whole pane and jump back to the top.
    pub fn update(&mut self, title: impl Into<String>, lines: Vec<Line>) {
        self.title = title.into();
        self.title_is_error = false;
        self.lines = lines;
        self.scroll = 0;
    }

    /// Replace the pane with an error report; the title renders in the
    /// error style so a failed action is unmistakable.
    pub fn update_error(&mut self, title: impl Into<String>, message: &str) {
        self.title = title.into();
        self.title_is_error = true;
        self.lines = message.lines().map(Line::error).collect();
        self.scroll = 0;
    }

    /// Append incremental output (worker progress), trimming old rows and
    /// following the tail when the reader was already at the bottom.
    pub fn append(&mut self, lines: Vec<Line>) {
        let was_at_tail = self.scroll == self.max_scroll();
        self.lines.extend(lines);
        if self.lines.len() > CONTENT_MAX_LINES {
            let excess = self.lines.len() - CONTENT_MAX_LINES;
            self.lines.drain(0..excess);
        }
        if was_at_tail {
            self.scroll = self.max_scroll();
        } else {
            self.clamp_scroll();
        }
    }

    /// Patch every row tagged with `key`, leaving scroll alone.
    /// Returns true when any row actually changed.
    pub fn update_volatile(&mut self, key: &str, text: &str) -> bool {
        let mut changed = false;
        for line in &mut self.lines {
            if line.volatile_key.as_deref() == Some(key) && line.text != text {
                line.text = text.to_string();
                changed = true;
            }
        }
        changed
    }

    /// Move the viewport, clamped to `[0, max_scroll]`.
    pub fn scroll(&mut self, delta: isize) {
        let next = if delta.is_negative() {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize)
        };
        self.scroll = next.min(self.max_scroll());
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport)
    }

    pub fn is_scrollable(&self) -> bool {
        self.lines.len() > self.viewport
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_is_error(&self) -> bool {
        self.title_is_error
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Rows currently inside the viewport.
    pub fn visible(&self) -> &[Line] {
        let end = (self.scroll + self.viewport).min(self.lines.len());
        &self.lines[self.scroll.min(end)..end]
    }

    /// `"12-24/160"` style position indicator for the footer.
    pub fn position_label(&self) -> String {
        if !self.is_scrollable() {
            return String::new();
        }
        let first = self.scroll + 1;
        let last = (self.scroll + self.viewport).min(self.lines.len());
        ellipsize(&format!("{first}-{last}/{}", self.lines.len()), 16)
    }
}

impl Default for ContentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize, viewport: usize) -> ContentBuffer {
        let mut buf = ContentBuffer::new();
        buf.set_viewport(viewport);
        buf.update(
            "test",
            (0..n).map(|i| Line::normal(format!("row {i}"))).collect(),
        );
        buf
    }

    #[test]
    fn scroll_clamps_to_bounds() {
        let mut buf = filled(20, 5);
        buf.scroll(-3);
        assert_eq!(buf.scroll_offset(), 0);
        buf.scroll(100);
        assert_eq!(buf.scroll_offset(), 15);
        buf.scroll(-2);
        assert_eq!(buf.scroll_offset(), 13);
    }

    #[test]
    fn update_resets_scroll() {
        let mut buf = filled(20, 5);
        buf.scroll(10);
        buf.update("fresh", vec![Line::normal("only")]);
        assert_eq!(buf.scroll_offset(), 0);
        assert!(!buf.is_scrollable());
    }

    #[test]
    fn update_volatile_patches_without_moving_scroll() {
        let mut buf = ContentBuffer::new();
        buf.set_viewport(2);
        buf.update(
            "svc",
            vec![
                Line::normal("static"),
                Line::volatile("clock", "00:00:00"),
                Line::normal("more"),
                Line::normal("tail"),
            ],
        );
        buf.scroll(2);
        assert!(buf.update_volatile("clock", "12:34:56"));
        assert!(!buf.update_volatile("clock", "12:34:56"));
        assert_eq!(buf.scroll_offset(), 2);
        assert_eq!(buf.visible()[0].text, "more");
    }

    #[test]
    fn append_follows_tail_only_when_already_there() {
        let mut buf = filled(5, 5);
        assert_eq!(buf.scroll_offset(), 0);
        buf.append(vec![Line::normal("six")]);
        // was at the tail (offset 0 == max 0 before append), so follow
        assert_eq!(buf.scroll_offset(), buf.max_scroll());

        let mut pinned = filled(20, 5);
        pinned.scroll(3);
        pinned.append(vec![Line::normal("new")]);
        assert_eq!(pinned.scroll_offset(), 3);
    }

    #[test]
    fn append_trims_history() {
        let mut buf = ContentBuffer::new();
        buf.set_viewport(10);
        buf.update("big", Vec::new());
        buf.append((0..3_000).map(|i| Line::normal(format!("{i}"))).collect());
        assert!(buf.len() <= CONTENT_MAX_LINES);
    }

    #[test]
    fn visible_slices_the_viewport() {
        let mut buf = filled(10, 4);
        buf.scroll(2);
        let rows: Vec<&str> = buf.visible().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(rows, vec!["row 2", "row 3", "row 4", "row 5"]);
    }
}
