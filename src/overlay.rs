//! Modal overlays: the password lock screen and the help panel.
//!
//! While an overlay is active it owns the entire key stream; navigation is
//! simply never consulted, which is what guarantees the machine comes back
//! untouched on disengage. Both engage and disengage are context switches:
//! the controller flushes the input reader on each, and disengage forces a
//! full repaint because the overlay owned the whole screen.

use crate::theme::{Theme, BORDER_ROUNDED};
use crate::width::{display_width, ellipsize, pad_to_width};

/// Challenge state for the lock screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockState {
    challenge: String,
    input: String,
    failed_attempts: u32,
}

impl LockState {
    pub fn engage(challenge: impl Into<String>) -> LockState {
        LockState {
            challenge: challenge.into(),
            input: String::new(),
            failed_attempts: 0,
        }
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn erase(&mut self) {
        self.input.pop();
    }

    /// Check the buffered input. Failure increments the counter and clears
    /// the buffer for a re-prompt; the counter is exposed so an outer
    /// policy can throttle.
    pub fn attempt(&mut self) -> bool {
        if self.input == self.challenge {
            true
        } else {
            self.failed_attempts += 1;
            self.input.clear();
            false
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn input_len(&self) -> usize {
        self.input.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    None,
    Help,
    Lock(LockState),
}

impl OverlayState {
    pub fn is_active(&self) -> bool {
        !matches!(self, OverlayState::None)
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, OverlayState::Lock(_))
    }
}

/// Shortcut reference shown by the help overlay.
const HELP_ROWS: &[(&str, &str)] = &[
    ("↑ ↓", "move selection"),
    ("← →", "switch section / leave submenu"),
    ("Enter", "open item or run action"),
    ("Esc", "back"),
    ("PgUp PgDn", "scroll content"),
    ("?", "toggle this help"),
    ("Ctrl+L", "lock the screen"),
    ("q / Ctrl+C", "quit"),
];

fn boxed_panel(title: &str, rows: &[String], theme: Theme, width: usize) -> Vec<String> {
    let colors = theme.colors();
    let border = BORDER_ROUNDED;
    let inner = width.saturating_sub(2).max(10);
    let horizontal: String = std::iter::repeat(border.horizontal).take(inner).collect();

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(theme.paint(
        colors.accent,
        &format!("{}{}{}", border.top_left, horizontal, border.top_right),
    ));
    let title_row = format!(" {} ", ellipsize(title, inner.saturating_sub(2)));
    lines.push(format!(
        "{}{}{}",
        theme.paint(colors.accent, &border.vertical.to_string()),
        theme.paint(colors.title, &pad_to_width(&title_row, inner)),
        theme.paint(colors.accent, &border.vertical.to_string()),
    ));
    for row in rows {
        lines.push(format!(
            "{}{}{}",
            theme.paint(colors.accent, &border.vertical.to_string()),
            pad_to_width(row, inner),
            theme.paint(colors.accent, &border.vertical.to_string()),
        ));
    }
    lines.push(theme.paint(
        colors.accent,
        &format!("{}{}{}", border.bottom_left, horizontal, border.bottom_right),
    ));
    lines
}

/// Render the lock screen body for a given panel width.
pub fn format_lock_panel(state: &LockState, theme: Theme, width: usize) -> Vec<String> {
    let dots: String = std::iter::repeat('•').take(state.input_len()).collect();
    let mut rows = vec![
        String::new(),
        " screen locked · enter passphrase".to_string(),
        format!(" > {dots}"),
    ];
    if state.failed_attempts() > 0 {
        rows.push(format!(
            " {} failed attempt{}",
            state.failed_attempts(),
            if state.failed_attempts() == 1 { "" } else { "s" }
        ));
    }
    rows.push(String::new());
    rows.push(" Enter to submit · Esc to cancel".to_string());
    boxed_panel("locked", &rows, theme, width)
}

pub fn format_help_panel(theme: Theme, width: usize) -> Vec<String> {
    let key_width = HELP_ROWS
        .iter()
        .map(|(key, _)| display_width(key))
        .max()
        .unwrap_or(0);
    let mut rows = vec![String::new()];
    for (key, action) in HELP_ROWS {
        rows.push(format!(" {}  {action}", pad_to_width(key, key_width)));
    }
    rows.push(String::new());
    boxed_panel("keys", &rows, theme, width)
}
