//! Anti-ghost debouncing: identical logical keys arriving within the window
//! collapse to one delivered event.
//!
//! Some terminals (and some key-repeat misconfigurations) deliver a burst of
//! duplicate arrow reports for a single physical press, which used to make
//! the selection jump several items at once. The window is deliberately
//! configurable; the right constant varies by emulator.

use std::time::Duration;

use crate::input::event::KeyEvent;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<KeyEvent>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Debouncer {
        Debouncer { window, last: None }
    }

    /// True when the event should be delivered; false when it collapses
    /// into the previous one.
    pub fn accept(&mut self, event: KeyEvent) -> bool {
        if let Some(prev) = self.last {
            if prev.kind == event.kind
                && event.at.saturating_duration_since(prev.at) < self.window
            {
                return false;
            }
        }
        self.last = Some(event);
        true
    }

    /// Forget history; part of the context-switch flush so the first key in
    /// a new context is never swallowed as a duplicate of the old one.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
