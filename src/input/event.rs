use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Keys with a fixed meaning regardless of navigation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl+C.
    Quit,
    /// F1.
    Help,
    /// Ctrl+L.
    Lock,
    PageUp,
    PageDown,
    /// Backspace / DEL.
    Erase,
}

/// A decoded, logical key. Printable characters stay characters here;
/// context-dependent bindings (`q`, `?`) are resolved by the controller so a
/// locked screen can still receive them as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Char(char),
    Direction(Direction),
    Confirm,
    Cancel,
    Shortcut(Shortcut),
}

/// Immutable, timestamped input event. Produced only by the input reader;
/// the timestamp feeds the debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub at: Instant,
}

impl KeyEvent {
    pub fn new(kind: KeyKind) -> KeyEvent {
        KeyEvent {
            kind,
            at: Instant::now(),
        }
    }

    pub fn at(kind: KeyKind, at: Instant) -> KeyEvent {
        KeyEvent { kind, at }
    }
}
