//! Minimal color palette and box-drawing set for the dashboard chrome.
//!
//! Colors are raw SGR runs; `Theme::Mono` keeps every paint call a no-op so
//! `--no-color` (and `NO_COLOR`) strip styling without touching layout.

use std::env;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Default palette: cyan accents, muted chrome.
    Slate,
    /// No styling at all.
    Mono,
}

/// SGR fragments for one palette.
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    pub accent: &'static str,
    pub title: &'static str,
    pub dim: &'static str,
    pub error: &'static str,
    pub ok: &'static str,
    pub invert: &'static str,
}

const SLATE: ThemeColors = ThemeColors {
    accent: "\x1b[96m",
    title: "\x1b[1;96m",
    dim: "\x1b[90m",
    error: "\x1b[1;91m",
    ok: "\x1b[92m",
    invert: "\x1b[7m",
};

const MONO: ThemeColors = ThemeColors {
    accent: "",
    title: "",
    dim: "",
    error: "",
    ok: "",
    invert: "\x1b[7m",
};

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Slate => SLATE,
            Theme::Mono => MONO,
        }
    }

    /// Wrap `text` in the given SGR fragment, resetting afterwards.
    pub fn paint(self, sgr: &str, text: &str) -> String {
        if sgr.is_empty() {
            text.to_string()
        } else {
            format!("{sgr}{text}{RESET}")
        }
    }

    pub fn from_name(name: &str, no_color: bool) -> Theme {
        if no_color || env::var_os("NO_COLOR").is_some() {
            return Theme::Mono;
        }
        match name {
            "mono" => Theme::Mono,
            _ => Theme::Slate,
        }
    }
}

/// Border character set for overlay panels.
#[derive(Debug, Clone, Copy)]
pub struct BorderSet {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

pub const BORDER_ROUNDED: BorderSet = BorderSet {
    top_left: '╭',
    top_right: '╮',
    bottom_left: '╰',
    bottom_right: '╯',
    horizontal: '─',
    vertical: '│',
};
