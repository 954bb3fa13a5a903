//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_TICK_SECS, MAX_DEBOUNCE_MS, MAX_TICK_SECS, MIN_TICK_SECS,
};

use crate::theme::Theme;

/// CLI options for the termdeck dashboard. Validated values keep the tick
/// and debounce timers inside sane bounds before any thread is spawned.
#[derive(Debug, Parser, Clone)]
#[command(name = "termdeck", about = "Keyboard-driven terminal dashboard", author, version)]
pub struct AppConfig {
    /// Menu tree definition file (YAML or JSON); built-in menu when absent
    #[arg(long = "menu", env = "TERMDECK_MENU", value_name = "FILE")]
    pub menu_file: Option<PathBuf>,

    /// Validate the menu file and exit without entering the TUI
    #[arg(long = "check-menu", default_value_t = false)]
    pub check_menu: bool,

    /// Title shown in the header
    #[arg(long = "title", default_value = "termdeck")]
    pub title: String,

    /// Status ticker period in seconds
    #[arg(long = "tick-secs", default_value_t = DEFAULT_TICK_SECS)]
    pub tick_secs: u64,

    /// Input debounce window in milliseconds (0 disables debouncing)
    #[arg(long = "debounce-ms", default_value_t = DEFAULT_DEBOUNCE_MS)]
    pub debounce_ms: u64,

    /// Passphrase for the Ctrl+L lock overlay; locking is off without it
    #[arg(long = "lock-pass", env = "TERMDECK_LOCK_PASS", hide_env_values = true)]
    pub lock_pass: Option<String>,

    /// Color theme name
    #[arg(long = "theme", default_value = "slate")]
    pub theme: String,

    /// Disable all color output
    #[arg(long = "no-color", default_value_t = false)]
    pub no_color: bool,

    /// Write a debug log to the temp dir
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Suppress all log files, overriding --logs
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,
}

impl AppConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resolve_theme(&self) -> Theme {
        Theme::from_name(&self.theme, self.no_color)
    }
}
