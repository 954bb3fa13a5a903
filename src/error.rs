//! Error taxonomy for the dashboard core.
//!
//! Fatal variants (`TerminalUnavailable`, `RenderWrite`, `MenuDefinition`)
//! abort the session with a non-zero exit after the terminal is restored.
//! `HandlerFailure` is always recovered at the controller boundary and
//! rendered into the content pane instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// No controlling TTY, or the terminal refused a required capability.
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),

    /// The terminal went away mid-session (e.g. an SSH drop).
    #[error("render write failed: {0}")]
    RenderWrite(#[from] std::io::Error),

    /// An action handler raised; recovered and shown in the content pane.
    #[error("handler `{key}` failed: {message}")]
    HandlerFailure { key: String, message: String },

    /// The menu tree file is malformed or violates a uniqueness rule.
    #[error("menu definition error: {0}")]
    MenuDefinition(String),
}

impl CoreError {
    pub fn handler(key: &str, message: impl Into<String>) -> Self {
        CoreError::HandlerFailure {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Fatal errors tear the session down; recoverable ones stay on screen.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CoreError::HandlerFailure { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
