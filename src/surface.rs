//! Terminal ownership: raw mode, alternate screen, restore-on-any-exit.
//!
//! Restoration runs exactly once no matter how the process leaves (normal
//! return, `?` propagation, or panic) via idempotent atomic flags shared by
//! the RAII guard and a process-wide panic hook.

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

use crate::error::CoreError;
use crate::log_debug;

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Holds the terminal in raw mode + alternate screen for its lifetime.
pub struct SurfaceGuard;

impl SurfaceGuard {
    /// Enter raw mode and the alternate screen, hiding the cursor.
    ///
    /// Refuses with `TerminalUnavailable` when stdout has no controlling
    /// terminal; a half-acquired state is rolled back before returning.
    pub fn acquire() -> Result<SurfaceGuard, CoreError> {
        if !stdout_is_tty() {
            return Err(CoreError::TerminalUnavailable(
                "stdout is not a tty".into(),
            ));
        }
        install_panic_hook();

        enable_raw_mode().map_err(|err| {
            CoreError::TerminalUnavailable(format!("raw mode refused: {err}"))
        })?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(CoreError::TerminalUnavailable(format!(
                "alternate screen refused: {err}"
            )));
        }
        ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);

        Ok(SurfaceGuard)
    }

    /// Restore early, ahead of drop. Safe to call more than once.
    pub fn release(&self) {
        restore_terminal();
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

pub fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
    let _ = execute!(stdout, Show);
    let _ = stdout.flush();
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            crate::log_panic(info);
            previous(info);
        }));
    });
}

pub fn stdout_is_tty() -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(libc::STDOUT_FILENO) == 1 }
}

/// Signal handler for terminal resize events.
///
/// Only flips an atomic flag (async-signal-safe); the main loop drains it
/// with `take_resize`.
extern "C" fn handle_sigwinch(_: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::SeqCst);
}

pub fn install_resize_handler() -> Result<(), CoreError> {
    unsafe {
        // SAFETY: handle_sigwinch is an extern "C" handler with no side
        // effects beyond an atomic store.
        let handler = handle_sigwinch as *const () as libc::sighandler_t;
        if libc::signal(libc::SIGWINCH, handler) == libc::SIG_ERR {
            log_debug("failed to install SIGWINCH handler");
            return Err(CoreError::TerminalUnavailable(
                "failed to install SIGWINCH handler".into(),
            ));
        }
    }
    Ok(())
}

pub fn take_resize() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::SeqCst)
}

/// Current terminal dimensions, with a conservative fallback.
pub fn terminal_size() -> (u16, u16) {
    size().unwrap_or((80, 24))
}

/// Cursor-positioning escape for 1-based `(row, col)`.
pub fn goto(row: u16, col: u16) -> String {
    format!("\x1b[{row};{col}H")
}

/// Emit `text` at `(row, col)` without any clearing or buffering.
pub fn write_at(out: &mut dyn Write, row: u16, col: u16, text: &str) -> io::Result<()> {
    out.write_all(goto(row, col).as_bytes())?;
    out.write_all(text.as_bytes())
}
