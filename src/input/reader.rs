//! Stdin reader thread plus the debounced, flushable event source the main
//! loop polls.
//!
//! The thread owns the byte parser; decoded events travel over a bounded
//! channel so a stalled main loop applies backpressure instead of queueing
//! unbounded ghost input. `flush` drains everything already delivered and
//! resets debounce history; it is called around every context switch (submenu
//! push/pop, lock engage/disengage) so a keystroke typed against the old
//! context is never replayed into the new one.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io::Read;
use std::thread;
use std::time::Duration;

use crate::input::debounce::Debouncer;
use crate::input::event::KeyEvent;
use crate::input::parser::InputParser;
use crate::log_debug;

/// Max pending input events before backpressure.
pub const INPUT_CHANNEL_CAPACITY: usize = 256;

pub struct InputReader {
    rx: Receiver<KeyEvent>,
    debounce: Debouncer,
}

impl InputReader {
    /// Spawn the stdin thread. The thread exits when stdin closes or the
    /// receiver is dropped.
    pub fn spawn(debounce_window: Duration) -> InputReader {
        let (tx, rx) = bounded(INPUT_CHANNEL_CAPACITY);
        thread::spawn(move || read_loop(tx));
        InputReader {
            rx,
            debounce: Debouncer::new(debounce_window),
        }
    }

    /// Build a reader over an injected channel; tests drive it directly.
    pub fn from_channel(rx: Receiver<KeyEvent>, debounce_window: Duration) -> InputReader {
        InputReader {
            rx,
            debounce: Debouncer::new(debounce_window),
        }
    }

    /// Next debounced event, or `None` when `timeout` elapses first.
    pub fn next_event(&mut self, timeout: Duration) -> Option<KeyEvent> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(event) => {
                    if self.debounce.accept(event) {
                        return Some(event);
                    }
                    // collapsed duplicate; keep waiting within the timeout
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    /// Discard everything buffered and forget debounce history.
    pub fn flush(&mut self) {
        while self.rx.try_recv().is_ok() {}
        self.debounce.reset();
    }
}

fn read_loop(tx: Sender<KeyEvent>) {
    let mut stdin = std::io::stdin();
    let mut buf = [0u8; 1024];
    let mut parser = InputParser::new();
    loop {
        let n = match stdin.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                log_debug(&format!("stdin read error: {err}"));
                break;
            }
        };
        let mut kinds = Vec::new();
        parser.consume_bytes(&buf[..n], &mut kinds);
        parser.flush_pending(&mut kinds);
        for kind in kinds {
            if tx.send(KeyEvent::new(kind)).is_err() {
                return;
            }
        }
    }
}
