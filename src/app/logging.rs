//! File-backed debug logging.
//!
//! Everything goes to a size-rotated file in the temp dir, never to stdout:
//! in raw mode a stray println would shred the screen. Logging is off until
//! `init_logging` enables it, so library consumers pay nothing.

use std::{
    env, fs,
    io::Write,
    panic::PanicInfo,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use crate::config::AppConfig;

const LOG_MAX_BYTES: u64 = 2 * 1024 * 1024;

static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_STATE: OnceLock<Mutex<Option<LogWriter>>> = OnceLock::new();

/// Path to the temp log file rotated between runs.
pub fn log_file_path() -> PathBuf {
    env::var("TERMDECK_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("termdeck.log"))
}

struct LogWriter {
    path: PathBuf,
    file: fs::File,
    bytes_written: u64,
}

impl LogWriter {
    fn open(path: PathBuf) -> Option<LogWriter> {
        let mut bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if bytes_written > LOG_MAX_BYTES {
            let _ = fs::remove_file(&path);
            bytes_written = 0;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(LogWriter {
            path,
            file,
            bytes_written,
        })
    }

    fn write_line(&mut self, line: &str) {
        if self.bytes_written.saturating_add(line.len() as u64) > LOG_MAX_BYTES {
            if let Ok(file) = fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)
            {
                self.file = file;
                self.bytes_written = 0;
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.bytes_written = self.bytes_written.saturating_add(line.len() as u64);
        }
    }
}

/// Enable the debug log according to config flags and set up tracing.
pub fn init_logging(config: &AppConfig) {
    let enabled = config.logs && !config.no_logs;
    LOG_ENABLED.store(enabled, Ordering::SeqCst);
    crate::telemetry::init_tracing(config);
}

/// Append a timestamped line to the debug log; a no-op unless enabled.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::SeqCst) {
        return;
    }
    let state = LOG_STATE.get_or_init(|| Mutex::new(LogWriter::open(log_file_path())));
    let Ok(mut writer) = state.lock() else {
        return;
    };
    if let Some(writer) = writer.as_mut() {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        writer.write_line(&format!("[{timestamp}] {msg}\n"));
    }
}

/// Record a panic location; wired into the terminal-restore panic hook so a
/// crash leaves a trace even though the alternate screen is discarded.
pub fn log_panic(info: &PanicInfo<'_>) {
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    log_debug(&format!("panic at {location}: {info}"));
}
