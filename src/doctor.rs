//! `--doctor` environment diagnostics, printed without entering the TUI.

use std::env;

use crate::config::AppConfig;
use crate::surface;

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn new(binary: &str) -> DoctorReport {
        DoctorReport {
            lines: vec![format!("{binary} doctor")],
        }
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("[{title}]"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl ToString) {
        self.lines.push(format!("  {key}: {}", value.to_string()));
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Collect everything worth knowing before filing a terminal-weirdness bug.
pub fn base_doctor_report(config: &AppConfig, binary: &str) -> DoctorReport {
    let mut report = DoctorReport::new(binary);

    report.section("Terminal");
    report.push_kv("tty", surface::stdout_is_tty());
    report.push_kv("TERM", env::var("TERM").unwrap_or_else(|_| "unset".into()));
    let (cols, rows) = surface::terminal_size();
    report.push_kv("size", format!("{cols}x{rows}"));

    report.section("Config");
    report.push_kv(
        "menu",
        config
            .menu_file
            .as_ref()
            .map(|path| {
                format!(
                    "{} ({})",
                    path.display(),
                    if path.exists() { "exists" } else { "missing" }
                )
            })
            .unwrap_or_else(|| "built-in".into()),
    );
    report.push_kv("tick_secs", config.tick_secs);
    report.push_kv("debounce_ms", config.debounce_ms);
    report.push_kv("theme", &config.theme);
    report.push_kv("no_color", config.no_color);
    report.push_kv("lock", config.lock_pass.is_some());

    report.section("Logging");
    report.push_kv("enabled", config.logs && !config.no_logs);
    report.push_kv("log_file", crate::log_file_path().display());

    report
}
