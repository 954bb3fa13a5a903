use super::defaults::{MAX_DEBOUNCE_MS, MAX_TICK_SECS, MIN_TICK_SECS};
use super::AppConfig;
use anyhow::{bail, Result};

impl AppConfig {
    /// Reject out-of-range knobs before any thread or terminal state exists.
    pub fn validate(&self) -> Result<()> {
        if self.tick_secs < MIN_TICK_SECS || self.tick_secs > MAX_TICK_SECS {
            bail!(
                "--tick-secs must be between {MIN_TICK_SECS} and {MAX_TICK_SECS} (got {})",
                self.tick_secs
            );
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            bail!(
                "--debounce-ms must be at most {MAX_DEBOUNCE_MS} (got {})",
                self.debounce_ms
            );
        }
        if !matches!(self.theme.as_str(), "slate" | "mono") {
            bail!("unknown theme `{}` (expected: slate, mono)", self.theme);
        }
        if let Some(pass) = &self.lock_pass {
            if pass.is_empty() {
                bail!("--lock-pass must not be empty");
            }
        }
        Ok(())
    }
}
