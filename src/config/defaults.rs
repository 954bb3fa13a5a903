//! Named defaults and bounds for the timing knobs.

/// Status ticker period; "a few seconds" keeps probes cheap while the
/// clock still reads fresh.
pub const DEFAULT_TICK_SECS: u64 = 2;
pub const MIN_TICK_SECS: u64 = 1;
pub const MAX_TICK_SECS: u64 = 60;

/// Same-key collapse window. Empirically tuned per terminal emulator;
/// override with --debounce-ms when a terminal ghosts or feels sluggish.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;
pub const MAX_DEBOUNCE_MS: u64 = 1_000;
