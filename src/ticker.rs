//! Background status ticker: clock and service reachability.
//!
//! One timer thread posts volatile patches over a bounded channel; the main
//! loop applies them at a safe point, so the ticker never touches navigation
//! state and never holds a lock the render path wants. Service probes can be
//! arbitrarily slow, so each one runs on its own detached thread and posts
//! its result whenever it finishes; the timer thread itself never blocks on
//! a probe.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::process::{Command, Stdio};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::log_debug;
use crate::menu::ServiceSpec;

const PATCH_CHANNEL_CAPACITY: usize = 64;
/// Sleep granularity while waiting out the tick period, so stop requests
/// are honored promptly.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Last known health of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    /// `None` until the first probe completes.
    pub healthy: Option<bool>,
    pub detail: String,
}

impl ServiceStatus {
    pub fn pending(name: &str) -> ServiceStatus {
        ServiceStatus {
            name: name.to_string(),
            healthy: None,
            detail: "checking...".into(),
        }
    }

    /// One-line rendering used for volatile content rows and the footer.
    pub fn summary(&self) -> String {
        match self.healthy {
            Some(true) => format!("{} up", self.name),
            Some(false) => format!("{} DOWN ({})", self.name, self.detail),
            None => format!("{} ?", self.name),
        }
    }
}

/// A volatile update proposed by the ticker; applied by the main loop only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolatilePatch {
    Clock(String),
    Service(ServiceStatus),
}

pub struct StatusTicker {
    rx: Receiver<VolatilePatch>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StatusTicker {
    pub fn spawn(period: Duration, services: Vec<ServiceSpec>) -> StatusTicker {
        let (tx, rx) = bounded(PATCH_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::spawn(move || tick_loop(tx, stop_flag, period, services));
        StatusTicker {
            rx,
            stop,
            handle: Some(handle),
        }
    }

    /// Drain whatever patches are ready; never blocks.
    pub fn try_recv(&self) -> Option<VolatilePatch> {
        self.rx.try_recv().ok()
    }

    /// Ask the timer thread to finish and wait for it.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick_loop(
    tx: Sender<VolatilePatch>,
    stop: Arc<AtomicBool>,
    period: Duration,
    services: Vec<ServiceSpec>,
) {
    // one in-flight guard per service so a slow probe is never stacked
    let in_flight: Vec<Arc<AtomicBool>> = services
        .iter()
        .map(|_| Arc::new(AtomicBool::new(false)))
        .collect();

    while !stop.load(Ordering::SeqCst) {
        post(&tx, VolatilePatch::Clock(format_clock()));

        for (spec, busy) in services.iter().zip(&in_flight) {
            if busy.swap(true, Ordering::SeqCst) {
                continue;
            }
            let spec = spec.clone();
            let tx = tx.clone();
            let busy = busy.clone();
            thread::spawn(move || {
                let status = probe_service(&spec);
                busy.store(false, Ordering::SeqCst);
                post(&tx, VolatilePatch::Service(status));
            });
        }

        let mut waited = Duration::ZERO;
        while waited < period && !stop.load(Ordering::SeqCst) {
            thread::sleep(STOP_POLL.min(period - waited));
            waited += STOP_POLL;
        }
    }
}

/// Best-effort send: a stalled main loop drops stale patches rather than
/// blocking the timer.
fn post(tx: &Sender<VolatilePatch>, patch: VolatilePatch) {
    match tx.try_send(patch) {
        Ok(()) | Err(TrySendError::Full(_)) => {}
        Err(TrySendError::Disconnected(_)) => {}
    }
}

/// Wall clock, UTC, second resolution. Derived from the epoch so no extra
/// time crate is needed for an HH:MM:SS readout.
pub fn format_clock() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let of_day = secs % 86_400;
    format!(
        "{:02}:{:02}:{:02} UTC",
        of_day / 3_600,
        (of_day % 3_600) / 60,
        of_day % 60
    )
}

/// Run the probe command; exit status decides reachability.
fn probe_service(spec: &ServiceSpec) -> ServiceStatus {
    let argv = match shell_words::split(&spec.command) {
        Ok(argv) if !argv.is_empty() => argv,
        Ok(_) => {
            return ServiceStatus {
                name: spec.name.clone(),
                healthy: Some(false),
                detail: "empty probe command".into(),
            }
        }
        Err(err) => {
            return ServiceStatus {
                name: spec.name.clone(),
                healthy: Some(false),
                detail: format!("bad probe command: {err}"),
            }
        }
    };
    let result = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(status) if status.success() => ServiceStatus {
            name: spec.name.clone(),
            healthy: Some(true),
            detail: "ok".into(),
        },
        Ok(status) => ServiceStatus {
            name: spec.name.clone(),
            healthy: Some(false),
            detail: format!("exit {}", status.code().unwrap_or(-1)),
        },
        Err(err) => {
            log_debug(&format!("probe `{}` failed to start: {err}", spec.name));
            ServiceStatus {
                name: spec.name.clone(),
                healthy: Some(false),
                detail: "not runnable".into(),
            }
        }
    }
}
