use std::sync::{Mutex, MutexGuard};

/// Take a mutex even when a panicking writer poisoned it; the guarded data
/// here (the terminal write path) is always safe to reuse.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            crate::log_debug(&format!("mutex poisoned in {context}; recovering"));
            poisoned.into_inner()
        }
    }
}
