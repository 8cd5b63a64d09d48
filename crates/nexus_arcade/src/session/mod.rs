//! Timed game sessions.
//!
//! A session owns one engine behind a mutex and the Tokio task that will
//! resume it. Restarting aborts the task, and the engine's ticket check
//! rejects any resumption that slips through anyway.

mod memory;
mod reaction;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use memory::MemorySession;
pub use reaction::{LightsView, ReactionSession};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
