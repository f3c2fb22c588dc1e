//! Single-fire signal.
//!
//! Backs both the connect barrier and close completion. Once fired it stays
//! fired; there is no reset. Async waiters park on a [`Notify`], blocking
//! waiters (the destructor) on a [`Condvar`].

// ============================================================================
// Imports
// ============================================================================

use std::pin::pin;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Signal
// ============================================================================

/// A flag that goes from unset to set exactly once.
#[derive(Debug, Default)]
pub(crate) struct Signal {
    fired: Mutex<bool>,
    condvar: Condvar,
    notify: Notify,
}

impl Signal {
    /// Creates an unset signal.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the signal and wakes every waiter.
    ///
    /// Returns `false` if it was already set.
    pub(crate) fn fire(&self) -> bool {
        {
            let mut fired = self.fired.lock();
            if *fired {
                return false;
            }
            *fired = true;
        }
        self.condvar.notify_all();
        self.notify.notify_waiters();
        true
    }

    /// Returns `true` once fired.
    #[inline]
    pub(crate) fn is_set(&self) -> bool {
        *self.fired.lock()
    }

    /// Waits asynchronously until fired.
    pub(crate) async fn wait(&self) {
        loop {
            let mut notified = pin!(self.notify.notified());
            // Register before checking so a concurrent fire is not missed.
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }

    /// Blocks the current thread until fired.
    pub(crate) fn wait_blocking(&self) {
        let mut fired = self.fired.lock();
        self.condvar.wait_while(&mut fired, |fired| !*fired);
    }

    /// Blocks for at most `limit`. Returns `true` if fired.
    pub(crate) fn wait_blocking_for(&self, limit: Duration) -> bool {
        let mut fired = self.fired.lock();
        self.condvar.wait_while_for(&mut fired, |fired| !*fired, limit);
        *fired
    }
}

// ============================================================================
// Tests
// ============================================================================
