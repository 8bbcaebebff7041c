//! Cancellation for upstream fetches
//!
//! A host driver that can abandon a request (an interrupted `readdir`, an unmount in
//! progress) hands the tree a [`Cancellation`]. Listings that have to go upstream race
//! the fetch against it and give up with `FsError::Cancelled` instead of blocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct Signal {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation handle
///
/// All clones observe the same signal. Once cancelled, a handle stays cancelled.
#[derive(Clone)]
pub struct Cancellation {
    signal: Arc<Signal>,
}

impl Cancellation {
    /// Create a handle that has not been cancelled
    pub fn new() -> Self {
        Self {
            signal: Arc::new(Signal {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Signal cancellation to every clone of this handle
    pub fn cancel(&self) {
        self.signal.cancelled.store(true, Ordering::SeqCst);
        self.signal.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the handle is cancelled
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel() is not missed.
            let notified = self.signal.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancellation")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
