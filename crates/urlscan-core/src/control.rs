//! Caller-side cancellation for in-flight analyses.
//!
//! One [`AbortToken`] can be cloned into any number of analyses (e.g. every
//! URL of a CLI batch). The orchestrator checks it before each poll and wakes
//! up from a backoff delay as soon as it fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    aborted: AtomicBool,
    notify: Notify,
}

/// Shared abort flag.
#[derive(Debug, Clone, Default)]
pub struct AbortToken {
    inner: Arc<Inner>,
}

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort; every analysis holding a clone stops at its next check.
    pub fn abort(&self) {
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    /// Resolves once [`abort`](Self::abort) has been called.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent abort() is not missed.
            let notified = self.inner.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}
