//! Manually driven app lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::traits::{AppLifecycle, AppPresence, PresenceCallback, Subscription};

type SharedCallback = Arc<dyn Fn(AppPresence) + Send + Sync>;

#[derive(Default)]
struct LifecycleInner {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, SharedCallback)>>,
}

/// App lifecycle whose transitions are emitted by hand.
#[derive(Clone, Default)]
pub struct ManualLifecycle {
    inner: Arc<LifecycleInner>,
}

impl ManualLifecycle {
    /// Create a new lifecycle source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a presence change to every subscriber.
    pub fn emit(&self, presence: AppPresence) -> usize {
        let callbacks: Vec<SharedCallback> = self
            .inner
            .callbacks
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in &callbacks {
            callback(presence);
        }
        callbacks.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.callbacks.lock().unwrap().len()
    }
}

impl AppLifecycle for ManualLifecycle {
    fn on_foreground_background_change(&self, callback: PresenceCallback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .callbacks
            .lock()
            .unwrap()
            .push((id, Arc::from(callback)));

        let inner = self.inner.clone();
        Subscription::new(move || {
            inner
                .callbacks
                .lock()
                .unwrap()
                .retain(|(existing, _)| *existing != id);
        })
    }
}
