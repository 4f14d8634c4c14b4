//! In-memory capture guard.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::DeviceError;
use crate::traits::{CaptureCallback, CaptureGuard, Subscription};

type SharedCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct CaptureInner {
    protected: AtomicBool,
    protect_calls: AtomicUsize,
    unprotect_calls: AtomicUsize,
    protect_should_fail: AtomicBool,
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, SharedCallback)>>,
}

/// Capture guard that records protection calls and lets tests (or a
/// headless host) fire capture events by hand.
#[derive(Clone, Default)]
pub struct InMemoryCaptureGuard {
    inner: Arc<CaptureInner>,
}

impl InMemoryCaptureGuard {
    /// Create a new, unprotected guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether protection is currently enabled.
    pub fn is_protected(&self) -> bool {
        self.inner.protected.load(Ordering::SeqCst)
    }

    /// Number of `protect` calls.
    pub fn protect_calls(&self) -> usize {
        self.inner.protect_calls.load(Ordering::SeqCst)
    }

    /// Number of `unprotect` calls.
    pub fn unprotect_calls(&self) -> usize {
        self.inner.unprotect_calls.load(Ordering::SeqCst)
    }

    /// Configure whether `protect` should fail.
    pub fn set_protect_should_fail(&self, should_fail: bool) {
        self.inner
            .protect_should_fail
            .store(should_fail, Ordering::SeqCst);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.callbacks.lock().unwrap().len()
    }

    /// Deliver a capture event to every subscriber. Returns how many were
    /// notified.
    pub fn trigger_capture(&self) -> usize {
        let callbacks: Vec<SharedCallback> = self
            .inner
            .callbacks
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }
}

#[async_trait]
impl CaptureGuard for InMemoryCaptureGuard {
    async fn protect(&self) -> Result<(), DeviceError> {
        self.inner.protect_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.protect_should_fail.load(Ordering::SeqCst) {
            return Err(DeviceError::failed("capture guard", "mock protect failure"));
        }
        self.inner.protected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unprotect(&self) -> Result<(), DeviceError> {
        self.inner.unprotect_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.protected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn on_capture_event(&self, callback: CaptureCallback) -> Subscription {
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
