//! In-memory display brightness.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::DeviceError;
use crate::traits::{BrightnessControl, PermissionStatus};

#[derive(Debug)]
struct BrightnessInner {
    level: f32,
    permission: PermissionStatus,
    set_history: Vec<f32>,
    get_calls: usize,
    get_should_fail: bool,
    set_should_fail: bool,
}

/// Brightness control backed by a single stored level.
///
/// Records every `set_level` so tests can assert exactly how the display
/// was driven.
#[derive(Debug, Clone)]
pub struct InMemoryBrightness {
    inner: Arc<Mutex<BrightnessInner>>,
}

impl InMemoryBrightness {
    /// Create a display at `level` with permission granted.
    pub fn new(level: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BrightnessInner {
                level,
                permission: PermissionStatus::Granted,
                set_history: Vec::new(),
                get_calls: 0,
                get_should_fail: false,
                set_should_fail: false,
            })),
        }
    }

    /// Set the permission state reported.
    pub fn set_permission(&self, permission: PermissionStatus) {
        self.inner.lock().unwrap().permission = permission;
    }

    /// Configure whether `get_current` should fail.
    pub fn set_get_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().get_should_fail = should_fail;
    }

    /// Configure whether `set_level` should fail.
    pub fn set_set_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().set_should_fail = should_fail;
    }

    /// Change the level as if the user moved the system slider.
    pub fn set_user_level(&self, level: f32) {
        self.inner.lock().unwrap().level = level;
    }

    /// Current level.
    pub fn level(&self) -> f32 {
        self.inner.lock().unwrap().level
    }

    /// Every level passed to `set_level`, in order.
    pub fn set_history(&self) -> Vec<f32> {
        self.inner.lock().unwrap().set_history.clone()
    }

    /// Number of `get_current` calls.
    pub fn get_calls(&self) -> usize {
        self.inner.lock().unwrap().get_calls
    }
}

impl Default for InMemoryBrightness {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[async_trait]
impl BrightnessControl for InMemoryBrightness {
    async fn get_permission(&self) -> Result<PermissionStatus, DeviceError> {
        Ok(self.inner.lock().unwrap().permission)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, DeviceError> {
        Ok(self.inner.lock().unwrap().permission)
    }

    async fn get_current(&self) -> Result<f32, DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.get_calls += 1;
        if inner.get_should_fail {
            return Err(DeviceError::failed("brightness", "mock get failure"));
        }
        Ok(inner.level)
    }

    async fn set_level(&self, level: f32) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.set_should_fail {
            return Err(DeviceError::failed("brightness", "mock set failure"));
        }
        inner.set_history.push(level);
        inner.level = level;
        Ok(())
    }
}
