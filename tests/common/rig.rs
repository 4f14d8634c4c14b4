//! Controller test rig.

use std::sync::Arc;

use ticketpass::adapters::mock::{
    InMemoryBrightness, InMemoryCaptureGuard, ManualLifecycle, MockClock, MockFetcher,
    ScriptedFetch,
};
use ticketpass::config::ControllerConfig;
use ticketpass::controller::{ControllerHandle, LifecycleController};
use ticketpass::error::FetchError;

/// Baseline brightness the in-memory display starts at.
pub const BASELINE: f32 = 0.5;

/// A running controller plus handles on every double it talks to.
pub struct Rig {
    pub clock: Arc<MockClock>,
    pub fetcher: MockFetcher,
    pub capture: InMemoryCaptureGuard,
    pub brightness: InMemoryBrightness,
    pub lifecycle: ManualLifecycle,
    pub controller: LifecycleController,
    pub handle: ControllerHandle,
}

/// Builder for [`Rig`].
pub struct RigBuilder {
    config: ControllerConfig,
    script: Vec<ScriptedFetch>,
    fallback: Option<ScriptedFetch>,
    brightness: InMemoryBrightness,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            script: Vec::new(),
            fallback: None,
            brightness: InMemoryBrightness::new(BASELINE),
        }
    }

    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue a scripted fetch answer.
    pub fn script(mut self, fetch: ScriptedFetch) -> Self {
        self.script.push(fetch);
        self
    }

    /// Answer once the script runs out (default: 60 second ticket).
    pub fn fallback(mut self, fetch: ScriptedFetch) -> Self {
        self.fallback = Some(fetch);
        self
    }

    pub fn brightness(mut self, brightness: InMemoryBrightness) -> Self {
        self.brightness = brightness;
        self
    }

    /// Spawn the controller. Must run inside a tokio runtime.
    pub fn spawn(self) -> Rig {
        let clock = Arc::new(MockClock::default());
        let mut fetcher = MockFetcher::new(clock.clone());
        if let Some(fallback) = self.fallback {
            fetcher = fetcher.with_fallback(fallback);
        }
        for fetch in self.script {
            fetcher.push(fetch);
        }

        let capture = InMemoryCaptureGuard::new();
        let lifecycle = ManualLifecycle::new();

        let controller = LifecycleController::builder(
            Arc::new(fetcher.clone()),
            Arc::new(capture.clone()),
            Arc::new(self.brightness.clone()),
        )
        .with_clock(clock.clone())
        .with_lifecycle(Arc::new(lifecycle.clone()))
        .with_config(self.config)
        .spawn()
        .expect("valid config");
        let handle = controller.handle();

        Rig {
            clock,
            fetcher,
            capture,
            brightness: self.brightness,
            lifecycle,
            controller,
            handle,
        }
    }
}

impl Default for RigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rig with a 60 second ticket behind every fetch.
pub fn rig() -> Rig {
    RigBuilder::new().spawn()
}

/// A generic transient failure.
pub fn connection_failure() -> ScriptedFetch {
    ScriptedFetch::failure(FetchError::Connection("connection refused".to_string()))
}
