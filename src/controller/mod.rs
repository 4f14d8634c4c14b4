//! Ticket lifecycle controller.
//!
//! # Architecture
//!
//! ```text
//!  renderer commands      capture / presence callbacks
//!         │                          │ (weak sender)
//!         └────────────┬─────────────┘
//!                      ▼
//!          ┌───────────────────────┐   fetch results, ticks,
//!          │    controller task    │◄─ drift retries, hides
//!          │ scheduler │ gates     │   (internal channel)
//!          └───────────┬───────────┘
//!                      ▼
//!        watch<ControllerState> + broadcast<Alert>
//! ```
//!
//! All state lives in one tokio task. Callers hold a cheap, cloneable
//! [`ControllerHandle`]; once every handle is gone the task tears down,
//! restoring brightness and releasing capture protection.
//!
//! # Usage
//!
//! ```rust,ignore
//! let controller = LifecycleController::builder(fetcher, capture, brightness)
//!     .with_lifecycle(app_lifecycle)
//!     .with_config(ControllerConfig::from_env()?)
//!     .spawn()?;
//!
//! let handle = controller.handle();
//! handle.request_initial_load()?;
//! let mut states = handle.subscribe();
//! while states.changed().await.is_ok() {
//!     render(&states.borrow());
//! }
//! ```

mod actor;
pub mod messages;
pub mod reveal;
pub mod revocation;
pub mod scheduler;
pub mod state;

pub use messages::ControllerCommand;
pub use reveal::{RevealGate, RevealSession};
pub use revocation::RevocationGate;
pub use scheduler::{ArmOutcome, RenewalHandle, RenewalScheduler, TickOutcome};
pub use state::{ControllerState, Notice, Phase};

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapters::SystemClock;
use crate::config::ControllerConfig;
use crate::error::{PassError, PassResult};
use crate::notifications::{Alert, AlertSender, ALERT_CAPACITY};
use crate::traits::{
    AppLifecycle, AppPresence, BrightnessControl, CaptureGuard, ClockSource, CredentialFetcher,
};
use actor::ControllerActor;

/// Cloneable command and observation handle.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<ControllerCommand>,
    state: watch::Receiver<ControllerState>,
    alerts: AlertSender,
    clock: Arc<dyn ClockSource>,
}

impl ControllerHandle {
    fn send(&self, command: ControllerCommand) -> PassResult<()> {
        self.commands
            .send(command)
            .map_err(|_| PassError::ControllerClosed)
    }

    /// Start the first fetch. Ignored unless loading with nothing pending.
    pub fn request_initial_load(&self) -> PassResult<()> {
        self.send(ControllerCommand::RequestInitialLoad)
    }

    /// Leave `Error` or `Revoked` with a fresh fetch.
    pub fn retry(&self) -> PassResult<()> {
        self.send(ControllerCommand::Retry)
    }

    pub fn begin_reveal(&self) -> PassResult<()> {
        self.send(ControllerCommand::BeginReveal)
    }

    pub fn end_reveal(&self) -> PassResult<()> {
        self.send(ControllerCommand::EndReveal)
    }

    /// Report a screen capture from platform glue that does not go
    /// through a [`CaptureGuard`] subscription.
    pub fn report_capture(&self) -> PassResult<()> {
        self.send(ControllerCommand::CaptureDetected)
    }

    /// Report a foreground/background transition.
    pub fn set_presence(&self, presence: AppPresence) -> PassResult<()> {
        self.send(ControllerCommand::PresenceChanged(presence))
    }

    /// Latest published state.
    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// Progress fraction of the displayed ticket at the current time.
    pub fn progress(&self) -> Option<f64> {
        self.state.borrow().progress(self.clock.now_millis())
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.clone()
    }

    /// Receiver for one-shot alerts sent after this call.
    pub fn alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    /// Whether the controller task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Owner of a running controller task.
pub struct LifecycleController {
    handle: ControllerHandle,
    task: JoinHandle<()>,
}

impl LifecycleController {
    /// Start configuring a controller.
    pub fn builder(
        fetcher: Arc<dyn CredentialFetcher>,
        capture: Arc<dyn CaptureGuard>,
        brightness: Arc<dyn BrightnessControl>,
    ) -> LifecycleControllerBuilder {
        LifecycleControllerBuilder {
            fetcher,
            capture,
            brightness,
            clock: None,
            lifecycle: None,
            config: ControllerConfig::default(),
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Tear down and wait for the task to finish. Other handles stop
    /// working once this returns.
    pub async fn shutdown(self) {
        let _ = self.handle.send(ControllerCommand::Shutdown);
        drop(self.handle);
        if let Err(e) = self.task.await {
            tracing::error!("Controller task ended abnormally: {}", e);
        }
    }
}

/// Builder for [`LifecycleController`].
pub struct LifecycleControllerBuilder {
    fetcher: Arc<dyn CredentialFetcher>,
    capture: Arc<dyn CaptureGuard>,
    brightness: Arc<dyn BrightnessControl>,
    clock: Option<Arc<dyn ClockSource>>,
    lifecycle: Option<Arc<dyn AppLifecycle>>,
    config: ControllerConfig,
}

impl LifecycleControllerBuilder {
    /// Use a specific clock (default: [`SystemClock`]).
    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Subscribe to foreground/background transitions.
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn AppLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the config and spawn the controller task. Must be called
    /// within a tokio runtime.
    pub fn spawn(self) -> PassResult<LifecycleController> {
        self.config.validate()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn ClockSource>);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ControllerState::Loading);
        let alerts = AlertSender::new(ALERT_CAPACITY);

        let mut subscriptions = Vec::new();
        let weak = command_tx.downgrade();
        subscriptions.push(self.capture.on_capture_event(Box::new(move || {
            if let Some(tx) = weak.upgrade() {
                let _ = tx.send(ControllerCommand::CaptureDetected);
            }
        })));
        if let Some(ref lifecycle) = self.lifecycle {
            let weak = command_tx.downgrade();
            subscriptions.push(lifecycle.on_foreground_background_change(Box::new(
                move |presence| {
                    if let Some(tx) = weak.upgrade() {
                        let _ = tx.send(ControllerCommand::PresenceChanged(presence));
                    }
                },
            )));
        }

        let scheduler = scheduler::RenewalScheduler::new(
            self.fetcher,
            clock.clone(),
            event_tx.clone(),
            &self.config,
        );
        let reveal = reveal::RevealGate::new(
            self.brightness.clone(),
            event_tx,
            self.config.reveal_hide_delay,
        );

        let actor = ControllerActor {
            config: self.config,
            clock: clock.clone(),
            capture: self.capture,
            brightness: self.brightness,
            scheduler,
            revocation: RevocationGate::new(),
            reveal,
            state: ControllerState::Loading,
            state_tx,
            alerts: alerts.clone(),
            presence: AppPresence::Active,
            commands: command_rx,
            events: event_rx,
            subscriptions,
        };
        let task = tokio::spawn(actor.run());

        Ok(LifecycleController {
            handle: ControllerHandle {
                commands: command_tx,
                state: state_rx,
                alerts,
                clock,
            },
            task,
        })
    }
}
