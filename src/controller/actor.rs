//! The controller task.
//!
//! One task owns the state, both gates and the scheduler. Commands are
//! polled before internal events, so a capture report queued behind a
//! fetch completion still wins.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::messages::{ControllerCommand, InternalEvent};
use super::reveal::RevealGate;
use super::revocation::RevocationGate;
use super::scheduler::{ArmOutcome, RenewalScheduler, TickOutcome};
use super::state::{ControllerState, Notice, Phase};
use crate::config::ControllerConfig;
use crate::error::{ErrorCategory, FetchError};
use crate::models::Ticket;
use crate::notifications::{Alert, AlertSender};
use crate::traits::{AppPresence, BrightnessControl, CaptureGuard, ClockSource, Subscription};

pub(crate) struct ControllerActor {
    pub(crate) config: ControllerConfig,
    pub(crate) clock: Arc<dyn ClockSource>,
    pub(crate) capture: Arc<dyn CaptureGuard>,
    pub(crate) brightness: Arc<dyn BrightnessControl>,
    pub(crate) scheduler: RenewalScheduler,
    pub(crate) revocation: RevocationGate,
    pub(crate) reveal: RevealGate,
    pub(crate) state: ControllerState,
    pub(crate) state_tx: watch::Sender<ControllerState>,
    pub(crate) alerts: AlertSender,
    pub(crate) presence: AppPresence,
    pub(crate) commands: mpsc::UnboundedReceiver<ControllerCommand>,
    pub(crate) events: mpsc::UnboundedReceiver<InternalEvent>,
    pub(crate) subscriptions: Vec<Subscription>,
}

impl ControllerActor {
    pub(crate) async fn run(mut self) {
        self.mount().await;

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(ControllerCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = self.events.recv() => self.handle_event(event).await,
            }
            self.publish();
        }

        self.teardown().await;
    }

    async fn mount(&mut self) {
        if let Err(e) = self.capture.protect().await {
            warn!("Capture protection unavailable: {}", e);
        }
        match self.brightness.request_permission().await {
            Ok(status) => debug!("Brightness permission: {:?}", status),
            Err(e) => warn!("Brightness permission request failed: {}", e),
        }
        info!("Ticket controller started");
    }

    async fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.reveal.force_hide().await;
        self.state.set_revealed(false);
        self.publish();

        if let Err(e) = self.capture.unprotect().await {
            warn!("Failed to release capture protection: {}", e);
        }
        self.subscriptions.clear();
        info!("Ticket controller stopped");
    }

    /// Push the local state to watchers if it changed.
    fn publish(&self) {
        let state = &self.state;
        self.state_tx.send_if_modified(|current| {
            if current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
    }

    /// Replace the state. Leaving `Active` hides the credential at once.
    async fn transition(&mut self, next: ControllerState) {
        let from = self.state.phase();
        let to = next.phase();

        if to != Phase::Active {
            self.reveal.force_hide().await;
        }
        self.state = next;
        self.publish();

        if from != to {
            info!("Phase {} -> {}", from, to);
        }
    }

    async fn handle_command(&mut self, command: ControllerCommand) {
        debug!("Command: {}", command.name());
        match command {
            ControllerCommand::RequestInitialLoad => self.request_initial_load().await,
            ControllerCommand::Retry => self.retry().await,
            ControllerCommand::BeginReveal => self.begin_reveal().await,
            ControllerCommand::EndReveal => self.reveal.end_reveal(),
            ControllerCommand::CaptureDetected => self.revoke().await,
            ControllerCommand::PresenceChanged(presence) => self.presence_changed(presence).await,
            // Handled by the run loop
            ControllerCommand::Shutdown => {}
        }
    }

    async fn handle_event(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::FetchCompleted { renewal, result } => {
                self.fetch_completed(renewal, result).await
            }
            InternalEvent::CountdownTick { countdown } => self.countdown_tick(countdown).await,
            InternalEvent::DriftRetryElapsed { retry } => {
                if self.scheduler.accept_drift_retry(retry) {
                    debug!("Drift retry {} elapsed", retry);
                    self.fetch_and_schedule(false).await;
                }
            }
            InternalEvent::HideElapsed { session } => {
                if self.reveal.on_hide_elapsed(session).await {
                    self.state.set_revealed(false);
                }
            }
        }
    }

    async fn fetch_and_schedule(&mut self, force_if_revoked: bool) {
        if self.revocation.is_tripped() && !force_if_revoked {
            debug!("Renewal suppressed while revoked");
            return;
        }
        self.scheduler.stop_countdown();
        self.transition(ControllerState::Loading).await;
        let renewal = self.scheduler.begin_fetch();
        debug!("Renewal {} started", renewal);
    }

    async fn fetch_completed(&mut self, renewal: u64, result: Result<Ticket, FetchError>) {
        if !self.scheduler.complete(renewal) {
            debug!("Discarding result of superseded renewal {}", renewal);
            return;
        }
        if self.revocation.is_tripped() {
            debug!("Discarding renewal {} result while revoked", renewal);
            return;
        }

        let error = match result {
            Ok(ticket) => return self.install(ticket).await,
            Err(e) => e,
        };
        let category = error.category();
        match Notice::for_category(category) {
            Some(notice) if category.is_user_visible() => {
                warn!(
                    "Ticket fetch failed [{} {}]: {}",
                    category,
                    error.error_code(),
                    error
                );
                self.transition(ControllerState::Error { notice }).await;
            }
            _ => debug!("Renewal {} ended without a ticket ({})", renewal, category),
        }
    }

    async fn install(&mut self, ticket: Ticket) {
        match self.scheduler.arm_countdown(&ticket) {
            ArmOutcome::Counting(seconds) => {
                info!(
                    "Ticket {} active for {}s (fingerprint {})",
                    ticket.id,
                    seconds,
                    ticket.fingerprint()
                );
                self.transition(ControllerState::active(ticket, seconds))
                    .await;
            }
            ArmOutcome::DriftBackoff { remaining } => {
                let category = ErrorCategory::ClockDrift;
                warn!(
                    "[{}] Ticket {} arrived with {}s remaining; retrying in {:?}. {}",
                    category,
                    ticket.id,
                    remaining,
                    self.config.drift_retry_delay,
                    category.recovery_hint()
                );
            }
        }
    }

    async fn countdown_tick(&mut self, countdown: u64) {
        if !self.scheduler.owns_countdown(countdown) {
            return;
        }
        if self.revocation.is_tripped() {
            self.scheduler.stop_countdown();
            return;
        }

        let outcome = match self.state.ticket() {
            Some(ticket) => self.scheduler.on_tick(countdown, ticket),
            None => {
                self.scheduler.stop_countdown();
                return;
            }
        };

        match outcome {
            TickOutcome::Stale => {}
            TickOutcome::Remaining(seconds) => {
                self.state.set_seconds_remaining(seconds);
            }
            TickOutcome::Expired => {
                self.state.set_seconds_remaining(0);
                self.publish();
                info!("Ticket expired, renewing");
                self.fetch_and_schedule(false).await;
            }
        }
    }

    async fn request_initial_load(&mut self) {
        if self.state.phase() != Phase::Loading || self.scheduler.is_renewal_pending() {
            debug!(
                "Initial load ignored in phase {} (renewal pending: {})",
                self.state.phase(),
                self.scheduler.is_renewal_pending()
            );
            return;
        }
        self.fetch_and_schedule(false).await;
    }

    async fn retry(&mut self) {
        match self.state.phase() {
            Phase::Error => {}
            Phase::Revoked => {
                if let Some(at) = self.revocation.tripped_at() {
                    info!(
                        "Re-acquiring after revocation {}ms ago",
                        self.clock.now_millis().saturating_sub(at)
                    );
                }
                self.revocation.reset();
            }
            phase => {
                debug!("Retry ignored in phase {}", phase);
                return;
            }
        }
        self.fetch_and_schedule(true).await;
    }

    async fn begin_reveal(&mut self) {
        if self.state.phase() != Phase::Active || self.revocation.is_tripped() {
            debug!("Reveal ignored in phase {}", self.state.phase());
            return;
        }
        self.reveal.begin_reveal().await;
        self.state.set_revealed(true);
    }

    async fn revoke(&mut self) {
        if !self.revocation.trip(self.clock.now_millis()) {
            debug!("Capture reported while already revoked");
            return;
        }

        self.scheduler.cancel_all();
        let category = ErrorCategory::Revocation;
        let notice = Notice::for_category(category).unwrap_or_else(Notice::capture_revoked);
        self.transition(ControllerState::Revoked { notice }).await;
        self.alerts.send(Alert::CaptureDetected);
        warn!(
            "[{}] Screen capture detected, ticket revoked (capture #{})",
            category,
            self.revocation.trips()
        );
    }

    async fn presence_changed(&mut self, presence: AppPresence) {
        let previous = std::mem::replace(&mut self.presence, presence);

        if !presence.is_foreground() {
            self.reveal.force_hide().await;
            self.state.set_revealed(false);
            return;
        }
        if !previous.is_foreground() {
            self.check_validity_on_resume().await;
        }
    }

    /// Renew on return to the foreground only when no ticket is held or
    /// the held one is about to expire.
    async fn check_validity_on_resume(&mut self) {
        let phase = self.state.phase();
        if phase.needs_retry() {
            debug!("Resume check skipped in phase {}", phase);
            return;
        }
        if self.scheduler.is_renewal_pending() {
            debug!("Resume check skipped, renewal already pending");
            return;
        }

        let now = self.clock.now_millis();
        let margin = self.config.resume_margin_millis();
        let stale = match self.state.ticket() {
            Some(ticket) => ticket.expires_within(now, margin),
            None => true,
        };

        if stale {
            info!("Ticket missing or stale on resume, renewing");
            self.fetch_and_schedule(false).await;
        } else {
            debug!("Ticket still valid on resume");
        }
    }
}
