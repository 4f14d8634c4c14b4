//! Press-to-reveal at full brightness.
//!
//! The gate owns the single "saved baseline" slot for the display
//! brightness. The slot is written only when empty and emptied only by a
//! restore, so repeated presses never overwrite the user's level with an
//! already maximised reading.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::messages::InternalEvent;
use crate::traits::{BrightnessControl, MAX_BRIGHTNESS};

/// One pending "hide after release" timer.
#[derive(Debug)]
pub struct RevealSession {
    id: u64,
    task: JoinHandle<()>,
}

impl RevealSession {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Tracks visibility and drives display brightness around a reveal.
pub struct RevealGate {
    brightness: Arc<dyn BrightnessControl>,
    events: mpsc::UnboundedSender<InternalEvent>,
    hide_delay: Duration,
    revealed: bool,
    saved_baseline: Option<f32>,
    boosted: bool,
    next_session: u64,
    pending_hide: Option<RevealSession>,
}

impl RevealGate {
    pub(crate) fn new(
        brightness: Arc<dyn BrightnessControl>,
        events: mpsc::UnboundedSender<InternalEvent>,
        hide_delay: Duration,
    ) -> Self {
        Self {
            brightness,
            events,
            hide_delay,
            revealed: false,
            saved_baseline: None,
            boosted: false,
            next_session: 0,
            pending_hide: None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Whether the display is currently held at maximum.
    pub fn is_boosted(&self) -> bool {
        self.boosted
    }

    pub fn saved_baseline(&self) -> Option<f32> {
        self.saved_baseline
    }

    pub fn has_pending_hide(&self) -> bool {
        self.pending_hide.is_some()
    }

    /// Show the credential and push the display to maximum.
    ///
    /// Cancels a pending hide first, so a quick release and re-press never
    /// dims the display. Brightness failures leave the credential revealed
    /// at the current level.
    pub async fn begin_reveal(&mut self) {
        self.cancel_pending_hide();
        self.revealed = true;

        if self.boosted {
            return;
        }

        match self.brightness.get_permission().await {
            Ok(status) if status.is_granted() => {}
            Ok(status) => {
                debug!("Brightness permission {:?}, revealing without boost", status);
                return;
            }
            Err(e) => {
                warn!("Brightness permission check failed: {}", e);
                return;
            }
        }

        if self.saved_baseline.is_none() {
            match self.brightness.get_current().await {
                Ok(level) => self.saved_baseline = Some(level),
                Err(e) => {
                    warn!("Could not read brightness, revealing without boost: {}", e);
                    return;
                }
            }
        }

        match self.brightness.set_level(MAX_BRIGHTNESS).await {
            Ok(()) => self.boosted = true,
            Err(e) => warn!("Brightness set error: {}", e),
        }
    }

    /// Schedule the hide after the debounce delay. No-op when nothing is
    /// revealed.
    pub fn end_reveal(&mut self) {
        if !self.revealed {
            return;
        }
        self.cancel_pending_hide();

        self.next_session += 1;
        let id = self.next_session;
        let delay = self.hide_delay;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(InternalEvent::HideElapsed { session: id });
        });
        self.pending_hide = Some(RevealSession { id, task });
    }

    /// Apply hide session `id` if it is still the pending one. Returns
    /// true when the credential was hidden.
    pub async fn on_hide_elapsed(&mut self, id: u64) -> bool {
        match self.pending_hide {
            Some(ref session) if session.id == id => {
                self.pending_hide = None;
            }
            _ => return false,
        }
        self.revealed = false;
        self.restore().await;
        true
    }

    /// Hide and restore immediately, bypassing the debounce.
    pub async fn force_hide(&mut self) {
        self.cancel_pending_hide();
        self.revealed = false;
        self.restore().await;
    }

    fn cancel_pending_hide(&mut self) {
        if let Some(session) = self.pending_hide.take() {
            session.task.abort();
        }
    }

    async fn restore(&mut self) {
        if let Some(baseline) = self.saved_baseline.take() {
            if let Err(e) = self.brightness.set_level(baseline).await {
                warn!("Brightness restore error: {}", e);
            }
        }
        self.boosted = false;
    }
}

impl Drop for RevealGate {
    fn drop(&mut self) {
        self.cancel_pending_hide();
    }
}
